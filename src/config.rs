//! Connection configuration with layered resolution
//!
//! Precedence (highest to lowest), applied per field:
//! 1. Command line flags: `--endpoint`, `--client-id`, `--client-secret`
//! 2. Environment file passed with `--environment-file`
//! 3. Environment variables: `KUFLOW_ENDPOINT`, `KUFLOW_CLIENT_ID`, `KUFLOW_CLIENT_SECRET`
//! 4. Default environment file: `~/.kuflow.yml`
//!
//! Lower layers only fill fields that are still blank, and are not read at all
//! once every field is known.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use ::config::{Config, Environment};
use serde_yaml::Value;
use thiserror::Error;
use tracing::{debug, trace};

/// Prefix of the environment variables consulted during resolution.
pub const ENV_PREFIX: &str = "KUFLOW";
pub const ENV_ENDPOINT: &str = "KUFLOW_ENDPOINT";
pub const ENV_CLIENT_ID: &str = "KUFLOW_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "KUFLOW_CLIENT_SECRET";

/// File name of the default environment file, relative to the home directory.
pub const DEFAULT_ENVIRONMENT_FILE: &str = ".kuflow.yml";

/// Outer key of the environment file.
const FILE_NAMESPACE: &str = "kuflow";

const SECRET_MASK: &str = "****";

const FIELD_ENDPOINT: &str = "endpoint";
const FIELD_CLIENT_ID: &str = "client-id";
const FIELD_CLIENT_SECRET: &str = "client-secret";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("incomplete configuration, missing {}: {partial}", .missing.join(", "))]
    Incomplete {
        missing: Vec<&'static str>,
        partial: PartialConfig,
    },

    #[error("cannot read environment file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid environment file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("cannot read environment variables: {0}")]
    Environment(String),
}

/// Client secret that never prints its value.
///
/// `Debug` and `Display` both render a fixed mask; use [`ClientSecret::expose`]
/// at the single place the raw value is needed.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecret(String);

impl ClientSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(SECRET_MASK)
    }
}

impl fmt::Display for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(SECRET_MASK)
    }
}

/// Configuration fields found in one source. Blank values are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialConfig {
    pub endpoint: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<ClientSecret>,
}

impl PartialConfig {
    pub fn new(
        endpoint: Option<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Self {
        Self {
            endpoint: non_blank(endpoint),
            client_id: non_blank(client_id),
            client_secret: non_blank(client_secret).map(ClientSecret::new),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Names of the fields still unset, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.endpoint.is_none() {
            missing.push(FIELD_ENDPOINT);
        }
        if self.client_id.is_none() {
            missing.push(FIELD_CLIENT_ID);
        }
        if self.client_secret.is_none() {
            missing.push(FIELD_CLIENT_SECRET);
        }
        missing
    }

    /// Fill unset fields from a lower-precedence source; set fields are kept.
    pub fn fill_from(&mut self, lower: PartialConfig) {
        if self.endpoint.is_none() {
            self.endpoint = lower.endpoint;
        }
        if self.client_id.is_none() {
            self.client_id = lower.client_id;
        }
        if self.client_secret.is_none() {
            self.client_secret = lower.client_secret;
        }
    }
}

impl fmt::Display for PartialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{FIELD_ENDPOINT}={}, {FIELD_CLIENT_ID}={}, {FIELD_CLIENT_SECRET}={}",
            self.endpoint.as_deref().unwrap_or("<unset>"),
            self.client_id.as_deref().unwrap_or("<unset>"),
            if self.client_secret.is_some() {
                SECRET_MASK
            } else {
                "<unset>"
            }
        )
    }
}

/// Fully resolved connection settings; every field is non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    endpoint: String,
    client_id: String,
    client_secret: ClientSecret,
}

impl ResolvedConfig {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &ClientSecret {
        &self.client_secret
    }

    /// Plain HTTP endpoints are accepted but flagged.
    pub fn is_insecure(&self) -> bool {
        self.endpoint.starts_with("http://")
    }
}

impl fmt::Display for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{FIELD_ENDPOINT}={}, {FIELD_CLIENT_ID}={}, {FIELD_CLIENT_SECRET}={}",
            self.endpoint, self.client_id, self.client_secret
        )
    }
}

impl TryFrom<PartialConfig> for ResolvedConfig {
    type Error = ConfigError;

    fn try_from(partial: PartialConfig) -> Result<Self, Self::Error> {
        match partial {
            PartialConfig {
                endpoint: Some(endpoint),
                client_id: Some(client_id),
                client_secret: Some(client_secret),
            } => Ok(Self {
                endpoint,
                client_id,
                client_secret,
            }),
            partial => Err(ConfigError::Incomplete {
                missing: partial.missing_fields(),
                partial,
            }),
        }
    }
}

/// Get the path of the default environment file (`~/.kuflow.yml`).
pub fn default_environment_file() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(DEFAULT_ENVIRONMENT_FILE))
}

/// Merges the configuration sources by precedence.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    default_environment_file: Option<PathBuf>,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self {
            default_environment_file: default_environment_file(),
        }
    }
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific default environment file instead of `~/.kuflow.yml`.
    pub fn with_default_environment_file(path: Option<PathBuf>) -> Self {
        Self {
            default_environment_file: path,
        }
    }

    /// Resolve the connection settings.
    ///
    /// # Arguments
    /// * `flags` - Values given on the command line
    /// * `environment_file` - Path given with `--environment-file`
    /// * `process_env` - Process environment variables
    ///
    /// # Errors
    /// [`ConfigError::Incomplete`] when a field is still blank after every
    /// source; read/parse errors of an environment file that had to be consulted.
    pub fn resolve(
        &self,
        flags: PartialConfig,
        environment_file: Option<&Path>,
        process_env: &HashMap<String, String>,
    ) -> Result<ResolvedConfig, ConfigError> {
        let mut current = flags;
        if current.is_complete() {
            debug!("resolve: complete from command line flags");
            return ResolvedConfig::try_from(current);
        }

        if let Some(path) = environment_file {
            current.fill_from(read_environment_file(path)?);
            if current.is_complete() {
                debug!("resolve: complete after {}", path.display());
                return ResolvedConfig::try_from(current);
            }
        }

        current.fill_from(read_environment_variables(process_env)?);
        if current.is_complete() {
            debug!("resolve: complete after environment variables");
            return ResolvedConfig::try_from(current);
        }

        if let Some(path) = &self.default_environment_file {
            current.fill_from(read_environment_file(path)?);
        }

        debug!("resolve: {}", current);
        ResolvedConfig::try_from(current)
    }
}

/// Read an environment file. A missing file yields no fields.
pub fn read_environment_file(path: &Path) -> Result<PartialConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("environment file not found: {}", path.display());
            return Ok(PartialConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    parse_environment_file(&content).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Parse environment file content.
///
/// ```yaml
/// kuflow:
///   endpoint: https://api.kuflow.com/v2022-10-08
///   client-id: 9f3b...
///   client-secret: my-token
/// ```
///
/// Inner keys are converted kebab-to-camel and compared case-insensitively
/// with the field names; unknown keys are ignored.
pub fn parse_environment_file(content: &str) -> Result<PartialConfig, String> {
    if content.trim().is_empty() {
        return Ok(PartialConfig::default());
    }

    let document: Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
    let root = match &document {
        Value::Null => return Ok(PartialConfig::default()),
        Value::Mapping(root) => root,
        _ => return Err("expected a mapping at the top level".to_string()),
    };
    let section = match root.get(FILE_NAMESPACE) {
        None | Some(Value::Null) => return Ok(PartialConfig::default()),
        Some(Value::Mapping(section)) => section,
        Some(_) => return Err(format!("expected '{FILE_NAMESPACE}' to be a mapping")),
    };

    let mut endpoint = None;
    let mut client_id = None;
    let mut client_secret = None;
    for (key, value) in section {
        let Some(key) = key.as_str() else {
            continue;
        };
        let field = to_camel_case(key);
        let slot = if field.eq_ignore_ascii_case("endpoint") {
            &mut endpoint
        } else if field.eq_ignore_ascii_case("clientId") {
            &mut client_id
        } else if field.eq_ignore_ascii_case("clientSecret") {
            &mut client_secret
        } else {
            trace!("ignoring unknown key: {key}");
            continue;
        };
        *slot = scalar_to_string(value)
            .ok_or_else(|| format!("expected a scalar value for '{key}'"))?;
    }

    Ok(PartialConfig::new(endpoint, client_id, client_secret))
}

/// Read `KUFLOW_*` variables from the given environment.
pub fn read_environment_variables(
    process_env: &HashMap<String, String>,
) -> Result<PartialConfig, ConfigError> {
    let source: ::config::Map<String, String> = process_env
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let config = Config::builder()
        .add_source(Environment::with_prefix(ENV_PREFIX).source(Some(source)))
        .build()
        .map_err(|e| ConfigError::Environment(e.to_string()))?;

    Ok(PartialConfig::new(
        config.get_string("endpoint").ok(),
        config.get_string("client_id").ok(),
        config.get_string("client_secret").ok(),
    ))
}

/// `client-id` -> `clientId`, `CLIENT-SECRET` -> `clientSecret`.
fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (i, part) in key.split('-').enumerate() {
        let lower = part.to_lowercase();
        if i == 0 {
            out.push_str(&lower);
            continue;
        }
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// `None` for mappings and sequences; `Some(None)` for null.
fn scalar_to_string(value: &Value) -> Option<Option<String>> {
    match value {
        Value::Null => Some(None),
        Value::String(s) => Some(Some(s.clone())),
        Value::Number(n) => Some(Some(n.to_string())),
        Value::Bool(b) => Some(Some(b.to_string())),
        _ => None,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
