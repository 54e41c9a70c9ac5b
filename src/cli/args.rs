//! CLI argument definitions using clap

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use reqwest::Url;
use uuid::Uuid;

use crate::config::ClientSecret;
use crate::domain::{ElementTarget, LogLevel, PrincipalItem};

/// Command line client for KuFlow task actions
#[derive(Parser, Debug)]
#[command(name = "kuflowctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, overrides_with = "no_silent")]
    pub silent: bool,

    /// Undo an earlier --silent
    #[arg(long = "no-silent", global = true, overrides_with = "silent")]
    pub no_silent: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection settings given on the command line.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// KuFlow API endpoint
    #[arg(long, global = true, value_name = "URL", value_parser = parse_endpoint)]
    pub endpoint: Option<String>,

    /// Application client id
    #[arg(
        long,
        global = true,
        value_name = "ID",
        requires = "client_secret",
        conflicts_with = "environment_file"
    )]
    pub client_id: Option<String>,

    /// Application client secret
    #[arg(
        long,
        global = true,
        value_name = "SECRET",
        requires = "client_id",
        conflicts_with = "environment_file",
        value_parser = parse_client_secret
    )]
    pub client_secret: Option<ClientSecret>,

    /// YAML file with the connection settings
    #[arg(long, global = true, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub environment_file: Option<PathBuf>,
}

/// Element addressed by a save command.
#[derive(Args, Debug, Clone)]
pub struct ElementArgs {
    /// Task id
    #[arg(short = 't', long = "task-id", value_name = "TASKID")]
    pub task_id: Uuid,

    /// Element definition code
    #[arg(
        short = 'e',
        long = "element-code",
        visible_alias = "element-definition-code",
        value_name = "CODE"
    )]
    pub element_code: String,

    /// Mark the values as valid (default)
    #[arg(long, overrides_with = "no_valid")]
    pub valid: bool,

    /// Mark the values as invalid
    #[arg(long = "no-valid", overrides_with = "valid")]
    pub no_valid: bool,
}

impl ElementArgs {
    pub fn is_valid(&self) -> bool {
        !self.no_valid
    }

    pub fn target(&self) -> ElementTarget {
        ElementTarget {
            task_id: self.task_id,
            element_code: Some(self.element_code.clone()),
            valid: self.is_valid(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save values of a field element
    SaveElementField {
        #[command(flatten)]
        element: ElementArgs,

        /// Field values
        #[arg(required = true, value_name = "VALUE")]
        values: Vec<String>,
    },

    /// Upload files as values of a document element
    SaveElementDocument {
        #[command(flatten)]
        element: ElementArgs,

        /// Replace this document (single file only)
        #[arg(long = "document-id", visible_alias = "doi", value_name = "UUID")]
        document_id: Option<Uuid>,

        /// Files to upload
        #[arg(required = true, value_name = "PATH", value_hint = ValueHint::FilePath)]
        paths: Vec<PathBuf>,
    },

    /// Save references to existing documents
    SaveElementDocumentByReference {
        #[command(flatten)]
        element: ElementArgs,

        /// Document references
        #[arg(required = true, value_name = "URI")]
        uris: Vec<String>,
    },

    /// Save users, groups or applications
    SaveElementPrincipal {
        #[command(flatten)]
        element: ElementArgs,

        /// Principals, e.g. USER=<uuid>
        #[arg(required = true, value_name = "TYPE=UUID")]
        principals: Vec<PrincipalItem>,
    },

    /// Append an entry to the task log
    AppendLog {
        /// Task id
        #[arg(short = 't', long = "task-id", value_name = "TASKID")]
        task_id: Uuid,

        /// Log level (INFO, WARN, ERROR)
        #[arg(long = "log-level", value_name = "LEVEL")]
        level: LogLevel,

        /// Log message
        message: String,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn parse_client_secret(value: &str) -> Result<ClientSecret, String> {
    Ok(ClientSecret::new(value))
}

fn parse_endpoint(value: &str) -> Result<String, String> {
    Url::parse(value)
        .map(|_| value.to_string())
        .map_err(|e| format!("not an absolute URL: {e}"))
}

/// Rewrite legacy single-dash long options into their `--` form.
///
/// `-lv` and `-doi` (also `-lv=X` and `-doi=X`) become `--log-level` and
/// `--document-id`. Arguments after `--` are left alone.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut after_separator = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if after_separator {
                return arg;
            }
            let Some(s) = arg.to_str() else {
                return arg;
            };
            if s == "--" {
                after_separator = true;
                return arg;
            }
            match rewrite_legacy(s) {
                Some(rewritten) => OsString::from(rewritten),
                None => arg,
            }
        })
        .collect()
}

fn rewrite_legacy(arg: &str) -> Option<String> {
    const LEGACY: [(&str, &str); 2] = [("-lv", "--log-level"), ("-doi", "--document-id")];

    LEGACY.iter().find_map(|(legacy, long)| {
        if arg == *legacy {
            Some(long.to_string())
        } else {
            arg.strip_prefix(legacy)
                .and_then(|rest| rest.strip_prefix('='))
                .map(|value| format!("{long}={value}"))
        }
    })
}
