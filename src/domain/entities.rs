//! Domain entities: command intents and the request payloads they map onto

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Kind of principal referenced by a principal element value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrincipalType {
    User,
    Group,
    Application,
}

impl PrincipalType {
    pub const ALL: [PrincipalType; 3] = [
        PrincipalType::User,
        PrincipalType::Group,
        PrincipalType::Application,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalType::User => "USER",
            PrincipalType::Group => "GROUP",
            PrincipalType::Application => "APPLICATION",
        }
    }

    /// Accepted type tokens, for error messages.
    pub fn allowed() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Case-insensitive lookup.
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for PrincipalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a user, group or application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrincipalItem {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub principal_type: PrincipalType,
}

impl FromStr for PrincipalItem {
    type Err = DomainError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        crate::domain::principal::parse_principal(token)
    }
}

/// Severity of a task log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub const ALL: [LogLevel; 3] = [LogLevel::Info, LogLevel::Warn, LogLevel::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| DomainError::UnknownLogLevel {
                value: value.to_string(),
                allowed: Self::ALL
                    .iter()
                    .map(|l| l.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Element slot on a task that a save command writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementTarget {
    pub task_id: Uuid,
    /// Element definition code; `None` lets the server pick the default element
    pub element_code: Option<String>,
    /// Applies to every value written by the command
    pub valid: bool,
}

/// One parsed CLI invocation, ready to be dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandIntent {
    SaveField {
        target: ElementTarget,
        values: Vec<String>,
    },
    SaveDocument {
        target: ElementTarget,
        paths: Vec<PathBuf>,
        document_id: Option<Uuid>,
    },
    SaveDocumentByReference {
        target: ElementTarget,
        uris: Vec<String>,
    },
    SavePrincipal {
        target: ElementTarget,
        principals: Vec<PrincipalItem>,
    },
    AppendLog {
        task_id: Uuid,
        level: LogLevel,
        message: String,
    },
}

impl CommandIntent {
    pub fn task_id(&self) -> Uuid {
        match self {
            CommandIntent::SaveField { target, .. }
            | CommandIntent::SaveDocument { target, .. }
            | CommandIntent::SaveDocumentByReference { target, .. }
            | CommandIntent::SavePrincipal { target, .. } => target.task_id,
            CommandIntent::AppendLog { task_id, .. } => *task_id,
        }
    }

    /// Subcommand name, used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            CommandIntent::SaveField { .. } => "save-element-field",
            CommandIntent::SaveDocument { .. } => "save-element-document",
            CommandIntent::SaveDocumentByReference { .. } => "save-element-document-by-reference",
            CommandIntent::SavePrincipal { .. } => "save-element-principal",
            CommandIntent::AppendLog { .. } => "append-log",
        }
    }
}

// ============================================================
// REQUEST PAYLOADS
// ============================================================

/// Uploaded or referenced document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReference {
    pub uri: String,
}

/// Single element value as sent to the API, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementValue {
    String { valid: bool, value: String },
    Document { valid: bool, value: DocumentReference },
    Principal { valid: bool, value: PrincipalItem },
}

/// Body of the `save-element` task action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveElementCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_definition_code: Option<String>,
    pub element_values: Vec<ElementValue>,
}

impl SaveElementCommand {
    pub fn strings(target: &ElementTarget, values: &[String]) -> Self {
        Self::with_values(
            target,
            values.iter().map(|v| ElementValue::String {
                valid: target.valid,
                value: v.clone(),
            }),
        )
    }

    pub fn documents(target: &ElementTarget, uris: &[String]) -> Self {
        Self::with_values(
            target,
            uris.iter().map(|uri| ElementValue::Document {
                valid: target.valid,
                value: DocumentReference { uri: uri.clone() },
            }),
        )
    }

    pub fn principals(target: &ElementTarget, principals: &[PrincipalItem]) -> Self {
        Self::with_values(
            target,
            principals.iter().map(|p| ElementValue::Principal {
                valid: target.valid,
                value: *p,
            }),
        )
    }

    fn with_values(target: &ElementTarget, values: impl Iterator<Item = ElementValue>) -> Self {
        Self {
            element_definition_code: target.element_code.clone(),
            element_values: values.collect(),
        }
    }
}

/// Metadata of the `save-element-value-document` task action.
/// The file itself travels as a separate multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveElementDocumentCommand {
    pub element_definition_code: Option<String>,
    /// Replaces a specific document in a multi-document element
    pub element_value_id: Option<Uuid>,
    pub element_value_valid: bool,
}

/// Body of the `append-log` task action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskLog {
    pub level: LogLevel,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn target(valid: bool) -> ElementTarget {
        ElementTarget {
            task_id: Uuid::nil(),
            element_code: Some("CODE".to_string()),
            valid,
        }
    }

    #[test]
    fn given_string_values_when_serializing_then_uses_tagged_camel_case_shape() {
        let command = SaveElementCommand::strings(&target(false), &["a".to_string()]);

        let body = serde_json::to_value(&command).unwrap();

        assert_eq!(
            body,
            json!({
                "elementDefinitionCode": "CODE",
                "elementValues": [{"type": "STRING", "valid": false, "value": "a"}]
            })
        );
    }

    #[test]
    fn given_principals_when_serializing_then_nests_id_and_type() {
        let id = Uuid::new_v4();
        let principal = PrincipalItem {
            id,
            principal_type: PrincipalType::Group,
        };
        let command = SaveElementCommand::principals(&target(true), &[principal]);

        let body = serde_json::to_value(&command).unwrap();

        assert_eq!(
            body["elementValues"][0],
            json!({"type": "PRINCIPAL", "valid": true, "value": {"id": id.to_string(), "type": "GROUP"}})
        );
    }

    #[test]
    fn given_no_element_code_when_serializing_then_omits_code() {
        let mut t = target(true);
        t.element_code = None;
        let command = SaveElementCommand::documents(&t, &["ku:doc".to_string()]);

        let body = serde_json::to_value(&command).unwrap();

        assert!(body.get("elementDefinitionCode").is_none());
        assert_eq!(body["elementValues"][0]["value"]["uri"], "ku:doc");
    }

    #[test]
    fn given_mixed_case_level_when_parsing_then_matches() {
        assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("Error".parse::<LogLevel>().unwrap(), LogLevel::Error);
    }

    #[test]
    fn given_unknown_level_when_parsing_then_lists_allowed_levels() {
        let err = "debug".parse::<LogLevel>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid log level 'debug': must be one of INFO, WARN, ERROR"
        );
    }
}
