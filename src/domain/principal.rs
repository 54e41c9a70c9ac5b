//! Parsing of `TYPE=UUID` principal tokens

use uuid::Uuid;

use crate::domain::entities::{PrincipalItem, PrincipalType};
use crate::domain::error::DomainError;

/// Parse a single `TYPE=UUID` token.
///
/// `TYPE` is matched case-insensitively against [`PrincipalType`];
/// `UUID` must be a standard UUID string.
pub fn parse_principal(token: &str) -> Result<PrincipalItem, DomainError> {
    let mut parts = token.split('=');
    let (type_token, id_token) = match (parts.next(), parts.next(), parts.next()) {
        (Some(t), Some(id), None) => (t.trim(), id.trim()),
        _ => {
            return Err(DomainError::InvalidPrincipalFormat {
                token: token.to_string(),
            })
        }
    };

    let principal_type =
        PrincipalType::parse(type_token).ok_or_else(|| DomainError::UnknownPrincipalType {
            token: token.to_string(),
            allowed: PrincipalType::allowed(),
        })?;

    let id = Uuid::parse_str(id_token).map_err(|_| DomainError::InvalidPrincipalId {
        token: token.to_string(),
    })?;

    Ok(PrincipalItem { id, principal_type })
}
