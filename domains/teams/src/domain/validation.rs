//! Validation helpers for identifiers and invite batches

use crewdesk_common::{Error, Result};
use uuid::Uuid;
use validator::ValidateEmail;

/// Parse a path or body identifier, reporting `InvalidId` on malformed input
pub fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| Error::InvalidId(format!("{} is not a valid id: {}", what, raw)))
}

/// Trim and lowercase an address, rejecting malformed ones.
pub fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim();
    if !email.validate_email() {
        return Err(Error::Validation(format!("Invalid email address: {}", email)));
    }
    Ok(email.to_lowercase())
}

/// Validate an invite batch: non-empty, every address syntactically valid.
/// Addresses come back normalized, in request order.
pub fn validate_email_list(emails: &[String]) -> Result<Vec<String>> {
    if emails.is_empty() {
        return Err(Error::Validation(
            "At least one email address is required".to_string(),
        ));
    }

    emails.iter().map(|email| normalize_email(email)).collect()
}
