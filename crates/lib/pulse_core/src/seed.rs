//! Credential seed files.
//!
//! A seed file is a YAML list of credential records:
//!
//! ```yaml
//! - email: admin@bdo.co.zw
//!   passwordHash: $2b$10$...
//!   department: IT
//!   isAdmin: true
//! ```

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

use crate::models::auth::CredentialRecord;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid seed entry {index}: {reason}")]
    Invalid { index: usize, reason: String },
}

/// Read and validate a seed file.
pub fn load_seed_file(path: &Path) -> Result<Vec<CredentialRecord>, SeedError> {
    let text = std::fs::read_to_string(path)?;
    parse_seed(&text)
}

/// Parse and validate seed YAML.
pub fn parse_seed(text: &str) -> Result<Vec<CredentialRecord>, SeedError> {
    let records: Vec<CredentialRecord> = serde_yaml::from_str(text)?;
    let mut seen = HashSet::new();
    for (index, record) in records.iter().enumerate() {
        let invalid = |reason: &str| SeedError::Invalid {
            index,
            reason: reason.to_string(),
        };
        if !record.email.contains('@') {
            return Err(invalid("email is not an address"));
        }
        if record.password_hash.parse::<bcrypt::HashParts>().is_err() {
            return Err(invalid("passwordHash is not a bcrypt hash"));
        }
        if !seen.insert(record.email.as_str()) {
            return Err(invalid("duplicate email"));
        }
    }
    Ok(records)
}
