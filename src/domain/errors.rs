use thiserror::Error;

/// Why an admin API request produced no data.
///
/// The gateway is polled best-effort: every variant means "skip this
/// section for the current cycle", never "abort the cycle".
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Transport error for {resource}: {reason}")]
    Transport { resource: String, reason: String },

    #[error("Admin API rejected {resource} [{status}]: {body}")]
    Rejected {
        resource: String,
        status: u16,
        body: String,
    },

    #[error("Invalid JSON from {resource}: {reason}")]
    Decode { resource: String, reason: String },
}

impl FetchError {
    /// Resource path of the failed request (e.g. `usage`, `metadata/user`)
    pub fn resource(&self) -> &str {
        match self {
            FetchError::Transport { resource, .. }
            | FetchError::Rejected { resource, .. }
            | FetchError::Decode { resource, .. } => resource,
        }
    }
}

/// A single accounting record that could not be normalized.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("{record} record is missing field '{field}'")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    #[error("{record} record has invalid field '{field}': {reason}")]
    InvalidField {
        record: &'static str,
        field: &'static str,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_exposes_resource() {
        let err = FetchError::Rejected {
            resource: "usage".to_string(),
            status: 403,
            body: "AccessDenied".to_string(),
        };
        assert_eq!(err.resource(), "usage");
        assert_eq!(
            err.to_string(),
            "Admin API rejected usage [403]: AccessDenied"
        );
    }

    #[test]
    fn test_record_error_display() {
        let err = RecordError::MissingField {
            record: "bucket",
            field: "bucket",
        };
        assert_eq!(err.to_string(), "bucket record is missing field 'bucket'");
    }
}
