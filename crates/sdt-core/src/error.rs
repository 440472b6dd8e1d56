use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdtError {
    /// Caller mistake in a pair's configuration. Raised before any mutation.
    #[error("Invalid configuration for pair #{pair}: {reason}")]
    InvalidConfig { pair: usize, reason: String },

    #[error("Invalid SDT configuration: {0}")]
    InvalidValue(String),

    #[error("No node in part '{part}' matches pair #{pair} ({kind}{label})")]
    LookupFailed {
        pair: usize,
        kind: String,
        label: String,
        part: String,
    },

    #[error("Invalid OOXML package: {message}")]
    InvalidPackage { message: String },

    #[error("Missing required part '{part_path}' in {document_type} document")]
    MissingPart { part_path: String, document_type: String },

    #[error("XML parsing error at {location}: {message}")]
    XmlParse { message: String, location: String },

    #[error("XML serialization error: {0}")]
    XmlWrite(String),

    /// A broken internal invariant (e.g. wrapping a detached node).
    #[error("Internal contract violation: {0}")]
    Contract(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SdtError {
    /// Attach the failing pair's batch position to a value validation error.
    pub fn for_pair(self, pair: usize) -> Self {
        match self {
            Self::InvalidValue(reason) => Self::InvalidConfig { pair, reason },
            other => other,
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. } | Self::InvalidValue(_))
    }
}

pub type Result<T> = std::result::Result<T, SdtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_missing_part_formats_correctly() {
        let err = SdtError::MissingPart {
            part_path: "word/document.xml".to_string(),
            document_type: "Word".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Missing required part 'word/document.xml' in Word document"
        );
    }

    #[test]
    fn lookup_failure_names_pair_and_part() {
        let err = SdtError::LookupFailed {
            pair: 3,
            kind: "table".to_string(),
            label: " tag=t1".to_string(),
            part: "word/document.xml".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No node in part 'word/document.xml' matches pair #3 (table tag=t1)"
        );
    }

    #[test]
    fn for_pair_promotes_value_errors() {
        let err = SdtError::InvalidValue("bad id".to_string()).for_pair(2);
        assert!(err.is_config_error());
        assert_eq!(err.to_string(), "Invalid configuration for pair #2: bad id");
    }
}
