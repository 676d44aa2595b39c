use reqwest::StatusCode;

/// Failure talking to one of the remote services.
///
/// Every variant carries a human-readable message naming the operation that
/// failed; the `Display` output is what ends up in front of the user.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{message}: {source}")]
    Transport {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{message}: request failed with status {status}: {body}")]
    Status {
        message: String,
        status: StatusCode,
        body: String,
    },

    #[error("{message}: invalid response payload: {source}")]
    Decode {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Message naming the failed operation, without the underlying cause.
    pub fn message(&self) -> &str {
        match self {
            FetchError::Transport { message, .. }
            | FetchError::Status { message, .. }
            | FetchError::Decode { message, .. } => message,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure opening or querying the local locations database.
#[derive(Debug, thiserror::Error)]
#[error("{message}: {source}")]
pub struct StoreError {
    pub message: String,
    #[source]
    pub source: rusqlite::Error,
}

impl StoreError {
    pub(crate) fn new(message: impl Into<String>, source: rusqlite::Error) -> Self {
        Self { message: message.into(), source }
    }
}

/// A time payload whose fields do not form a valid calendar date/time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time format: {0}")]
pub struct FormatError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display_mentions_operation_and_status() {
        let err = FetchError::Status {
            message: "Could not retrieve weather".into(),
            status: StatusCode::BAD_GATEWAY,
            body: "upstream down".into(),
        };

        let msg = err.to_string();
        assert!(msg.starts_with("Could not retrieve weather"));
        assert!(msg.contains("502"));
        assert!(msg.contains("upstream down"));
        assert_eq!(err.message(), "Could not retrieve weather");
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
    }

    #[test]
    fn decode_error_keeps_source() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = FetchError::Decode { message: "Could not determine time".into(), source };

        assert!(std::error::Error::source(&err).is_some());
        assert!(err.status().is_none());
    }
}
