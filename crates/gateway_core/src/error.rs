use thiserror::Error;

/// Classified failure of an upstream call.
///
/// Every proxying endpoint funnels its provider errors through this type so
/// the HTTP layer can map them to a status code without string matching.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream unreachable: {0}")]
    Unreachable(String),

    #[error("upstream rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("not authenticated, device login required")]
    NotAuthenticated,

    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// Device auth was started but the user never completed it (denied the
    /// request or let the code expire).
    #[error("device authorization incomplete: {0}")]
    AuthPending(String),
}

impl UpstreamError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        UpstreamError::Rejected {
            status,
            message: message.into(),
        }
    }

    /// True when the provider answered but refused the request, i.e. the
    /// input is at fault rather than the network.
    pub fn is_rejection(&self) -> bool {
        matches!(self, UpstreamError::Rejected { .. })
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return UpstreamError::Rejected {
                status: status.as_u16(),
                message: err.to_string(),
            };
        }
        UpstreamError::Unreachable(err.to_string())
    }
}

impl From<reqwest_middleware::Error> for UpstreamError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) => e.into(),
            reqwest_middleware::Error::Middleware(e) => UpstreamError::Unreachable(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_carries_status_and_message() {
        let err = UpstreamError::rejected(404, "not found");
        assert!(err.is_rejection());
        assert_eq!(err.to_string(), "upstream rejected request (404): not found");
    }

    #[test]
    fn unreachable_is_not_a_rejection() {
        let err = UpstreamError::Unreachable("connect timeout".to_string());
        assert!(!err.is_rejection());
    }
}
