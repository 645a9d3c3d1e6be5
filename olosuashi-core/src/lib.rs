pub mod gateway;
pub mod navigation;
pub mod query;
pub mod session;

pub use gateway::{
    BookingGateway, ContentGateway, ExperienceGateway, SlugGateway, TourGateway,
    TourMediaGateway, WishlistGateway,
};
pub use navigation::{routes, Navigator, Notifier, ToastLevel};
pub use query::ListQuery;
pub use session::{
    CredentialError, CredentialStore, ExpirySubscriber, MemoryCredentialStore, RedirectOnExpiry,
    SessionContext, SessionError,
};

/// Coarse error buckets the UI reacts to differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No answer from the server.
    Network,
    Validation,
    Auth,
    /// The server answered, but not with what was asked for.
    Unexpected,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Session expired, please sign in again")]
    Unauthorized,
    #[error("Not allowed: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Unauthorized | ApiError::Forbidden(_) => ErrorKind::Auth,
            ApiError::Rejected(_) => ErrorKind::Validation,
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::NotFound(_) | ApiError::Server { .. } | ApiError::Decode(_) => {
                ErrorKind::Unexpected
            }
        }
    }

    /// True when the request never got an answer, so sending it again
    /// cannot duplicate work the server already did.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// Text shown in toasts; server internals are not surfaced.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected(msg) | ApiError::Forbidden(msg) => msg.clone(),
            ApiError::NotFound(_) => "The requested item no longer exists".to_string(),
            ApiError::Unauthorized => self.to_string(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(ApiError::Unauthorized.kind(), ErrorKind::Auth);
        assert_eq!(ApiError::Rejected("bad date".into()).kind(), ErrorKind::Validation);
        assert_eq!(ApiError::Network("timeout".into()).kind(), ErrorKind::Network);
        assert_eq!(ApiError::Decode("missing id".into()).kind(), ErrorKind::Unexpected);
        assert_eq!(ApiError::NotFound("tour".into()).kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn test_only_transport_failures_are_transport() {
        assert!(ApiError::Network("reset".into()).is_transport());
        assert!(!ApiError::Decode("bad json".into()).is_transport());
        assert!(!ApiError::Server { status: 502, message: "bad gateway".into() }.is_transport());
    }

    #[test]
    fn test_server_details_hidden_from_users() {
        let err = ApiError::Server { status: 500, message: "stack trace".into() };
        assert!(!err.user_message().contains("stack trace"));
        assert_eq!(ApiError::Rejected("Date is full".into()).user_message(), "Date is full");
    }
}
