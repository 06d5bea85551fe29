use thiserror::Error;

/// Error codes reported by the hosted identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthErrorCode {
    #[error("invalid credential")]
    InvalidCredential,
    #[error("user not found")]
    UserNotFound,
    #[error("wrong password")]
    WrongPassword,
    #[error("weak password")]
    WeakPassword,
    #[error("email already in use")]
    EmailInUse,
    #[error("invalid email")]
    InvalidEmail,
    #[error("missing password")]
    MissingPassword,
    #[error("too many requests")]
    TooManyRequests,
    #[error("user disabled")]
    UserDisabled,
    #[error("requires recent login")]
    RequiresRecentLogin,
    #[error("unknown auth error")]
    Unknown,
}

impl AuthErrorCode {
    /// Classifies an identity REST error message such as
    /// `WEAK_PASSWORD : Password should be at least 6 characters`.
    pub fn from_message(message: &str) -> Self {
        let code = message.split_whitespace().next().unwrap_or_default();
        match code {
            "INVALID_LOGIN_CREDENTIALS" => Self::InvalidCredential,
            "EMAIL_NOT_FOUND" => Self::UserNotFound,
            "INVALID_PASSWORD" => Self::WrongPassword,
            "WEAK_PASSWORD" => Self::WeakPassword,
            "EMAIL_EXISTS" => Self::EmailInUse,
            "INVALID_EMAIL" => Self::InvalidEmail,
            "MISSING_PASSWORD" => Self::MissingPassword,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyRequests,
            "USER_DISABLED" => Self::UserDisabled,
            "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" | "INVALID_ID_TOKEN" => Self::RequiresRecentLogin,
            _ => Self::Unknown,
        }
    }

    pub fn user_message(self) -> &'static str {
        match self {
            Self::InvalidCredential => "Invalid email or password.",
            Self::UserNotFound => "No account found with this email.",
            Self::WrongPassword => "Incorrect password. Please try again.",
            Self::WeakPassword => "Password should be at least 6 characters.",
            Self::EmailInUse => "An account with this email already exists.",
            Self::InvalidEmail => "Please enter a valid email address.",
            Self::MissingPassword => "Please enter your password.",
            Self::TooManyRequests => "Too many attempts. Please try again later.",
            Self::UserDisabled => "This account has been disabled.",
            Self::RequiresRecentLogin => "Please sign in again to continue.",
            Self::Unknown => "Something went wrong. Please try again.",
        }
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("authentication failed: {0}")]
    Auth(AuthErrorCode),
    #[error("not signed in")]
    Unauthenticated,
    #[error("document {collection}/{id} not found")]
    NotFound { collection: &'static str, id: String },
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed document: {0}")]
    Decode(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("malformed {kind} document: {source}")]
    Decode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ServiceError {
    /// Text suitable for a toast: classified auth codes map to their static
    /// messages, everything else to a generic line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.to_string(),
            Self::Backend(BackendError::Auth(code)) => code.user_message().to_string(),
            Self::Backend(BackendError::Unauthenticated) => {
                AuthErrorCode::RequiresRecentLogin.user_message().to_string()
            }
            Self::NotFound { kind, .. } => format!("That {kind} no longer exists."),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weak_password_message_with_detail() {
        let code =
            AuthErrorCode::from_message("WEAK_PASSWORD : Password should be at least 6 characters");
        assert_eq!(code, AuthErrorCode::WeakPassword);
    }

    #[test]
    fn test_unknown_code_falls_back() {
        assert_eq!(
            AuthErrorCode::from_message("SOMETHING_NEW"),
            AuthErrorCode::Unknown
        );
        assert_eq!(AuthErrorCode::from_message(""), AuthErrorCode::Unknown);
    }

    #[test]
    fn test_service_error_surfaces_auth_message() {
        let err = ServiceError::from(BackendError::Auth(AuthErrorCode::UserNotFound));
        assert_eq!(err.user_message(), "No account found with this email.");
    }

    #[test]
    fn test_generic_failure_message() {
        let err = ServiceError::from(BackendError::Unavailable("offline".into()));
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
    }
}
