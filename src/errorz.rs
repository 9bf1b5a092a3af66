//! Classified domain errors.
//!
//! Every failure that leaves the query layer (and every failure a domain
//! service reports) is one of the kinds below. The kinds are flat: none wraps
//! another and none carries retry hints. Callers branch on the kind; the
//! message is for humans.
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// The closed set of domain error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    AccessDenied,
    Unauthorized,
    Validation,
    Conflict,
    Store,
    Gateway,
    Session,
    Internal,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 10] = [
        ErrorKind::BadRequest,
        ErrorKind::NotFound,
        ErrorKind::AccessDenied,
        ErrorKind::Unauthorized,
        ErrorKind::Validation,
        ErrorKind::Conflict,
        ErrorKind::Store,
        ErrorKind::Gateway,
        ErrorKind::Session,
        ErrorKind::Internal,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::NotFound => "not-found",
            ErrorKind::AccessDenied => "access-denied",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Store => "store",
            ErrorKind::Gateway => "gateway",
            ErrorKind::Session => "session",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure. The `Display` output is the message alone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The request is malformed.
    #[error("{0}")]
    BadRequest(String),

    /// The addressed object does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The actor is known but not allowed to perform the action.
    #[error("{0}")]
    AccessDenied(String),

    /// The actor could not be established.
    #[error("{0}")]
    Unauthorized(String),

    /// The object failed validation.
    #[error("{0}")]
    Validation(String),

    /// The object clashes with existing state.
    #[error("{0}")]
    Conflict(String),

    /// The document store failed.
    #[error("{0}")]
    Store(String),

    /// An external service failed.
    #[error("{0}")]
    Gateway(String),

    /// The session is missing, expired or broken.
    #[error("{0}")]
    Session(String),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;

impl DomainError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::BadRequest => DomainError::BadRequest(message),
            ErrorKind::NotFound => DomainError::NotFound(message),
            ErrorKind::AccessDenied => DomainError::AccessDenied(message),
            ErrorKind::Unauthorized => DomainError::Unauthorized(message),
            ErrorKind::Validation => DomainError::Validation(message),
            ErrorKind::Conflict => DomainError::Conflict(message),
            ErrorKind::Store => DomainError::Store(message),
            ErrorKind::Gateway => DomainError::Gateway(message),
            ErrorKind::Session => DomainError::Session(message),
            ErrorKind::Internal => DomainError::Internal(message),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        DomainError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        DomainError::NotFound(message.into())
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        DomainError::AccessDenied(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        DomainError::Unauthorized(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        DomainError::Conflict(message.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        DomainError::Store(message.into())
    }

    pub fn gateway(message: impl Into<String>) -> Self {
        DomainError::Gateway(message.into())
    }

    pub fn session(message: impl Into<String>) -> Self {
        DomainError::Session(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal(message.into())
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::BadRequest(_) => ErrorKind::BadRequest,
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::AccessDenied(_) => ErrorKind::AccessDenied,
            DomainError::Unauthorized(_) => ErrorKind::Unauthorized,
            DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::Conflict(_) => ErrorKind::Conflict,
            DomainError::Store(_) => ErrorKind::Store,
            DomainError::Gateway(_) => ErrorKind::Gateway,
            DomainError::Session(_) => ErrorKind::Session,
            DomainError::Internal(_) => ErrorKind::Internal,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            DomainError::BadRequest(m)
            | DomainError::NotFound(m)
            | DomainError::AccessDenied(m)
            | DomainError::Unauthorized(m)
            | DomainError::Validation(m)
            | DomainError::Conflict(m)
            | DomainError::Store(m)
            | DomainError::Gateway(m)
            | DomainError::Session(m)
            | DomainError::Internal(m) => m,
        }
    }

    #[must_use]
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind() == kind
    }
}

/// Builds a [`DomainError`] of the given kind from a format string.
///
/// ```
/// use powermesh_core::domain_error;
/// use powermesh_core::errorz::ErrorKind;
///
/// let err = domain_error!(NotFound, "{} {} not found", "person", 1);
/// assert_eq!(err.kind(), ErrorKind::NotFound);
/// assert_eq!(err.to_string(), "person 1 not found");
/// ```
#[macro_export]
macro_rules! domain_error {
    ($kind:ident, $($arg:tt)*) => {
        $crate::errorz::DomainError::new($crate::errorz::ErrorKind::$kind, format!($($arg)*))
    };
}

/// Finds the first [`DomainError`] in `err`'s source chain.
#[must_use]
pub fn as_domain_error<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a DomainError> {
    let mut cur: Option<&'a (dyn StdError + 'static)> = Some(err);
    while let Some(e) = cur {
        if let Some(d) = e.downcast_ref::<DomainError>() {
            return Some(d);
        }
        cur = e.source();
    }
    None
}

/// Reports whether `err`, or anything it wraps, is a domain error of any kind.
#[must_use]
pub fn is_domain_error(err: &(dyn StdError + 'static)) -> bool {
    as_domain_error(err).is_some()
}

#[must_use]
pub fn is_kind(err: &(dyn StdError + 'static), kind: ErrorKind) -> bool {
    as_domain_error(err).is_some_and(|d| d.is(kind))
}

macro_rules! kind_predicates {
    ($($name:ident => $kind:ident;)*) => {
        $(
            #[must_use]
            pub fn $name(err: &(dyn StdError + 'static)) -> bool {
                is_kind(err, ErrorKind::$kind)
            }
        )*
    };
}

kind_predicates! {
    is_bad_request_error => BadRequest;
    is_not_found_error => NotFound;
    is_access_denied_error => AccessDenied;
    is_unauthorized_error => Unauthorized;
    is_validation_error => Validation;
    is_conflict_error => Conflict;
    is_store_error => Store;
    is_gateway_error => Gateway;
    is_session_error => Session;
    is_internal_error => Internal;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("wrapped: {0}")]
    struct Wrapper(#[source] DomainError);

    #[test]
    fn constructors_format_and_classify() {
        let err = domain_error!(Store, "test:{}", 42);
        assert_eq!(err.to_string(), "test:42");
        assert!(err.is(ErrorKind::Store));
        for kind in ErrorKind::ALL {
            let err = DomainError::new(kind, format!("test:{}", 42));
            assert_eq!(err.kind(), kind);
            assert_eq!(err.message(), "test:42");
        }
    }

    #[test]
    fn predicates_see_through_wrappers() {
        let wrapped = Wrapper(DomainError::not_found("person 1 not found"));
        assert!(is_not_found_error(&wrapped));
        assert!(!is_store_error(&wrapped));
        assert!(is_domain_error(&wrapped));
        assert_eq!(as_domain_error(&wrapped).map(DomainError::message), Some("person 1 not found"));
    }

    #[test]
    fn foreign_errors_are_not_domain_errors() {
        let io = std::io::Error::other("other-error");
        assert!(!is_domain_error(&io));
        for kind in ErrorKind::ALL {
            assert!(!is_kind(&io, kind));
        }
    }
}
