// Closed error taxonomy for the chain-abstraction client.
//
// Every failure the core itself can produce is one of these variants; the
// core performs no retries and no fallback provider selection. Failures
// coming out of a provider cross the typed boundary as `Error::Provider`
// without being reinterpreted.

use thiserror::Error;

use crate::provider::{Method, ProviderError, ProviderKind};

#[derive(Debug, Error)]
pub enum Error {
    /// The registration target does not declare the bind capability.
    #[error("provider does not expose the bind capability")]
    InvalidProvider,

    /// A provider of the same kind is already registered.
    #[error("a provider of kind `{0}` is already registered")]
    DuplicateProvider(ProviderKind),

    /// The provider stack was empty at resolution time.
    #[error("no provider registered while resolving `{0}`")]
    NoProvider(Method),

    /// No provider in the search window implements the requested operation.
    #[error("no provider in the search window implements `{0}`")]
    UnimplementedMethod(Method),

    /// The first matching provider failed version gating. The search does
    /// not continue to earlier providers.
    #[error("provider `{kind}` does not support `{method}` at version {version}")]
    UnsupportedMethod {
        method: Method,
        kind: ProviderKind,
        version: String,
    },

    /// Caller-supplied input fails a format contract.
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument {
        field: &'static str,
        reason: String,
    },

    /// A provider's result fails its output contract (schema, shape, or
    /// array-element format).
    #[error("invalid provider response at `{path}`: {message}")]
    InvalidProviderResponse { path: String, message: String },

    /// An underlying provider failure, propagated unmodified.
    #[error("provider error: {0}")]
    Provider(ProviderError),
}

impl Error {
    pub fn invalid_argument(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    pub fn invalid_response(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidProviderResponse {
            path: path.into(),
            message: message.into(),
        }
    }
}

// Box<dyn Error> does not implement std::error::Error itself, so thiserror's
// #[from] cannot be used here.
impl From<ProviderError> for Error {
    fn from(err: ProviderError) -> Self {
        Error::Provider(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_violated_contract() {
        let err = Error::invalid_argument("secret_hash", "not a hexadecimal string");
        assert_eq!(
            err.to_string(),
            "invalid argument `secret_hash`: not a hexadecimal string"
        );

        let err = Error::invalid_response("hash", "missing required field");
        assert_eq!(
            err.to_string(),
            "invalid provider response at `hash`: missing required field"
        );
    }

    #[test]
    fn provider_errors_pass_through_from_boxed() {
        let inner: ProviderError = "connection reset".into();
        let err: Error = inner.into();
        match err {
            Error::Provider(e) => assert_eq!(e.to_string(), "connection reset"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
