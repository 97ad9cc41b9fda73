//! Configuration errors raised while building a frontend.

use thiserror::Error;

use crate::frontend::name::{FrontendName, InvalidFrontendName};

/// Errors raised when a frontend description is invalid.
///
/// All of these are caller mistakes surfaced at configuration time; none is
/// retried or silently corrected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrontendError {
    #[error(transparent)]
    InvalidName(#[from] InvalidFrontendName),

    /// Host URI is not an absolute URI with a host.
    #[error("invalid host URI {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("selection path {0:?} must start with '/'")]
    PathMustStartWithSlash(String),

    /// `/` restricts nothing; leave the path unset instead.
    #[error("selection path must not be the root path '/'")]
    RootPath,

    #[error("selection path must not be blank")]
    BlankPath,

    /// Criteria were already bound and the update was not forced.
    #[error("selection criteria for frontend '{name}' already set ({component})")]
    CriteriaAlreadySet {
        name: FrontendName,
        component: &'static str,
    },

    #[error("invalid {field} URI {uri:?}: {reason}")]
    InvalidSourceUri {
        field: &'static str,
        uri: String,
        reason: String,
    },
}
