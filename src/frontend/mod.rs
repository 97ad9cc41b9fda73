//! Frontend model subsystem.
//!
//! # Data Flow
//! ```text
//! configuration / admin API
//!     → name.rs (validated FrontendName)
//!     → criteria.rs (HostMatch + path → SelectionCriteria)
//!     → model.rs (immutable Frontend, derived scheme names)
//!     → registry (Arc<Frontend>, replaced wholesale on update)
//! ```
//!
//! # Design Decisions
//! - All types are immutable values, safe to share without locks
//! - Validation happens here, before anything reaches the registry

pub mod criteria;
pub mod error;
pub mod model;
pub mod name;

pub use criteria::{HostMatch, SelectionCriteria};
pub use error::FrontendError;
pub use model::{Frontend, FrontendExtension, FrontendSummary};
pub use name::{FrontendName, InvalidFrontendName, NameRule};
