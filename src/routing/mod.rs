//! Frontend routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (scheme, host, port, path)
//!     → matcher.rs (RequestTarget, evaluate criteria, rank specificity)
//!     → resolver.rs (scan registry snapshot, pick best)
//!     → context.rs (write-once RequestFrontendContext)
//!     → auth option binders read the context
//! ```
//!
//! # Design Decisions
//! - Registry snapshots are immutable; resolution never locks
//! - Deterministic: same snapshot + same request → same frontend
//! - Explicit no-match; the caller owns the fallback policy

pub mod context;
pub mod matcher;
pub mod resolver;

pub use context::{ContextError, RequestFrontendContext};
pub use matcher::{Matcher, RequestTarget, Specificity, Tier};
pub use resolver::FrontendResolver;
