//! Frontend-keyed caches and their invalidation.
//!
//! # Data Flow
//! ```text
//! FrontendRegistry write
//!     → InvalidationSender (ChangeListener, try_send)
//!     → bounded queue
//!     → InvalidationWorker (background task)
//!     → FrontendCache::invalidate for every registered cache
//! ```
//!
//! # Design Decisions
//! - Invalidation is eventually consistent, never on the registry write path
//! - Failures are isolated per cache and per frontend

pub mod index_html;
pub mod invalidation;

pub use index_html::{IndexHtmlCache, IndexHtmlError};
pub use invalidation::{
    channel, FrontendCache, InvalidationError, InvalidationSender, InvalidationStats, InvalidationWorker,
};
