//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, builds every frontend once)
//!     → GatewayConfig (validated, immutable)
//!     → sync.rs (upsert/remove configured frontends in the registry)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → sync.rs applies the frontend diff
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Only `[[frontends]]` is hot-reloaded; listener and auth defaults
//!   take effect on restart

pub mod loader;
pub mod schema;
pub mod sync;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, AuthConfig, FrontendConfig, FrontendDefinition, GatewayConfig, ListenerConfig,
};
pub use sync::{ConfigSync, SyncReport};
pub use validation::ValidationError;
