//! Request pipeline middleware.

pub mod frontend;

pub use frontend::resolve_frontend;
