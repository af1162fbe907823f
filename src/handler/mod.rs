//! Request handler module
//!
//! Resolves request paths against the root directory and turns the result
//! into HTTP responses.

pub mod listing;
pub mod router;
pub mod static_files;

// Re-export main entry points
pub use router::handle_request;
pub use static_files::{RequestPath, Resolved, StaticFile, StaticResponder};
