//! Static file server for a built single-page application
//!
//! Serves the contents of a directory (by default `./dist`) over HTTP/1.1.
//! Requests can never reach files outside that directory.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::Config;
pub use error::{ResolveError, ServerError};
pub use handler::{Resolved, StaticFile, StaticResponder};
pub use server::Server;
