//! LSP Protocol Implementation
//!
//! Publishes validation diagnostics for open documents and describes element
//! rules on hover.

pub mod backend;
pub mod document;
pub mod handlers;
pub mod server;

pub use backend::Backend;
