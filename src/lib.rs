//! Book catalog application library
//!
//! Server-rendered pages for listing, adding, editing, and deleting books.

pub mod modules;

/// Re-export commonly used types
pub use modules::*;
