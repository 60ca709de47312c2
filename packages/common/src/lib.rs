//! Shared types for the in-place content editor.
//!
//! Everything here is plain data: the remote document as fetched from the
//! content API, the blocks that make up its body, and the pending changes the
//! editor accumulates before a save.

pub mod change;
pub mod document;
pub mod error;
pub mod ids;
pub mod result;

pub use change::*;
pub use document::*;
pub use error::*;
pub use ids::*;
pub use result::*;
