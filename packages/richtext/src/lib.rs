//! # Rich Text
//!
//! Structured document model behind rich-text inline fields.
//!
//! ```text
//! stored markup ──parse──▶ RichTextDocument ──commands──▶ RichTextDocument ──serialize──▶ markup
//! ```
//!
//! The model is a flat list of text blocks (paragraphs and list items), each a
//! run of spans carrying bold/italic/underline/link marks. Consecutive list
//! items of the same kind serialize into a single list element.
//!
//! Parsing is tolerant: unknown tags are dropped while their text is kept, so
//! any stored value yields a document. Serializing the parsed document gives
//! the canonical markup used for change detection.

mod commands;
mod error;
mod lexer;
mod model;
mod parser;
mod serializer;


pub use commands::ActiveFormats;
pub use error::MarkupError;
pub use lexer::{Token, TagToken};
pub use model::{
    sanitize_href, BlockKind, ListKind, Mark, Marks, Position, RichTextDocument, Selection, Span,
    TextBlock,
};
pub use parser::parse_markup;
pub use serializer::{canonicalize, to_markup};
