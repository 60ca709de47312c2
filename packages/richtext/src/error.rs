use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarkupError {
    #[error("Unrecognized markup at byte {offset}")]
    Lex { offset: usize },
}
