// crates/orchestra-transposer/src/error.rs

use thiserror::Error;

/// Errors raised while decoding, translating, or encoding schema documents.
///
/// Codecs report recoverable findings as a `Vec<TransposerError>` returned
/// alongside a best-effort instance; a hard `Err` is reserved for input that
/// cannot be decoded at all and for structural elements no accessor can
/// supply. Translators treat a non-empty finding list as fatal to the
/// conversion and return it without producing output.
#[derive(Debug, Error)]
pub enum TransposerError {
    /// The underlying XML parser or writer failed.
    #[error("XML error: {0}")]
    Xml(String),

    /// An input or output stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document root is not the element the dialect defines.
    #[error("unexpected root element `{found}`; expected `{expected}`")]
    UnexpectedRoot {
        /// Root element the dialect schema requires.
        expected: &'static str,
        /// Root element actually present in the document.
        found: String,
    },

    /// A required structural element is absent.
    #[error("missing required element: {0}")]
    MissingElement(&'static str),

    /// The input contained no elements at all.
    #[error("document contains no elements")]
    EmptyDocument,
}

impl TransposerError {
    /// Wraps an XML-layer failure, keeping only its message.
    pub(crate) fn xml(err: impl std::fmt::Display) -> Self {
        TransposerError::Xml(err.to_string())
    }
}
