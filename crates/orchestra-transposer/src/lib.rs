// crates/orchestra-transposer/src/lib.rs

//! Converts FIX Orchestra repository files to and from related schema
//! formats: SBE message schemas (1.0 and 2.0), the legacy Unified
//! Repository, and Orchestra 1.1.
//!
//! Every dialect decodes into one generic, order-preserving document tree
//! ([`xml::Node`]) wrapped by a typed instance view; the translators walk a
//! source view and populate a target view, resolving cross-references and
//! remapping attribute vocabularies on the way. Decode errors are fatal to a
//! conversion; dangling references degrade to logged placeholders.

pub mod error;
pub mod orchestra;
pub mod sbe;
pub mod translate;
pub mod unified;
pub mod xml;

pub use error::TransposerError;
pub use translate::{
    Orchestra2Sbe, Orchestra2Unified, OrchestraUpdater, RepositoryVersion, Sbe2Orchestra,
    SbeSource, Unified2Orchestra,
};
