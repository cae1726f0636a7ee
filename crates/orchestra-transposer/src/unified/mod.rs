// crates/orchestra-transposer/src/unified/mod.rs

//! The legacy Unified Repository dialect: the main tabular document plus the
//! phrases companion keyed by `textId`.

mod instance;

pub use instance::{UnifiedMainInstance, UnifiedPhrasesInstance, UnifiedWithPhrases};

use std::io::{BufRead, Write};

use crate::error::TransposerError;
use crate::xml::{self, DialectSchema};

static UNIFIED_SCHEMA: DialectSchema = DialectSchema {
    root: "fixRepository",
    namespaces: &[],
    qualified_locals: &[],
};

static PHRASES_SCHEMA: DialectSchema = DialectSchema {
    root: "phrases",
    namespaces: &[],
    qualified_locals: &[],
};

/// Codec for the main Unified Repository document.
pub struct UnifiedMain;

impl UnifiedMain {
    /// Decodes a document into an instance plus lax-validation findings.
    pub fn read_xml<R: BufRead>(
        input: R,
    ) -> Result<(UnifiedMainInstance, Vec<TransposerError>), TransposerError> {
        let (root, errors) = xml::read_document(input, &UNIFIED_SCHEMA)?;
        Ok((UnifiedMainInstance::from_root(root), errors))
    }

    /// Encodes an instance to a stream.
    pub fn write_xml<W: Write>(
        instance: &UnifiedMainInstance,
        out: W,
    ) -> Result<Vec<TransposerError>, TransposerError> {
        xml::write_document(instance.root(), &UNIFIED_SCHEMA, out)
    }

    /// Decodes a document and returns only its findings.
    pub fn validate<R: BufRead>(input: R) -> Result<Vec<TransposerError>, TransposerError> {
        Self::read_xml(input).map(|(_, errors)| errors)
    }
}

/// Codec for the phrases companion document.
pub struct UnifiedPhrases;

impl UnifiedPhrases {
    /// Decodes a document into an instance plus lax-validation findings.
    pub fn read_xml<R: BufRead>(
        input: R,
    ) -> Result<(UnifiedPhrasesInstance, Vec<TransposerError>), TransposerError> {
        let (root, errors) = xml::read_document(input, &PHRASES_SCHEMA)?;
        Ok((UnifiedPhrasesInstance::from_root(root), errors))
    }

    /// Encodes an instance to a stream.
    pub fn write_xml<W: Write>(
        instance: &UnifiedPhrasesInstance,
        out: W,
    ) -> Result<Vec<TransposerError>, TransposerError> {
        xml::write_document(instance.root(), &PHRASES_SCHEMA, out)
    }

    /// Decodes a document and returns only its findings.
    pub fn validate<R: BufRead>(input: R) -> Result<Vec<TransposerError>, TransposerError> {
        Self::read_xml(input).map(|(_, errors)| errors)
    }
}

/// Codec for the two-document Unified Repository pair.
pub struct Unified;

impl Unified {
    /// Decodes the main and phrases documents together; findings from both
    /// are merged into one list.
    pub fn read_xml_all<R1: BufRead, R2: BufRead>(
        main_input: R1,
        phrases_input: R2,
    ) -> Result<(UnifiedWithPhrases, Vec<TransposerError>), TransposerError> {
        let (main, mut errors) = UnifiedMain::read_xml(main_input)?;
        let (phrases, phrase_errors) = UnifiedPhrases::read_xml(phrases_input)?;
        errors.extend(phrase_errors);
        Ok((UnifiedWithPhrases::from_parts(main, phrases), errors))
    }

    /// Encodes the main and phrases documents to their respective streams.
    pub fn write_xml_all<W1: Write, W2: Write>(
        instance: &UnifiedWithPhrases,
        main_out: W1,
        phrases_out: W2,
    ) -> Result<Vec<TransposerError>, TransposerError> {
        let mut errors = UnifiedMain::write_xml(&instance.main, main_out)?;
        errors.extend(UnifiedPhrases::write_xml(&instance.phrases, phrases_out)?);
        Ok(errors)
    }
}
