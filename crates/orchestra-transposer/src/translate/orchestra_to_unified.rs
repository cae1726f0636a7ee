// crates/orchestra-transposer/src/translate/orchestra_to_unified.rs

//! Orchestra 1.0 → Unified Repository translation.
//!
//! The forward walk covers sections, categories, datatypes, and fields with
//! inline enum synthesis from each field's codeset; documentation moves into
//! the phrases document under synthesized `textId` keys.

use std::io::{BufRead, Write};

use log::{error, warn};

use crate::error::TransposerError;
use crate::orchestra::{Orchestra10, OrchestraInstance10, Repository, documentation};
use crate::unified::{Unified, UnifiedMainInstance, UnifiedWithPhrases};
use crate::xml::Node;

/// Translates an Orchestra version 1.0 repository into a Unified Repository
/// pair (main document plus phrases).
#[derive(Debug, Default)]
pub struct Orchestra2Unified;

impl Orchestra2Unified {
    pub fn new() -> Self {
        Orchestra2Unified
    }

    /// Translates a decoded Orchestra instance into a fresh Unified pair.
    pub fn translate(&self, orch: &OrchestraInstance10) -> UnifiedWithPhrases {
        let mut unified = UnifiedWithPhrases::new();
        let version = self.metadata(orch, &mut unified);
        self.datatypes(orch, &mut unified, &version);
        self.categories(orch, &mut unified, &version);
        self.sections(orch, &mut unified, &version);
        self.fields(orch, &mut unified, &version);
        unified
    }

    /// Translates an Orchestra document stream into Unified main and phrases
    /// streams.
    ///
    /// Decode findings abort the conversion and are returned as the error
    /// list; no output is written in that case.
    pub fn translate_xml<R: BufRead, W1: Write, W2: Write>(
        &self,
        orch_xml: R,
        unified_out: W1,
        phrases_out: W2,
    ) -> Result<Vec<TransposerError>, TransposerError> {
        let (orch, errors) = Orchestra10::read_xml(orch_xml)?;
        if !errors.is_empty() {
            for e in &errors {
                error!("{e}");
            }
            return Ok(errors);
        }
        let unified = self.translate(&orch);
        let errors = Unified::write_xml_all(&unified, unified_out, phrases_out)?;
        for e in &errors {
            error!("{e}");
        }
        Ok(errors)
    }

    /// Repository attributes on both documents; returns the version that
    /// names the `fix` block.
    fn metadata(&self, orch: &OrchestraInstance10, unified: &mut UnifiedWithPhrases) -> String {
        let generated = super::timestamp();
        let version = match orch.root().attr_text("version") {
            Some(version) => version.into_owned(),
            None => {
                warn!("repository has no version attribute");
                "Unknown".to_string()
            }
        };
        unified
            .main
            .root_mut()
            .set_attr("generated", generated.as_str());
        if let Some(rights) = orch.metadata_term("dc:rights") {
            unified.main.root_mut().set_attr("copyright", rights);
        }
        let phrases_root = unified.phrases.root_mut();
        phrases_root.set_attr("generated", generated.as_str());
        phrases_root.set_attr("langId", "en");
        phrases_root.set_attr("version", version.as_str());
        unified.main.fix_mut(&version);
        version
    }

    fn sections(
        &self,
        orch: &OrchestraInstance10,
        unified: &mut UnifiedWithPhrases,
        version: &str,
    ) {
        for section in orch.sections() {
            let name = section.attr_str("name").unwrap_or_default().to_string();
            let mut out = Node::new("section");
            out.set_attr("id", name.as_str());
            copy_attrs_except(section, &mut out, &["name"]);
            let docs = documentation(section);
            if !docs.is_empty() {
                let text_id = format!("SCT_{name}");
                out.set_attr("textId", text_id.as_str());
                unified.phrases.set_phrase(&text_id, &docs);
            }
            let fix = unified.main.fix_mut(version);
            UnifiedMainInstance::sections_mut(fix).push_child(out);
        }
    }

    fn categories(
        &self,
        orch: &OrchestraInstance10,
        unified: &mut UnifiedWithPhrases,
        version: &str,
    ) {
        for category in orch.categories() {
            let name = category.attr_str("name").unwrap_or_default().to_string();
            let mut out = Node::new("category");
            out.set_attr("id", name.as_str());
            copy_attrs_except(category, &mut out, &["name"]);
            let docs = documentation(category);
            if !docs.is_empty() {
                let text_id = format!("CAT_{name}");
                out.set_attr("textId", text_id.as_str());
                unified.phrases.set_phrase(&text_id, &docs);
            }
            let fix = unified.main.fix_mut(version);
            UnifiedMainInstance::categories_mut(fix).push_child(out);
        }
    }

    fn datatypes(
        &self,
        orch: &OrchestraInstance10,
        unified: &mut UnifiedWithPhrases,
        version: &str,
    ) {
        for datatype in orch.datatypes() {
            let name = datatype.attr_str("name").unwrap_or_default().to_string();
            let mut out = Node::new("datatype");
            copy_attrs_except(datatype, &mut out, &[]);
            let xml_mapping = datatype
                .children_named("fixr:mappedDatatype")
                .find(|m| m.attr_str("standard") == Some("XML"));
            if let Some(mapping) = xml_mapping {
                let mut xml = Node::new("XML");
                copy_attrs_except(mapping, &mut xml, &["standard", "builtin"]);
                let builtin = matches!(mapping.attr_str("builtin"), Some("1") | Some("true"));
                xml.set_attr("builtin", if builtin { "1" } else { "0" });
                let docs = documentation(mapping);
                if !docs.is_empty() {
                    let text_id = format!("DT_XML_{name}");
                    xml.set_attr("textId", text_id.as_str());
                    unified.phrases.set_phrase(&text_id, &docs);
                }
                out.push_child(xml);
            }
            let docs = documentation(datatype);
            if !docs.is_empty() {
                let text_id = format!("DT_{name}");
                out.set_attr("textId", text_id.as_str());
                unified.phrases.set_phrase(&text_id, &docs);
            }
            let fix = unified.main.fix_mut(version);
            UnifiedMainInstance::datatypes_mut(fix).push_child(out);
        }
    }

    fn fields(
        &self,
        orch: &OrchestraInstance10,
        unified: &mut UnifiedWithPhrases,
        version: &str,
    ) {
        for field in orch.fields() {
            let id = field.attr_i64("id").unwrap_or(0);
            let mut out = Node::new("field");
            copy_attrs_except(field, &mut out, &["lengthId", "discriminatorId"]);
            // A field whose type names a codeset flattens to the codeset's
            // underlying type plus inline enum entries.
            if let Some(codeset) = field
                .attr_str("type")
                .and_then(|t| orch.codeset_by_name(t))
            {
                if let Some(underlying) = codeset.attr_text("type") {
                    out.set_attr("type", underlying.into_owned());
                }
                for code in codeset.children_named("fixr:code") {
                    let mut entry = Node::new("enum");
                    copy_attrs_except(code, &mut entry, &["name", "id"]);
                    if let Some(symbolic) = code.attr_text("name") {
                        entry.set_attr("symbolicName", symbolic.into_owned());
                    }
                    let docs = documentation(code);
                    if !docs.is_empty() {
                        let value = code.attr_text("value").unwrap_or_default().into_owned();
                        let text_id = format!("ENUM_{id}_{value}");
                        entry.set_attr("textId", text_id.as_str());
                        unified.phrases.set_phrase(&text_id, &docs);
                    }
                    out.push_child(entry);
                }
            }
            let docs = documentation(field);
            if !docs.is_empty() {
                let text_id = format!("FIELD_{id}");
                out.set_attr("textId", text_id.as_str());
                unified.phrases.set_phrase(&text_id, &docs);
            }
            let fix = unified.main.fix_mut(version);
            UnifiedMainInstance::fields_mut(fix).push_child(out);
        }
    }
}

/// Copies attributes in document order, skipping the given keys.
fn copy_attrs_except(source: &Node, target: &mut Node, except: &[&str]) {
    for (key, value) in source.attrs() {
        if except.contains(&key) {
            continue;
        }
        target.set_attr(key, value.clone());
    }
}
