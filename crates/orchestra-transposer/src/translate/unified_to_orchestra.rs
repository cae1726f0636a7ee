// crates/orchestra-transposer/src/translate/unified_to_orchestra.rs

//! Unified Repository → Orchestra 1.0 translation.
//!
//! The inverse of the forward walk: inline `enum` blocks become synthesized
//! codesets, repeating components become groups, and field-to-field
//! associations (`associatedDataTag`, `enumDatatype`) resolve through the
//! field collection.

use std::io::{BufRead, Write};

use log::{error, warn};

use crate::error::TransposerError;
use crate::orchestra::{
    self, Orchestra10, OrchestraInstance10, Repository, append_to_structure,
};
use crate::unified::{Unified, UnifiedMainInstance, UnifiedWithPhrases};
use crate::xml::Node;

/// Unified bookkeeping attributes never carried into Orchestra.
const SECTION_EXCLUDES: &[&str] = &["textId", "volume", "id", "notReqXML"];
const CATEGORY_EXCLUDES: &[&str] = &["textId", "volume", "id", "notReqXML", "generateImplFile"];
const DATATYPE_EXCLUDES: &[&str] = &["textId", "builtin"];
const FIELD_EXCLUDES: &[&str] = &["textId", "notReqXML", "associatedDataTag", "enumDatatype"];
const COMPONENT_EXCLUDES: &[&str] = &["textId", "notReqXML", "type", "repeating"];
const MESSAGE_EXCLUDES: &[&str] = &["textId", "notReqXML", "section"];
const MEMBER_EXCLUDES: &[&str] = &[
    "textId",
    "inlined",
    "legacyIndent",
    "legacyPosition",
    "name",
    "required",
];

/// Pedigree attributes carried onto synthesized codesets.
const PEDIGREE_KEYS: &[&str] = &[
    "added",
    "addedEP",
    "updated",
    "updatedEP",
    "deprecated",
    "deprecatedEP",
];

/// How the Orchestra repository `version` attribute is derived from the
/// Unified `fix` version string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepositoryVersion {
    /// The whole Unified version string, e.g. `FIX.Latest_EP269`.
    #[default]
    Full,
    /// Only the portion before the first underscore, e.g. `FIX.Latest`.
    BaseOnly,
}

/// Translates a Unified Repository pair into an Orchestra version 1.0
/// repository.
#[derive(Debug, Default)]
pub struct Unified2Orchestra {
    /// Which `fix` version block to convert; the first block in document
    /// order when not set.
    pub version: Option<String>,
    /// Repository `version` derivation (the repository `name` always uses
    /// the portion before the first underscore).
    pub repository_version: RepositoryVersion,
}

impl Unified2Orchestra {
    pub fn new() -> Self {
        Unified2Orchestra::default()
    }

    /// Translates a decoded Unified pair into a fresh Orchestra instance.
    ///
    /// Fails when the requested `fix` version block does not exist.
    pub fn translate(
        &self,
        unified: &UnifiedWithPhrases,
    ) -> Result<OrchestraInstance10, TransposerError> {
        let fix = unified
            .main
            .fix(self.version.as_deref())
            .ok_or(TransposerError::MissingElement("fix"))?;
        let mut orch = OrchestraInstance10::new();
        self.metadata(fix, &mut orch);
        self.sections(fix, &mut orch);
        self.categories(fix, &mut orch);
        self.datatypes(fix, &mut orch);
        self.codesets(fix, &mut orch);
        self.fields(fix, &mut orch);
        self.components(fix, &mut orch);
        self.groups(fix, &mut orch);
        self.messages(fix, &mut orch);
        Ok(orch)
    }

    /// Translates Unified main and phrases document streams into an
    /// Orchestra document stream.
    ///
    /// Decode findings abort the conversion and are returned as the error
    /// list; no output is written in that case.
    pub fn translate_xml<R1: BufRead, R2: BufRead, W: Write>(
        &self,
        unified_xml: R1,
        phrases_xml: R2,
        orch_out: W,
    ) -> Result<Vec<TransposerError>, TransposerError> {
        let (unified, errors) = Unified::read_xml_all(unified_xml, phrases_xml)?;
        if !errors.is_empty() {
            for e in &errors {
                error!("{e}");
            }
            return Ok(errors);
        }
        let orch = self.translate(&unified)?;
        let errors = Orchestra10::write_xml(&orch, orch_out)?;
        for e in &errors {
            error!("{e}");
        }
        Ok(errors)
    }

    fn metadata(&self, fix: &Node, orch: &mut OrchestraInstance10) {
        let version = fix
            .attr_text("version")
            .map(|v| v.into_owned())
            .unwrap_or_else(|| {
                warn!("fix block has no version attribute");
                "Unknown".to_string()
            });
        let base = version
            .split('_')
            .next()
            .unwrap_or(version.as_str())
            .to_string();
        let repository_version = match self.repository_version {
            RepositoryVersion::Full => version.clone(),
            RepositoryVersion::BaseOnly => base.clone(),
        };
        orch.root_mut().set_attr("version", repository_version);
        orch.root_mut().set_attr("name", base.as_str());
        orch.set_metadata_term("dcterms:title", &base);
        orch.set_metadata_term("dcterms:date", &super::timestamp());
    }

    fn sections(&self, fix: &Node, orch: &mut OrchestraInstance10) {
        for unified_section in UnifiedMainInstance::sections(fix) {
            let mut section = Node::new("fixr:section");
            if let Some(id) = unified_section.attr_text("id") {
                section.set_attr("name", id.into_owned());
            }
            copy_attrs_except(unified_section, &mut section, SECTION_EXCLUDES);
            orch.append_section(section);
        }
    }

    fn categories(&self, fix: &Node, orch: &mut OrchestraInstance10) {
        for unified_category in UnifiedMainInstance::categories(fix) {
            let mut category = Node::new("fixr:category");
            if let Some(id) = unified_category.attr_text("id") {
                category.set_attr("name", id.into_owned());
            }
            copy_attrs_except(unified_category, &mut category, CATEGORY_EXCLUDES);
            orch.append_category(category);
        }
    }

    fn datatypes(&self, fix: &Node, orch: &mut OrchestraInstance10) {
        for unified_datatype in UnifiedMainInstance::datatypes(fix) {
            let mut datatype = Node::new("fixr:datatype");
            copy_attrs_except(unified_datatype, &mut datatype, DATATYPE_EXCLUDES);
            if let Some(xml) = unified_datatype.child("XML") {
                let mut mapping = Node::new("fixr:mappedDatatype");
                copy_attrs_except(xml, &mut mapping, DATATYPE_EXCLUDES);
                mapping.set_attr("standard", "XML");
                let builtin = matches!(xml.attr_str("builtin"), Some("1") | Some("true"));
                mapping.set_attr("builtin", builtin);
                datatype.push_child(mapping);
            }
            orch.append_datatype(datatype);
        }
    }

    /// Synthesizes a `<FieldName>CodeSet` for every field carrying inline
    /// enum entries; code ids are `fieldId * 100 + position`.
    fn codesets(&self, fix: &Node, orch: &mut OrchestraInstance10) {
        for unified_field in UnifiedMainInstance::fields(fix) {
            if unified_field.children_named("enum").next().is_none() {
                continue;
            }
            let field_name = unified_field.attr_str("name").unwrap_or("Unknown");
            let field_id = unified_field.attr_i64("id").unwrap_or(0);
            let mut codeset = Node::new("fixr:codeSet");
            codeset.set_attr("name", format!("{field_name}CodeSet"));
            codeset.set_attr("id", field_id);
            if let Some(field_type) = unified_field.attr_text("type") {
                codeset.set_attr("type", field_type.into_owned());
            }
            for key in PEDIGREE_KEYS {
                if let Some(value) = unified_field.attr(key) {
                    codeset.set_attr(*key, value.clone());
                }
            }
            for (idx, entry) in unified_field.children_named("enum").enumerate() {
                let mut code = Node::new("fixr:code");
                if let Some(symbolic) = entry.attr_text("symbolicName") {
                    code.set_attr("name", symbolic.into_owned());
                }
                code.set_attr("id", field_id * 100 + idx as i64 + 1);
                if let Some(value) = entry.attr_text("value") {
                    code.set_attr("value", value.into_owned());
                }
                codeset.push_child(code);
            }
            orch.append_codeset(codeset);
        }
    }

    fn fields(&self, fix: &Node, orch: &mut OrchestraInstance10) {
        for unified_field in UnifiedMainInstance::fields(fix) {
            let mut field = Node::new("fixr:field");
            copy_attrs_except(unified_field, &mut field, FIELD_EXCLUDES);
            if unified_field.children_named("enum").next().is_some() {
                // The codeset name follows the field that owns the enum
                // block, or the field `enumDatatype` points at when the
                // block is shared.
                let mut codeset_name =
                    unified_field.attr_str("name").unwrap_or("Unknown").to_string();
                if let Some(enum_id) = unified_field.attr_i64("enumDatatype") {
                    match UnifiedMainInstance::field_by_id(fix, enum_id) {
                        Some(enum_field) => {
                            if let Some(name) = enum_field.attr_str("name") {
                                codeset_name = name.to_string();
                            }
                        }
                        None => warn!("enumDatatype {enum_id} does not resolve to a field"),
                    }
                }
                field.set_attr("type", format!("{codeset_name}CodeSet"));
            }
            if let Some(assoc_id) = unified_field.attr_i64("associatedDataTag") {
                match UnifiedMainInstance::field_by_id(fix, assoc_id) {
                    Some(assoc_field) => {
                        field.set_attr("lengthId", assoc_field.attr_i64("id").unwrap_or(assoc_id));
                    }
                    None => warn!("associatedDataTag {assoc_id} does not resolve to a field"),
                }
            }
            orch.append_field(field);
        }
    }

    fn components(&self, fix: &Node, orch: &mut OrchestraInstance10) {
        for unified_component in UnifiedMainInstance::components(fix) {
            if is_repeating(unified_component) {
                continue;
            }
            let mut component = Node::new("fixr:component");
            copy_attrs_except(unified_component, &mut component, COMPONENT_EXCLUDES);
            self.members(fix, &mut component, unified_component);
            orch.append_component(component);
        }
    }

    /// Repeating components become groups; their members and the group
    /// dimension live in the nested `repeatingGroup` block.
    fn groups(&self, fix: &Node, orch: &mut OrchestraInstance10) {
        for unified_component in UnifiedMainInstance::components(fix) {
            if !is_repeating(unified_component) {
                continue;
            }
            let mut group = Node::new("fixr:group");
            copy_attrs_except(unified_component, &mut group, COMPONENT_EXCLUDES);
            let body = unified_component
                .child("repeatingGroup")
                .unwrap_or(unified_component);
            if let Some(num_in_group) = body.attr_i64("id") {
                let mut counter = Node::new("fixr:numInGroup");
                counter.set_attr("id", num_in_group);
                group.push_child(counter);
            }
            self.members(fix, &mut group, body);
            orch.append_group(group);
        }
    }

    fn messages(&self, fix: &Node, orch: &mut OrchestraInstance10) {
        for unified_message in UnifiedMainInstance::messages(fix) {
            let mut message = Node::new("fixr:message");
            copy_attrs_except(unified_message, &mut message, MESSAGE_EXCLUDES);
            let body = orchestra::structure(&mut message);
            self.members(fix, body, unified_message);
            orch.append_message(message);
        }
    }

    /// Member references in source order. A Unified `componentRef` becomes a
    /// `groupRef` when the component it names is repeating; an unresolvable
    /// component keeps a plain `componentRef` so the reference is not lost.
    fn members(&self, fix: &Node, target: &mut Node, unified_structure: &Node) {
        for member in unified_structure.children() {
            match member.name() {
                "fieldRef" => {
                    let mut field_ref = Node::new("fixr:fieldRef");
                    copy_attrs_except(member, &mut field_ref, MEMBER_EXCLUDES);
                    field_ref.set_attr("presence", map_presence(member));
                    append_to_structure(target, field_ref);
                }
                "componentRef" => {
                    let repeating = match member.attr_i64("id") {
                        Some(id) => match UnifiedMainInstance::component_by_id(fix, id) {
                            Some(component) => is_repeating(component),
                            None => {
                                warn!("componentRef id={id} does not resolve");
                                false
                            }
                        },
                        None => {
                            warn!("componentRef without id");
                            false
                        }
                    };
                    let name = if repeating {
                        "fixr:groupRef"
                    } else {
                        "fixr:componentRef"
                    };
                    let mut component_ref = Node::new(name);
                    copy_attrs_except(member, &mut component_ref, MEMBER_EXCLUDES);
                    component_ref.set_attr("presence", map_presence(member));
                    append_to_structure(target, component_ref);
                }
                _ => {}
            }
        }
    }
}

fn is_repeating(component: &Node) -> bool {
    component.attr_i64("repeating") == Some(1)
}

/// Unified `required` flag to Orchestra presence vocabulary.
fn map_presence(member: &Node) -> &'static str {
    if member.attr_i64("required") == Some(1) {
        "required"
    } else {
        "optional"
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
