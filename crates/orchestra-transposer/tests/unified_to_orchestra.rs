// crates/orchestra-transposer/tests/unified_to_orchestra.rs

//! Unified → Orchestra translation behavior: codeset synthesis, repeating
//! components, association resolution, and version handling.

use orchestra_transposer::{RepositoryVersion, TransposerError, Unified2Orchestra};
use orchestra_transposer::orchestra::{OrchestraInstance10, Repository};
use orchestra_transposer::unified::Unified;

const UNIFIED_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<fixRepository generated="2026-08-01T00:00:00">
  <fix version="FIX.Latest_EP269">
    <sections>
      <section id="Session" displayOrder="1" volume="1" notReqXML="1"/>
    </sections>
    <categories>
      <category id="Common" section="Session" volume="2" generateImplFile="0"/>
    </categories>
    <datatypes>
      <datatype name="String">
        <XML builtin="1" base="xs:string"/>
      </datatype>
    </datatypes>
    <fields>
      <field id="54" name="Side" type="char" added="FIX.2.7" addedEP="-1" textId="FIELD_54">
        <enum value="1" symbolicName="Buy"/>
        <enum value="2" symbolicName="Sell"/>
      </field>
      <field id="40" name="OrdType" type="char" enumDatatype="54" textId="FIELD_40">
        <enum value="1" symbolicName="Market"/>
      </field>
      <field id="93" name="SignatureLength" type="Length"/>
      <field id="89" name="Signature" type="data" associatedDataTag="93"/>
      <field id="55" name="Symbol" type="String"/>
      <field id="888" name="UnderlyingStipType" type="String"/>
      <field id="887" name="NoUnderlyingStips" type="NumInGroup"/>
    </fields>
    <components>
      <component id="1001" name="Instrument" type="Block">
        <fieldRef id="55" required="1"/>
      </component>
      <component id="2070" name="UnderlyingStipulations" type="BlockRepeating" repeating="1">
        <repeatingGroup id="887" required="0">
          <fieldRef id="888" required="0"/>
        </repeatingGroup>
      </component>
    </components>
    <messages>
      <message id="99" name="NewOrderSingle" msgType="D" section="Trade" notReqXML="0">
        <fieldRef id="54" required="1"/>
        <componentRef id="1001" required="0"/>
        <componentRef id="2070" required="0"/>
      </message>
    </messages>
  </fix>
</fixRepository>"#;

const PHRASES_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<phrases langId="en">
  <phrase textId="FIELD_54">
    <text purpose="SYNOPSIS"><para>Side of order.</para></text>
  </phrase>
</phrases>"#;

fn translate(translator: &Unified2Orchestra) -> OrchestraInstance10 {
    let (unified, errors) =
        Unified::read_xml_all(UNIFIED_DOC.as_bytes(), PHRASES_DOC.as_bytes()).unwrap();
    assert!(errors.is_empty(), "unexpected findings: {errors:?}");
    translator.translate(&unified).unwrap()
}

#[test]
fn test_repository_naming_from_version() {
    let orch = translate(&Unified2Orchestra::new());
    assert_eq!(orch.root().attr_text("name").unwrap(), "FIX.Latest");
    assert_eq!(orch.root().attr_text("version").unwrap(), "FIX.Latest_EP269");
    assert_eq!(orch.metadata_term("dcterms:title"), Some("FIX.Latest"));
    assert!(orch.metadata_term("dcterms:date").is_some());
}

#[test]
fn test_repository_version_style_is_configurable() {
    let translator = Unified2Orchestra {
        repository_version: RepositoryVersion::BaseOnly,
        ..Unified2Orchestra::new()
    };
    let orch = translate(&translator);
    assert_eq!(orch.root().attr_text("version").unwrap(), "FIX.Latest");
}

#[test]
fn test_missing_version_block_is_fatal() {
    let (unified, _) =
        Unified::read_xml_all(UNIFIED_DOC.as_bytes(), PHRASES_DOC.as_bytes()).unwrap();
    let translator = Unified2Orchestra {
        version: Some("FIX.4.4".to_string()),
        ..Unified2Orchestra::new()
    };
    assert!(matches!(
        translator.translate(&unified),
        Err(TransposerError::MissingElement("fix"))
    ));
}

#[test]
fn test_sections_and_categories_drop_bookkeeping_attributes() {
    let orch = translate(&Unified2Orchestra::new());

    let section = orch.sections().next().unwrap();
    assert_eq!(section.attr_str("name"), Some("Session"));
    assert_eq!(section.attr_str("displayOrder"), Some("1"));
    assert!(section.attr("id").is_none());
    assert!(section.attr("volume").is_none());
    assert!(section.attr("notReqXML").is_none());

    let category = orch.categories().next().unwrap();
    assert_eq!(category.attr_str("name"), Some("Common"));
    assert!(category.attr("generateImplFile").is_none());
}

#[test]
fn test_datatype_xml_mapping() {
    let orch = translate(&Unified2Orchestra::new());
    let datatype = orch.datatypes().next().unwrap();
    assert_eq!(datatype.attr_str("name"), Some("String"));
    let mapping = datatype.child("fixr:mappedDatatype").unwrap();
    assert_eq!(mapping.attr_str("standard"), Some("XML"));
    assert_eq!(mapping.attr_str("base"), Some("xs:string"));
    assert_eq!(mapping.attr_text("builtin").unwrap(), "true");
}

#[test]
fn test_codesets_synthesized_from_inline_enums() {
    let orch = translate(&Unified2Orchestra::new());

    let side = orch.codeset_by_name("SideCodeSet").unwrap();
    assert_eq!(side.attr_i64("id"), Some(54));
    assert_eq!(side.attr_str("type"), Some("char"));
    // Pedigree attributes carry over onto the synthesized codeset.
    assert_eq!(side.attr_str("added"), Some("FIX.2.7"));
    assert_eq!(side.attr_str("addedEP"), Some("-1"));
    let codes: Vec<(i64, &str, &str)> = side
        .children_named("fixr:code")
        .map(|c| {
            (
                c.attr_i64("id").unwrap(),
                c.attr_str("name").unwrap(),
                c.attr_str("value").unwrap(),
            )
        })
        .collect();
    assert_eq!(codes, vec![(5401, "Buy", "1"), (5402, "Sell", "2")]);

    // A field with its own enum block also gets a codeset.
    let ord_type = orch.codeset_by_name("OrdTypeCodeSet").unwrap();
    assert_eq!(ord_type.attr_i64("id"), Some(40));
    let code_ids: Vec<i64> = ord_type
        .children_named("fixr:code")
        .map(|c| c.attr_i64("id").unwrap())
        .collect();
    assert_eq!(code_ids, vec![4001]);
}

#[test]
fn test_field_types_and_associations() {
    let orch = translate(&Unified2Orchestra::new());

    // A field with an enum block references its own synthesized codeset,
    // unless enumDatatype points at the field that owns the shared block.
    let side = orch.field(54).unwrap();
    assert_eq!(side.attr_str("type"), Some("SideCodeSet"));
    let ord_type = orch.field(40).unwrap();
    assert_eq!(ord_type.attr_str("type"), Some("SideCodeSet"));
    assert!(ord_type.attr("enumDatatype").is_none());

    // associatedDataTag resolves to lengthId.
    let signature = orch.field(89).unwrap();
    assert_eq!(signature.attr_i64("lengthId"), Some(93));
    assert!(signature.attr("associatedDataTag").is_none());

    // Bookkeeping attributes never carry over.
    assert!(side.attr("textId").is_none());
}

#[test]
fn test_repeating_components_become_groups() {
    let orch = translate(&Unified2Orchestra::new());

    let component = orch.component(1001).unwrap();
    assert_eq!(component.attr_str("name"), Some("Instrument"));
    assert!(component.attr("type").is_none());
    let member = component.child("fixr:fieldRef").unwrap();
    assert_eq!(member.attr_i64("id"), Some(55));
    assert_eq!(member.attr_str("presence"), Some("required"));

    let group = orch.group(2070).unwrap();
    assert_eq!(group.attr_str("name"), Some("UnderlyingStipulations"));
    assert!(group.attr("repeating").is_none());
    // The group dimension comes from the repeatingGroup block.
    let names: Vec<&str> = group.children().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["fixr:numInGroup", "fixr:fieldRef"]);
    assert_eq!(
        group.child("fixr:numInGroup").unwrap().attr_i64("id"),
        Some(887)
    );
    let stip = group.child("fixr:fieldRef").unwrap();
    assert_eq!(stip.attr_i64("id"), Some(888));
    assert_eq!(stip.attr_str("presence"), Some("optional"));
}

#[test]
fn test_message_members_split_into_component_and_group_refs() {
    let orch = translate(&Unified2Orchestra::new());
    let message = orch.messages().next().unwrap();
    assert_eq!(message.attr_str("name"), Some("NewOrderSingle"));
    assert!(message.attr("section").is_none());

    let body = message.child("fixr:structure").unwrap();
    let members: Vec<(&str, i64, &str)> = body
        .children()
        .iter()
        .map(|m| {
            (
                m.name(),
                m.attr_i64("id").unwrap(),
                m.attr_str("presence").unwrap(),
            )
        })
        .collect();
    assert_eq!(
        members,
        vec![
            ("fixr:fieldRef", 54, "required"),
            ("fixr:componentRef", 1001, "optional"),
            ("fixr:groupRef", 2070, "optional"),
        ]
    );
}
