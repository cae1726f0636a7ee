// crates/orchestra-transposer/tests/roundtrip.rs

//! Structural round-trip tests: encoding a decoded document and decoding it
//! again must reproduce the same tree, attributes and order included.

use orchestra_transposer::TransposerError;
use orchestra_transposer::orchestra::{Orchestra10, Repository};
use orchestra_transposer::sbe::Sbe10;
use orchestra_transposer::unified::{UnifiedMain, UnifiedPhrases};

const ORCHESTRA_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<fixr:repository xmlns:fixr="http://fixprotocol.io/2020/orchestra/repository"
    xmlns:dcterms="http://purl.org/dc/terms/"
    xmlns:dc="http://purl.org/dc/elements/1.1/"
    name="TestFIX" version="FIX.Latest">
  <fixr:metadata>
    <dcterms:title>TestFIX</dcterms:title>
    <dcterms:identifier>9</dcterms:identifier>
  </fixr:metadata>
  <fixr:codeSets>
    <fixr:codeSet name="SideCodeSet" id="164" type="char">
      <fixr:code name="Buy" id="16401" value="1" sort="1"/>
      <fixr:code name="Sell" id="16402" value="2" sort="2"/>
    </fixr:codeSet>
  </fixr:codeSets>
  <fixr:fields>
    <fixr:field id="54" name="Side" type="SideCodeSet">
      <fixr:annotation>
        <fixr:documentation purpose="SYNOPSIS">Side of order.</fixr:documentation>
      </fixr:annotation>
    </fixr:field>
    <fixr:field id="112" name="TestReqID" type="String"/>
  </fixr:fields>
  <fixr:messages>
    <fixr:message name="Heartbeat" id="1" msgType="0">
      <fixr:structure>
        <fixr:fieldRef id="112" presence="optional"/>
      </fixr:structure>
    </fixr:message>
  </fixr:messages>
</fixr:repository>"#;

const SBE_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sbe:messageSchema xmlns:sbe="http://fixprotocol.io/2016/sbe"
    package="test" id="2" version="4">
  <types>
    <type name="idString" primitiveType="char" length="8"/>
    <enum name="SideEnum" encodingType="char">
      <validValue name="Buy">1</validValue>
      <validValue name="Sell">2</validValue>
    </enum>
  </types>
  <sbe:message name="NewOrder" id="14" semanticType="D">
    <field name="ClOrdID" id="11" type="idString" presence="required"/>
    <group name="Parties" id="453">
      <field name="PartyID" id="448" type="idString" presence="optional"/>
    </group>
    <data name="EncodedText" id="355" type="varData" presence="optional"/>
  </sbe:message>
</sbe:messageSchema>"#;

const UNIFIED_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<fixRepository generated="2010-03-13T14:54:02">
  <fix version="FIX.4.4">
    <fields>
      <field id="54" name="Side" type="char" notReqXML="1">
        <enum value="1" symbolicName="Buy"/>
      </field>
    </fields>
  </fix>
</fixRepository>"#;

const PHRASES_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<phrases langId="en">
  <phrase textId="FIELD_54">
    <text purpose="SYNOPSIS">
      <para>Side of order.</para>
    </text>
  </phrase>
</phrases>"#;

#[test]
fn test_orchestra_round_trip() {
    let (first, errors) = Orchestra10::read_xml(ORCHESTRA_DOC.as_bytes()).unwrap();
    assert!(errors.is_empty(), "unexpected findings: {errors:?}");

    let mut encoded = Vec::new();
    let errors = Orchestra10::write_xml(&first, &mut encoded).unwrap();
    assert!(errors.is_empty());

    let (second, errors) = Orchestra10::read_xml(encoded.as_slice()).unwrap();
    assert!(errors.is_empty());
    assert_eq!(first.root(), second.root());
}

#[test]
fn test_sbe_round_trip() {
    let (first, errors) = Sbe10::read_xml(SBE_DOC.as_bytes()).unwrap();
    assert!(errors.is_empty(), "unexpected findings: {errors:?}");

    let mut encoded = Vec::new();
    Sbe10::write_xml(&first, &mut encoded).unwrap();
    let text = String::from_utf8(encoded.clone()).unwrap();
    // The schema root and messages keep their prefix; types stay bare.
    assert!(text.contains("<sbe:messageSchema"));
    assert!(text.contains("<sbe:message "));
    assert!(text.contains("<types>"));

    let (second, errors) = Sbe10::read_xml(encoded.as_slice()).unwrap();
    assert!(errors.is_empty());
    assert_eq!(first.root(), second.root());
}

#[test]
fn test_unified_round_trip() {
    let (first, errors) = UnifiedMain::read_xml(UNIFIED_DOC.as_bytes()).unwrap();
    assert!(errors.is_empty());

    let mut encoded = Vec::new();
    UnifiedMain::write_xml(&first, &mut encoded).unwrap();
    let (second, errors) = UnifiedMain::read_xml(encoded.as_slice()).unwrap();
    assert!(errors.is_empty());
    assert_eq!(first.root(), second.root());
}

#[test]
fn test_phrases_round_trip_and_lookup() {
    let (first, errors) = UnifiedPhrases::read_xml(PHRASES_DOC.as_bytes()).unwrap();
    assert!(errors.is_empty());
    assert_eq!(
        first.text_id("FIELD_54"),
        vec![(Some("SYNOPSIS".to_string()), "Side of order.".to_string())]
    );
    assert!(first.text_id("FIELD_55").is_empty());

    let mut encoded = Vec::new();
    UnifiedPhrases::write_xml(&first, &mut encoded).unwrap();
    let (second, errors) = UnifiedPhrases::read_xml(encoded.as_slice()).unwrap();
    assert!(errors.is_empty());
    assert_eq!(first.root(), second.root());
}

#[test]
fn test_attribute_order_matches_document_order() {
    let (instance, _) = Sbe10::read_xml(SBE_DOC.as_bytes()).unwrap();
    let message = instance.messages().next().unwrap();
    let keys: Vec<&str> = message.attrs().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["name", "id", "semanticType"]);
}

#[test]
fn test_wrong_root_is_a_finding_not_a_failure() {
    let doc = r#"<?xml version="1.0"?><notARepository name="x"/>"#;
    let (instance, errors) = Orchestra10::read_xml(doc.as_bytes()).unwrap();
    assert_eq!(instance.root().name(), "notARepository");
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0],
        TransposerError::UnexpectedRoot { expected: "fixr:repository", .. }
    ));
}

#[test]
fn test_malformed_xml_is_fatal() {
    let doc = "<fixr:repository><fixr:fields></fixr:repository>";
    assert!(Orchestra10::read_xml(doc.as_bytes()).is_err());
}

#[test]
fn test_empty_input_is_fatal() {
    let result = Orchestra10::read_xml("".as_bytes());
    assert!(matches!(result, Err(TransposerError::EmptyDocument)));
}
