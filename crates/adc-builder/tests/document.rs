use adc_builder::Document;
use adc_types::{Complex, KeyKind, Scalar, ScalarKind, TimePair};
use serde_json::json;

#[test]
fn first_section_registration_is_permanent() {
    let a = Document::new();
    a.add("from", "a");
    let b = Document::new();
    b.add("from", "b");

    let doc = Document::new();
    assert!(doc.add_section("x", &a));
    assert!(!doc.add_section("x", &b));

    let section = doc.get_section("x").unwrap();
    assert!(section.ptr_eq(&a));
    assert_eq!(section.get_value("from").get::<String>().as_deref(), Some("a"));
}

#[test]
fn section_content_wins_over_a_later_field() {
    let a = Document::new();
    a.add("inner", 1u8);

    let doc = Document::new();
    doc.add_section("x", &a);
    doc.add("x", 5i32);

    assert_eq!(
        doc.flatten(),
        json!({"x": {"inner": {"type": "uint8", "value": 1}}})
    );
    assert_eq!(doc.get_value("x").key, KeyKind::Section);
    assert_eq!(doc.get_field_names(), vec!["x"]);
    assert_eq!(doc.get_section_names(), vec!["x"]);
}

#[test]
fn serialize_is_idempotent() {
    let doc = Document::new();
    doc.add("b", 2.5f64);
    doc.add("a", u64::MAX);
    let child = Document::new();
    child.add_array("v", [1i16, -2, 3], Some("vector"));
    doc.add_section("c", &child);

    let first = doc.serialize();
    assert_eq!(first, doc.serialize());
    assert_eq!(
        first,
        r#"{"b":{"type":"float64","value":2.5},"a":{"type":"uint64","value":"18446744073709551615"},"c":{"v":{"type":"array_int16","container_type":"vector","value":[1,-2,3]}}}"#
    );
}

#[test]
fn shared_sections_alias_across_parents() {
    let shared = Document::new();
    let left = Document::new();
    let right = Document::new();
    left.add_section("s", &shared);
    right.add_section("s", &shared);

    shared.add("late", true);

    assert_eq!(left.flatten()["s"], json!({"late": {"type": "bool", "value": true}}));
    assert_eq!(left.flatten(), right.flatten());
}

#[test]
fn nested_values_read_back_with_their_kinds() {
    let doc = Document::new();
    doc.add("c", Complex::new(1.0f32, -0.5));
    doc.add_timeval("tv", TimePair::new(3, 4));
    doc.add_char8_array("raw", b"a\0b", None);
    doc.add_scalar("big", Scalar::FloatQuad);

    let c = doc.get_value("c");
    assert_eq!(c.kind, Some(ScalarKind::Complex32));
    assert_eq!(c.get::<Complex<f32>>(), Some(Complex::new(1.0, -0.5)));

    assert_eq!(doc.get_value("tv").get::<TimePair>(), Some(TimePair::new(3, 4)));

    let raw = doc.get_value("raw");
    assert_eq!(raw.count, 3);
    assert_eq!(raw.get_array::<u8>(), Some(vec![b'a', 0, b'b']));

    let big = doc.get_value("big");
    assert_eq!(big.kind, Some(ScalarKind::FloatQuad));
    assert_eq!(big.as_scalar(), Some(&Scalar::FloatQuad));
}

#[test]
fn wire_documents_rebuild_into_trees() {
    let wire = json!({
        "header": {
            "application": {"type": "cstr", "value": "demo"},
            "time": {"type": "timespec", "value": [10, 20]}
        },
        "count": {"type": "array_uint64", "container_type": "set", "value": ["1", "2"]},
        "bare": -3,
        "loose": [1, 2]
    });

    let doc = Document::from_wire(&wire);
    assert_eq!(doc.get_section_names(), vec!["header"]);
    assert_eq!(doc.get_field_names(), vec!["count", "bare", "loose"]);

    let header = doc.get_section("header").unwrap();
    assert_eq!(
        header.get_value("application").get::<String>().as_deref(),
        Some("demo")
    );
    assert_eq!(doc.get_value("count").get_array::<u64>(), Some(vec![1, 2]));
    assert_eq!(doc.get_value("bare").get::<i64>(), Some(-3));
    assert!(doc.get_value("loose").is_none());

    assert_eq!(doc.flatten(), wire);
}

#[test]
fn non_object_wire_yields_an_empty_document() {
    let doc = Document::from_wire(&json!([1, 2, 3]));
    assert!(doc.get_field_names().is_empty());
    assert!(doc.get_section_names().is_empty());
    assert_eq!(doc.serialize(), "{}");
}
