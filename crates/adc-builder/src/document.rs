use std::cell::RefCell;
use std::rc::Rc;

use adc_types::{
    decode, encode_array, envelope, is_envelope, Field, IntoScalar, KindMismatch, Scalar,
    ScalarArray, ScalarKind, TimePair,
};
use serde_json::{Map, Value};
use tracing::debug;

// Both maps keep insertion order.
#[derive(Debug, Default)]
struct Node {
    fields: Map<String, Value>,
    children: Vec<(String, Document)>,
}

impl Node {
    fn child(&self, name: &str) -> Option<&Document> {
        self.children
            .iter()
            .find_map(|(key, child)| (key == name).then_some(child))
    }
}

/// A named tree of typed fields and child documents.
///
/// `Document` is a shared handle: cloning it, or attaching it as a section,
/// aliases the same node. Changes made through any handle are visible through
/// every other, including parents it was attached to. Handles are not `Send`.
///
/// Field names may be rewritten freely. A section name is permanent: once a
/// name denotes a field or a section, attaching another section under it is
/// ignored.
#[derive(Debug, Clone, Default)]
pub struct Document {
    node: Rc<RefCell<Node>>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a native value, replacing any field of the same name.
    pub fn add<T: IntoScalar>(&self, name: &str, value: T) {
        self.add_scalar(name, value.into_scalar());
    }

    /// Stores an already-tagged value, including kinds this build cannot
    /// represent (only their tag is kept).
    pub fn add_scalar(&self, name: &str, value: Scalar) {
        self.put(name, envelope(&value));
    }

    /// Stores an 8-bit character code unit.
    pub fn add_char8(&self, name: &str, value: u8) {
        self.add_scalar(name, Scalar::Char8(value));
    }

    /// Stores a 16-bit character code unit.
    pub fn add_char16(&self, name: &str, value: u16) {
        self.add_scalar(name, Scalar::Char16(value));
    }

    /// Stores a 32-bit character code point.
    pub fn add_char32(&self, name: &str, value: u32) {
        self.add_scalar(name, Scalar::Char32(value));
    }

    /// Stores a string naming a file-system path.
    pub fn add_path(&self, name: &str, value: impl Into<String>) {
        self.add_scalar(name, Scalar::Path(value.into()));
    }

    /// Stores serialized JSON text; the text is not validated.
    pub fn add_json_string(&self, name: &str, value: impl Into<String>) {
        self.add_scalar(name, Scalar::JsonStr(value.into()));
    }

    /// Stores YAML text; the text is not validated.
    pub fn add_yaml_string(&self, name: &str, value: impl Into<String>) {
        self.add_scalar(name, Scalar::YamlStr(value.into()));
    }

    /// Stores XML text; the text is not validated.
    pub fn add_xml_string(&self, name: &str, value: impl Into<String>) {
        self.add_scalar(name, Scalar::XmlStr(value.into()));
    }

    /// Stores a decimal number of arbitrary precision as text.
    pub fn add_number_string(&self, name: &str, value: impl Into<String>) {
        self.add_scalar(name, Scalar::NumberStr(value.into()));
    }

    /// Stores a JSON value as its serialized text.
    pub fn add_json(&self, name: &str, value: &Value) {
        self.add_scalar(name, Scalar::Json(value.to_string()));
    }

    /// Stores a `(seconds, nanoseconds)` pair.
    pub fn add_timespec(&self, name: &str, value: TimePair) {
        self.add_scalar(name, Scalar::Timespec(value));
    }

    /// Stores a `(seconds, microseconds)` pair.
    pub fn add_timeval(&self, name: &str, value: TimePair) {
        self.add_scalar(name, Scalar::Timeval(value));
    }

    /// Stores seconds since the UNIX epoch.
    pub fn add_epoch(&self, name: &str, seconds: i64) {
        self.add_scalar(name, Scalar::Epoch(seconds));
    }

    /// Stores a homogeneous array of native values.
    ///
    /// `container` is free-form provenance (`"vector"`, `"set"`, ...) carried
    /// for diagnostics only.
    pub fn add_array<T, I>(&self, name: &str, values: I, container: Option<&str>)
    where
        T: IntoScalar,
        I: IntoIterator<Item = T>,
    {
        self.add_scalar_array(name, &ScalarArray::from_values(values), container);
    }

    /// Stores raw bytes as a `char8` array; embedded NULs are kept.
    pub fn add_char8_array(&self, name: &str, bytes: &[u8], container: Option<&str>) {
        self.add_scalar_array(name, &ScalarArray::chars8(bytes), container);
    }

    /// Stores strings as an array of one string flavor.
    ///
    /// # Errors
    ///
    /// Returns [`KindMismatch`] when `kind` is not a string-flavored kind; the
    /// document is left unchanged.
    pub fn add_text_array<I, S>(
        &self,
        name: &str,
        kind: ScalarKind,
        values: I,
        container: Option<&str>,
    ) -> Result<(), KindMismatch>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let array = ScalarArray::text(kind, values)?;
        self.add_scalar_array(name, &array, container);
        Ok(())
    }

    /// Stores an already-assembled array.
    pub fn add_scalar_array(&self, name: &str, values: &ScalarArray, container: Option<&str>) {
        self.put(name, encode_array(values, container));
    }

    /// Attaches `child` under `name`.
    ///
    /// Returns `false`, leaving the document unchanged, when `name` already
    /// denotes a field or section, or when `child` contains this document.
    pub fn add_section(&self, name: &str, child: &Document) -> bool {
        if self.ptr_eq(child) || child.reaches(self) {
            debug!(section = name, "ignoring section that would contain its parent");
            return false;
        }
        let mut node = self.node.borrow_mut();
        if node.fields.contains_key(name) || node.child(name).is_some() {
            debug!(section = name, "section name already in use; keeping the first entry");
            return false;
        }
        node.children.push((name.to_string(), child.clone()));
        true
    }

    /// Looks `name` up; sections take precedence over fields.
    pub fn get_value(&self, name: &str) -> Field {
        let node = self.node.borrow();
        if node.child(name).is_some() {
            return Field::section();
        }
        node.fields.get(name).map(decode).unwrap_or_else(Field::none)
    }

    /// Handle to the section registered under `name`.
    pub fn get_section(&self, name: &str) -> Option<Document> {
        self.node.borrow().child(name).cloned()
    }

    /// Names of child sections, in the order they were attached.
    pub fn get_section_names(&self) -> Vec<String> {
        self.node
            .borrow()
            .children
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Names of fields, in the order they were first added.
    pub fn get_field_names(&self) -> Vec<String> {
        self.node.borrow().fields.keys().cloned().collect()
    }

    /// Merges this node and its descendants into one wire object.
    ///
    /// Fields come first, then sections. A child's content replaces a field
    /// stored under the same name, in that field's position.
    pub fn flatten(&self) -> Value {
        let node = self.node.borrow();
        let mut merged = node.fields.clone();
        for (name, child) in &node.children {
            merged.insert(name.clone(), child.flatten());
        }
        Value::Object(merged)
    }

    /// Compact JSON text of [`Document::flatten`].
    pub fn serialize(&self) -> String {
        self.flatten().to_string()
    }

    /// Rebuilds a document from a flattened wire object.
    ///
    /// Envelope-shaped objects become fields, other objects become sections,
    /// and anything else is kept as a bare field. A non-object input yields an
    /// empty document.
    pub fn from_wire(wire: &Value) -> Document {
        let document = Document::new();
        let Some(entries) = wire.as_object() else {
            return document;
        };
        for (name, entry) in entries {
            if entry.is_object() && !is_envelope(entry) {
                document.add_section(name, &Document::from_wire(entry));
            } else {
                document.put(name, entry.clone());
            }
        }
        document
    }

    /// Whether both handles refer to the same node.
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    fn reaches(&self, target: &Document) -> bool {
        self.node
            .borrow()
            .children
            .iter()
            .any(|(_, child)| child.ptr_eq(target) || child.reaches(target))
    }

    fn put(&self, name: &str, entry: Value) {
        self.node.borrow_mut().fields.insert(name.to_string(), entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adc_types::KeyKind;
    use serde_json::json;
    use tracing_test::traced_test;

    #[test]
    fn later_field_writes_win() {
        let doc = Document::new();
        doc.add("n", 1i32);
        doc.add("n", "one");
        assert_eq!(doc.get_value("n").kind, Some(ScalarKind::Cstr));
        assert_eq!(doc.get_value("n").get::<String>().as_deref(), Some("one"));
    }

    #[test]
    fn field_name_blocks_a_later_section() {
        let doc = Document::new();
        doc.add("x", true);
        assert!(!doc.add_section("x", &Document::new()));
        assert!(doc.get_section("x").is_none());
    }

    #[traced_test]
    #[test]
    fn section_collision_is_logged_not_raised() {
        let doc = Document::new();
        assert!(doc.add_section("x", &Document::new()));
        assert!(!doc.add_section("x", &Document::new()));
        assert!(logs_contain("section name already in use"));
    }

    #[test]
    fn cycles_are_refused() {
        let a = Document::new();
        let b = Document::new();
        assert!(a.add_section("b", &b));
        assert!(!b.add_section("a", &a));
        assert!(!a.add_section("self", &a));
        assert_eq!(b.get_section_names(), Vec::<String>::new());
    }

    #[test]
    fn missing_names_are_none() {
        let doc = Document::new();
        assert_eq!(doc.get_value("nope").key, KeyKind::None);
    }

    #[test]
    fn kind_specific_encoders_tag_their_values() {
        let doc = Document::new();
        doc.add_path("p", "/tmp");
        doc.add_yaml_string("y", "a: 1");
        doc.add_json("j", &json!({"k": [1, 2]}));
        doc.add_epoch("e", 17);
        doc.add_char16("c", 0x3042);
        assert_eq!(
            doc.flatten(),
            json!({
                "c": {"type": "char16", "value": 12354},
                "e": {"type": "epoch", "value": 17},
                "j": {"type": "json", "value": "{\"k\":[1,2]}"},
                "p": {"type": "path", "value": "/tmp"},
                "y": {"type": "yaml_str", "value": "a: 1"}
            })
        );
    }

    #[test]
    fn text_array_rejects_non_text_kind() {
        let doc = Document::new();
        assert!(doc
            .add_text_array("t", ScalarKind::Int8, ["a"], None)
            .is_err());
        assert!(doc.get_field_names().is_empty());
        doc.add_text_array("t", ScalarKind::XmlStr, ["<a/>"], Some("list"))
            .unwrap();
        assert_eq!(doc.get_value("t").kind, Some(ScalarKind::XmlStr));
    }
}
