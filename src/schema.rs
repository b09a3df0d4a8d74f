//! Protobuf schema model types and loading.
//!
//! The model is a fully-resolved schema graph produced by an external
//! descriptor dumper and serialized as JSON: files own messages and enums,
//! messages own fields, nested declarations, and oneof groups. Type
//! references are package-qualified name strings (e.g.,
//! `"example.v1.Shipment.Status"`, `"google.protobuf.Duration"`); the name
//! resolver cross-links them, so no `.proto` source parsing happens here.
//!
//! ```json
//! {
//!   "files": [{
//!     "name": "example/v1/shipment.proto",
//!     "package": "example.v1",
//!     "messages": [{
//!       "name": "Shipment",
//!       "fields": [
//!         {"name": "shipment_id", "type": {"scalar": "string"}},
//!         {"name": "lines", "label": "repeated",
//!          "type": {"message": "example.v1.LineItem"}},
//!         {"name": "metadata",
//!          "type": {"map": {"key": "string",
//!                           "value": {"message": "google.protobuf.Duration"}}}}
//!       ]
//!     }]
//!   }]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// The full schema graph for one generation run: every compilation unit the
/// generator will emit types for, plus everything they reference.
#[derive(Debug, Deserialize)]
pub struct SchemaSet {
    /// All schema files, in declaration order.
    pub files: Vec<SchemaFile>,
}

/// A single compilation unit (one `.proto` file's declarations).
#[derive(Debug, Deserialize)]
pub struct SchemaFile {
    /// File path identifying the unit (e.g., `"example/v1/shipment.proto"`).
    pub name: String,

    /// Package name used for qualification (e.g., `"example.v1"`).
    #[serde(default)]
    pub package: String,

    /// Top-level messages, in declaration order.
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Top-level enums, in declaration order.
    #[serde(default)]
    pub enums: Vec<Enum>,
}

/// A protobuf message declaration.
///
/// Nested messages and enums are owned by their parent; the name resolver
/// flattens them into top-level named types because the emitted
/// representation has no nested-declaration concept.
#[derive(Debug, Deserialize)]
pub struct Message {
    /// Simple (unqualified) message name (e.g., `"Shipment"`).
    pub name: String,

    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<Field>,

    /// Oneof group names declared in this message. Fields reference a group
    /// through [`Field::oneof`].
    #[serde(default)]
    pub oneofs: Vec<String>,

    /// Nested message declarations.
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Nested enum declarations.
    #[serde(default)]
    pub enums: Vec<Enum>,

    /// Leading comment, emitted as a JSDoc block.
    #[serde(default)]
    pub doc: Option<String>,
}

/// A single message field.
#[derive(Debug, Deserialize)]
pub struct Field {
    /// Declared field name (snake_case by convention). The JSON key is
    /// derived from this by lower-camel conversion, never deserialized.
    pub name: String,

    /// Declared type.
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Multiplicity/presence label. Defaults to singular.
    #[serde(default)]
    pub label: Label,

    /// Oneof group membership, naming a group in the enclosing message's
    /// [`Message::oneofs`].
    #[serde(default)]
    pub oneof: Option<String>,

    /// Leading comment, emitted as a JSDoc block.
    #[serde(default)]
    pub doc: Option<String>,
}

/// A field's multiplicity/presence qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// Implicit-presence singular field (proto3 default).
    #[default]
    Singular,

    /// Explicit-presence `optional` field.
    Optional,

    /// Repeated field.
    Repeated,
}

/// A field's declared type.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// A protobuf scalar kind.
    Scalar(ScalarKind),

    /// Reference to a message by qualified name.
    Message(String),

    /// Reference to an enum by qualified name.
    Enum(String),

    /// A `map<K, V>` field. Map values are a [`TypeRef`], so map-of-map is
    /// unrepresentable, matching protobuf.
    Map(MapType),
}

/// Key and value types of a map field.
#[derive(Debug, Deserialize)]
pub struct MapType {
    /// Key scalar kind. Must be an integral or string kind; validated by the
    /// type mapper.
    pub key: ScalarKind,

    /// Value type.
    pub value: TypeRef,
}

/// A non-map, non-repeated type reference, used for map values.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    Scalar(ScalarKind),
    Message(String),
    Enum(String),
}

/// Protobuf scalar field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarKind {
    /// The protobuf keyword for this kind, used in diagnostics.
    pub fn proto_name(self) -> &'static str {
        match self {
            ScalarKind::Double => "double",
            ScalarKind::Float => "float",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::Uint32 => "uint32",
            ScalarKind::Uint64 => "uint64",
            ScalarKind::Sint32 => "sint32",
            ScalarKind::Sint64 => "sint64",
            ScalarKind::Fixed32 => "fixed32",
            ScalarKind::Fixed64 => "fixed64",
            ScalarKind::Sfixed32 => "sfixed32",
            ScalarKind::Sfixed64 => "sfixed64",
            ScalarKind::Bool => "bool",
            ScalarKind::String => "string",
            ScalarKind::Bytes => "bytes",
        }
    }
}

/// A protobuf enum declaration.
#[derive(Debug, Deserialize)]
pub struct Enum {
    /// Simple (unqualified) enum name.
    pub name: String,

    /// Values in declaration order. The first value is conventionally the
    /// zero/unspecified value.
    pub values: Vec<EnumValue>,

    /// Leading comment, emitted as a JSDoc block.
    #[serde(default)]
    pub doc: Option<String>,
}

/// A single named integer value of an enum.
#[derive(Debug, Deserialize)]
pub struct EnumValue {
    /// Value name (e.g., `"STATUS_UNSPECIFIED"`). This is the JSON encoding
    /// of the value.
    pub name: String,

    /// Numeric value.
    pub number: i32,

    /// Leading comment, emitted as a JSDoc block.
    #[serde(default)]
    pub doc: Option<String>,
}

/// Load a schema model from disk.
///
/// The file should contain a JSON-serialized [`SchemaSet`] as produced by a
/// descriptor dumper.
pub fn load_schema(path: &Path) -> Result<SchemaSet> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let set: SchemaSet = serde_json::from_str(&content)?;
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a minimal schema JSON for testing.
    fn minimal_schema_json() -> String {
        r#"{
            "files": [
                {
                    "name": "example/v1/shipment.proto",
                    "package": "example.v1",
                    "messages": [
                        {
                            "name": "Shipment",
                            "fields": [
                                {"name": "shipment_id", "type": {"scalar": "string"}},
                                {"name": "weight_kg", "label": "optional", "type": {"scalar": "double"}},
                                {"name": "lines", "label": "repeated", "type": {"message": "example.v1.LineItem"}},
                                {"name": "status", "type": {"enum": "example.v1.Shipment.Status"}},
                                {"name": "transit_times", "type": {"map": {"key": "string", "value": {"message": "google.protobuf.Duration"}}}},
                                {"name": "tracking_number", "oneof": "reference", "type": {"scalar": "string"}},
                                {"name": "order_id", "oneof": "reference", "type": {"scalar": "int64"}}
                            ],
                            "oneofs": ["reference"],
                            "enums": [
                                {
                                    "name": "Status",
                                    "values": [
                                        {"name": "STATUS_UNSPECIFIED", "number": 0},
                                        {"name": "STATUS_IN_TRANSIT", "number": 1},
                                        {"name": "STATUS_DELIVERED", "number": 2}
                                    ]
                                }
                            ]
                        },
                        {
                            "name": "LineItem",
                            "fields": [
                                {"name": "sku", "type": {"scalar": "string"}},
                                {"name": "quantity", "type": {"scalar": "int32"}}
                            ]
                        }
                    ]
                }
            ]
        }"#
        .to_string()
    }

    #[test]
    fn parse_minimal_schema() {
        let set: SchemaSet = serde_json::from_str(&minimal_schema_json()).unwrap();
        assert_eq!(set.files.len(), 1);
        assert_eq!(set.files[0].package, "example.v1");
        assert_eq!(set.files[0].messages.len(), 2);
    }

    #[test]
    fn parse_field_types() {
        let set: SchemaSet = serde_json::from_str(&minimal_schema_json()).unwrap();
        let shipment = &set.files[0].messages[0];

        assert!(matches!(
            shipment.fields[0].field_type,
            FieldType::Scalar(ScalarKind::String)
        ));
        assert_eq!(shipment.fields[1].label, Label::Optional);
        assert_eq!(shipment.fields[2].label, Label::Repeated);
        assert!(
            matches!(&shipment.fields[3].field_type, FieldType::Enum(name) if name == "example.v1.Shipment.Status")
        );

        let FieldType::Map(map) = &shipment.fields[4].field_type else {
            panic!("expected map field");
        };
        assert_eq!(map.key, ScalarKind::String);
        assert!(
            matches!(&map.value, TypeRef::Message(name) if name == "google.protobuf.Duration")
        );
    }

    #[test]
    fn parse_oneof_membership() {
        let set: SchemaSet = serde_json::from_str(&minimal_schema_json()).unwrap();
        let shipment = &set.files[0].messages[0];

        assert_eq!(shipment.oneofs, vec!["reference".to_string()]);
        assert_eq!(shipment.fields[5].oneof.as_deref(), Some("reference"));
        assert_eq!(shipment.fields[6].oneof.as_deref(), Some("reference"));
        assert_eq!(shipment.fields[0].oneof, None);
    }

    #[test]
    fn parse_nested_enum() {
        let set: SchemaSet = serde_json::from_str(&minimal_schema_json()).unwrap();
        let status = &set.files[0].messages[0].enums[0];

        assert_eq!(status.name, "Status");
        assert_eq!(status.values.len(), 3);
        assert_eq!(status.values[0].name, "STATUS_UNSPECIFIED");
        assert_eq!(status.values[0].number, 0);
    }

    #[test]
    fn label_defaults_to_singular() {
        let json = r#"{"name": "id", "type": {"scalar": "int64"}}"#;
        let field: Field = serde_json::from_str(json).unwrap();
        assert_eq!(field.label, Label::Singular);
        assert_eq!(field.oneof, None);
    }
}
