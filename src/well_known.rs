//! Well-known protobuf types and their mandated JSON shapes.
//!
//! The protobuf JSON mapping special-cases a fixed set of
//! `google.protobuf.*` types: wrappers encode as nullable scalars,
//! `Duration`/`Timestamp`/`FieldMask` as strings, `Struct`/`Value`/
//! `ListValue` as untyped JSON, `Any` as an object with a literal `@type`
//! key. The table here is consulted before generic message/enum mapping and
//! takes precedence over user declarations with the same qualified name.

use crate::names::to_lower_camel;
use crate::type_map::{JsonPrimitive, ResolvedType};

const WELL_KNOWN_PREFIX: &str = "google.protobuf.";

/// The closed set of well-known types with a special JSON mapping.
///
/// Declaration order is the prologue emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WellKnown {
    Any,
    Duration,
    Empty,
    FieldMask,
    Struct,
    Timestamp,
    BoolValue,
    BytesValue,
    DoubleValue,
    FloatValue,
    Int32Value,
    Int64Value,
    StringValue,
    UInt32Value,
    UInt64Value,
    Value,
    NullValue,
    ListValue,
}

impl WellKnown {
    /// Every well-known type, in prologue emission order.
    pub const ALL: [WellKnown; 18] = [
        WellKnown::Any,
        WellKnown::Duration,
        WellKnown::Empty,
        WellKnown::FieldMask,
        WellKnown::Struct,
        WellKnown::Timestamp,
        WellKnown::BoolValue,
        WellKnown::BytesValue,
        WellKnown::DoubleValue,
        WellKnown::FloatValue,
        WellKnown::Int32Value,
        WellKnown::Int64Value,
        WellKnown::StringValue,
        WellKnown::UInt32Value,
        WellKnown::UInt64Value,
        WellKnown::Value,
        WellKnown::NullValue,
        WellKnown::ListValue,
    ];

    /// Look up a fully-qualified type name in the registry.
    pub fn from_qualified(qualified: &str) -> Option<WellKnown> {
        let bare = qualified.strip_prefix(WELL_KNOWN_PREFIX)?;
        let wkt = match bare {
            "Any" => WellKnown::Any,
            "Duration" => WellKnown::Duration,
            "Empty" => WellKnown::Empty,
            "FieldMask" => WellKnown::FieldMask,
            "Struct" => WellKnown::Struct,
            "Timestamp" => WellKnown::Timestamp,
            "BoolValue" => WellKnown::BoolValue,
            "BytesValue" => WellKnown::BytesValue,
            "DoubleValue" => WellKnown::DoubleValue,
            "FloatValue" => WellKnown::FloatValue,
            "Int32Value" => WellKnown::Int32Value,
            "Int64Value" => WellKnown::Int64Value,
            "StringValue" => WellKnown::StringValue,
            "UInt32Value" => WellKnown::UInt32Value,
            "UInt64Value" => WellKnown::UInt64Value,
            "Value" => WellKnown::Value,
            "NullValue" => WellKnown::NullValue,
            "ListValue" => WellKnown::ListValue,
            _ => return None,
        };
        Some(wkt)
    }

    /// The fully-qualified protobuf type name.
    pub fn qualified(self) -> &'static str {
        match self {
            WellKnown::Any => "google.protobuf.Any",
            WellKnown::Duration => "google.protobuf.Duration",
            WellKnown::Empty => "google.protobuf.Empty",
            WellKnown::FieldMask => "google.protobuf.FieldMask",
            WellKnown::Struct => "google.protobuf.Struct",
            WellKnown::Timestamp => "google.protobuf.Timestamp",
            WellKnown::BoolValue => "google.protobuf.BoolValue",
            WellKnown::BytesValue => "google.protobuf.BytesValue",
            WellKnown::DoubleValue => "google.protobuf.DoubleValue",
            WellKnown::FloatValue => "google.protobuf.FloatValue",
            WellKnown::Int32Value => "google.protobuf.Int32Value",
            WellKnown::Int64Value => "google.protobuf.Int64Value",
            WellKnown::StringValue => "google.protobuf.StringValue",
            WellKnown::UInt32Value => "google.protobuf.UInt32Value",
            WellKnown::UInt64Value => "google.protobuf.UInt64Value",
            WellKnown::Value => "google.protobuf.Value",
            WellKnown::NullValue => "google.protobuf.NullValue",
            WellKnown::ListValue => "google.protobuf.ListValue",
        }
    }

    /// The identifier of this type's prologue declaration in emitted output.
    pub fn alias(self) -> &'static str {
        match self {
            WellKnown::Any => "wellKnownAny",
            WellKnown::Duration => "wellKnownDuration",
            WellKnown::Empty => "wellKnownEmpty",
            WellKnown::FieldMask => "wellKnownFieldMask",
            WellKnown::Struct => "wellKnownStruct",
            WellKnown::Timestamp => "wellKnownTimestamp",
            WellKnown::BoolValue => "wellKnownBoolValue",
            WellKnown::BytesValue => "wellKnownBytesValue",
            WellKnown::DoubleValue => "wellKnownDoubleValue",
            WellKnown::FloatValue => "wellKnownFloatValue",
            WellKnown::Int32Value => "wellKnownInt32Value",
            WellKnown::Int64Value => "wellKnownInt64Value",
            WellKnown::StringValue => "wellKnownStringValue",
            WellKnown::UInt32Value => "wellKnownUInt32Value",
            WellKnown::UInt64Value => "wellKnownUInt64Value",
            WellKnown::Value => "wellKnownValue",
            WellKnown::NullValue => "wellKnownNullValue",
            WellKnown::ListValue => "wellKnownListValue",
        }
    }

    /// The JSON shape of this type's prologue declaration.
    pub fn shape(self) -> ResolvedType {
        match self {
            WellKnown::Any => ResolvedType::DynamicAny,
            WellKnown::Duration | WellKnown::Timestamp | WellKnown::FieldMask => {
                ResolvedType::Scalar(JsonPrimitive::String)
            }
            WellKnown::Empty => ResolvedType::LiteralEmpty,
            WellKnown::Struct => ResolvedType::Map(Box::new(ResolvedType::DynamicValue)),
            WellKnown::BoolValue => ResolvedType::NullableScalar(JsonPrimitive::Boolean),
            WellKnown::BytesValue | WellKnown::StringValue => {
                ResolvedType::NullableScalar(JsonPrimitive::String)
            }
            WellKnown::DoubleValue
            | WellKnown::FloatValue
            | WellKnown::Int32Value
            | WellKnown::Int64Value
            | WellKnown::UInt32Value
            | WellKnown::UInt64Value => ResolvedType::NullableScalar(JsonPrimitive::Number),
            WellKnown::Value => ResolvedType::DynamicValue,
            WellKnown::NullValue => ResolvedType::LiteralNull,
            WellKnown::ListValue => ResolvedType::Array(Box::new(ResolvedType::Named(
                WellKnown::Value.alias().to_string(),
            ))),
        }
    }

    /// Another well-known type this one's shape refers to, if any. Used to
    /// close the prologue over its own references.
    pub fn requires(self) -> Option<WellKnown> {
        match self {
            WellKnown::ListValue => Some(WellKnown::Value),
            _ => None,
        }
    }

    /// Doc lines for the prologue declaration, without comment markers.
    pub fn doc(self) -> &'static [&'static str] {
        match self {
            WellKnown::Any => &[
                "If the Any contains a value that has a special JSON mapping,",
                "it will be converted as follows:",
                "{\"@type\": xxx, \"value\": yyy}.",
                "Otherwise, the value will be converted into a JSON object,",
                "and the \"@type\" field will be inserted to indicate the actual data type.",
            ],
            WellKnown::Duration => &[
                "Generated output always contains 0, 3, 6, or 9 fractional digits,",
                "depending on required precision, followed by the suffix \"s\".",
                "Accepted are any fractional digits (also none) as long as they fit",
                "into nano-seconds precision and the suffix \"s\" is required.",
            ],
            WellKnown::Empty => &["An empty JSON object"],
            WellKnown::FieldMask => &[
                "In JSON, a field mask is encoded as a single string where paths are",
                "separated by a comma. Fields name in each path are converted",
                "to/from lower-camel naming conventions.",
            ],
            WellKnown::Struct => &["Any JSON value."],
            WellKnown::Timestamp => &[
                "Encoded using RFC 3339, where generated output will always be Z-normalized",
                "and uses 0, 3, 6 or 9 fractional digits.",
                "Offsets other than \"Z\" are also accepted.",
            ],
            _ => &[],
        }
    }
}

/// Canonicalize a JSON-encoded `Duration` string.
///
/// Accepts `-?\d+(\.\d{1,9})?s`; the canonical form keeps the shortest of
/// 0, 3, 6, or 9 fractional digits that preserves the value. Returns `None`
/// for strings outside the accepted grammar.
pub fn canonical_duration(input: &str) -> Option<String> {
    let body = input.strip_suffix('s')?;
    let (sign, unsigned) = match body.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", body),
    };
    let (seconds, fraction) = match unsigned.split_once('.') {
        Some((secs, frac)) => (secs, Some(frac)),
        None => (unsigned, None),
    };
    if seconds.is_empty() || !seconds.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(frac) = fraction {
        if frac.is_empty() || frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }

    let significant = fraction.unwrap_or("").trim_end_matches('0');
    let width = match significant.len() {
        0 => return Some(format!("{sign}{seconds}s")),
        1..=3 => 3,
        4..=6 => 6,
        _ => 9,
    };
    Some(format!("{sign}{seconds}.{significant:0<width$}s"))
}

/// Encode a field mask as its JSON string: comma-joined paths with each
/// dot-separated segment converted to lower-camel.
///
/// `["user.display_name", "photo"]` → `"user.displayName,photo"`.
pub fn field_mask_json(paths: &[&str]) -> String {
    paths
        .iter()
        .map(|path| {
            path.split('.')
                .map(to_lower_camel)
                .collect::<Vec<_>>()
                .join(".")
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_lookup() {
        assert_eq!(
            WellKnown::from_qualified("google.protobuf.Duration"),
            Some(WellKnown::Duration)
        );
        assert_eq!(
            WellKnown::from_qualified("google.protobuf.Int32Value"),
            Some(WellKnown::Int32Value)
        );
        assert_eq!(WellKnown::from_qualified("example.v1.Duration"), None);
        assert_eq!(WellKnown::from_qualified("google.protobuf.Unknown"), None);
    }

    #[test]
    fn qualified_and_lookup_are_inverse() {
        for wkt in WellKnown::ALL {
            assert_eq!(WellKnown::from_qualified(wkt.qualified()), Some(wkt));
        }
    }

    #[test]
    fn wrapper_shapes_are_nullable() {
        assert!(matches!(
            WellKnown::Int32Value.shape(),
            ResolvedType::NullableScalar(JsonPrimitive::Number)
        ));
        assert!(matches!(
            WellKnown::StringValue.shape(),
            ResolvedType::NullableScalar(JsonPrimitive::String)
        ));
        assert!(matches!(
            WellKnown::BoolValue.shape(),
            ResolvedType::NullableScalar(JsonPrimitive::Boolean)
        ));
    }

    #[test]
    fn list_value_requires_value() {
        assert_eq!(WellKnown::ListValue.requires(), Some(WellKnown::Value));
        assert_eq!(WellKnown::Duration.requires(), None);
    }

    #[test]
    fn duration_canonical_digit_counts() {
        assert_eq!(canonical_duration("1s").as_deref(), Some("1s"));
        assert_eq!(canonical_duration("1.5s").as_deref(), Some("1.500s"));
        assert_eq!(canonical_duration("1.50s").as_deref(), Some("1.500s"));
        assert_eq!(canonical_duration("1.123s").as_deref(), Some("1.123s"));
        assert_eq!(canonical_duration("1.1234s").as_deref(), Some("1.123400s"));
        assert_eq!(canonical_duration("1.123456s").as_deref(), Some("1.123456s"));
        assert_eq!(
            canonical_duration("1.1234567s").as_deref(),
            Some("1.123456700s")
        );
        assert_eq!(
            canonical_duration("1.123456789s").as_deref(),
            Some("1.123456789s")
        );
    }

    #[test]
    fn duration_canonical_never_emits_other_digit_counts() {
        let inputs = [
            "0s", "3s", "-3s", "0.1s", "0.25s", "1.000s", "2.000001s", "7.12s",
            "-1.999999999s", "4.100000000s",
        ];
        for input in inputs {
            let canonical = canonical_duration(input).unwrap();
            let digits = match canonical.trim_end_matches('s').split_once('.') {
                Some((_, frac)) => frac.len(),
                None => 0,
            };
            assert!(
                matches!(digits, 0 | 3 | 6 | 9),
                "{input} canonicalized to {canonical} with {digits} fractional digits"
            );
        }
    }

    #[test]
    fn duration_trailing_zeros_collapse() {
        assert_eq!(canonical_duration("1.000s").as_deref(), Some("1s"));
        assert_eq!(canonical_duration("1.100000000s").as_deref(), Some("1.100s"));
        assert_eq!(canonical_duration("-0.000000000s").as_deref(), Some("-0s"));
    }

    #[test]
    fn duration_sign_is_preserved() {
        assert_eq!(canonical_duration("-1.5s").as_deref(), Some("-1.500s"));
        assert_eq!(canonical_duration("-42s").as_deref(), Some("-42s"));
    }

    #[test]
    fn duration_rejects_malformed_input() {
        for input in ["", "s", "1", "1.s", "1.0000000001s", ".5s", "1.2.3s", "one_s", "+1s"] {
            assert_eq!(canonical_duration(input), None, "accepted {input:?}");
        }
    }

    #[test]
    fn field_mask_paths_are_camel_converted() {
        assert_eq!(
            field_mask_json(&["user.display_name", "photo"]),
            "user.displayName,photo"
        );
        assert_eq!(field_mask_json(&["snake_case_path"]), "snakeCasePath");
        assert_eq!(field_mask_json(&[]), "");
    }
}
