//! Maps schema fields to their canonical JSON shapes.
//!
//! # Shape Mapping Table
//!
//! | Declared type | JSON shape | Notes |
//! |---------------|-----------|-------|
//! | `string`, `bytes` | string | bytes is base64-encoded on the wire |
//! | `bool` | boolean | |
//! | all numeric kinds (incl. 64-bit) | number | |
//! | enum reference | named reference | string-literal union at the declaration |
//! | message reference | named reference | never inlined, so recursion terminates |
//! | well-known type | named reference to its prologue alias | absolute precedence |
//! | `repeated T` | array of T's base shape | |
//! | `map<K, V>` | string-keyed object of V's base shape | K must be integral or string |
//!
//! Resolution is a pure function of the field plus the name resolver and the
//! well-known registry; identical input always yields identical output.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::names::{DeclKind, Resolver, to_lower_camel};
use crate::schema::{Enum, Field, FieldType, Label, Message, ScalarKind, SchemaFile, TypeRef};
use crate::well_known::WellKnown;

/// A JSON primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonPrimitive {
    String,
    Number,
    Boolean,
}

/// The JSON-compatible shape resolved for a field or well-known declaration.
///
/// Message and enum references always resolve to [`ResolvedType::Named`]
/// rather than a structural expansion, which is what guarantees termination
/// for self- and mutually-recursive message graphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    /// A bare JSON primitive.
    Scalar(JsonPrimitive),

    /// A primitive or null, used by wrapper types where absence is distinct
    /// from the zero value.
    NullableScalar(JsonPrimitive),

    /// Reference to a named declaration (message, enum, or prologue alias).
    Named(String),

    /// Array of the element shape.
    Array(Box<ResolvedType>),

    /// String-keyed object mapping to the value shape.
    Map(Box<ResolvedType>),

    /// The `Any` encoding: an object with a literal `@type` string key plus
    /// the resolved type's own fields.
    DynamicAny,

    /// An untyped JSON value of any shape.
    DynamicValue,

    /// A fixed empty object.
    LiteralEmpty,

    /// The literal `null`.
    LiteralNull,
}

/// One emitted field of a message declaration.
#[derive(Debug)]
pub struct FieldShape {
    /// Lower-camel JSON key.
    pub json_name: String,

    /// Whether the key may be absent. Set for oneof members, which flatten
    /// to ordinary fields resolved by key presence at runtime.
    pub optional: bool,

    pub shape: ResolvedType,

    pub doc: Option<String>,
}

/// An emitted message declaration.
#[derive(Debug)]
pub struct MessageDecl {
    pub ident: String,
    pub fields: Vec<FieldShape>,
    pub doc: Option<String>,
}

/// An emitted enum declaration: a closed string-literal union of its value
/// names.
#[derive(Debug)]
pub struct EnumDecl {
    pub ident: String,
    pub values: Vec<EnumValueShape>,
    pub doc: Option<String>,
}

/// One variant of an emitted enum declaration.
#[derive(Debug)]
pub struct EnumValueShape {
    pub name: String,
    pub doc: Option<String>,
}

/// A named type declaration in emission order.
#[derive(Debug)]
pub enum Declaration {
    Message(MessageDecl),
    Enum(EnumDecl),
}

/// Resolves field types within one package namespace, recording which
/// well-known prologue declarations the package needs.
pub struct TypeMapper<'a> {
    resolver: &'a Resolver,
    package: &'a str,
    used_well_known: BTreeSet<WellKnown>,
}

impl<'a> TypeMapper<'a> {
    pub fn new(resolver: &'a Resolver, package: &'a str) -> Self {
        TypeMapper {
            resolver,
            package,
            used_well_known: BTreeSet::new(),
        }
    }

    /// Well-known types referenced so far, in prologue order.
    pub fn used_well_known(&self) -> &BTreeSet<WellKnown> {
        &self.used_well_known
    }

    /// Resolve a field to its JSON shape.
    ///
    /// Decision order: well-known rule, then enum/message reference, then
    /// scalar mapping; the label wrapper (array/map) applies after the base
    /// shape is known, so element resolution is identical to resolving the
    /// same field as singular.
    pub fn resolve_field(
        &mut self,
        message: &str,
        file: &str,
        field: &Field,
    ) -> Result<ResolvedType> {
        let base = match &field.field_type {
            FieldType::Map(map) => {
                if field.label == Label::Repeated {
                    return Err(Error::Schema(format!(
                        "map field '{}' of '{message}' ({file}) cannot be repeated",
                        field.name
                    )));
                }
                if !object_key_compatible(map.key) {
                    return Err(Error::UnsupportedMapKey {
                        key: map.key.proto_name(),
                        context: field_context(&field.name, message, file),
                    });
                }
                let value = self.resolve_ref(&map.value, &field.name, message, file)?;
                return Ok(ResolvedType::Map(Box::new(value)));
            }
            FieldType::Scalar(kind) => ResolvedType::Scalar(scalar_shape(*kind)),
            FieldType::Message(name) => self.message_ref(name, &field.name, message, file)?,
            FieldType::Enum(name) => self.enum_ref(name, &field.name, message, file)?,
        };

        Ok(match field.label {
            Label::Repeated => ResolvedType::Array(Box::new(base)),
            Label::Singular | Label::Optional => base,
        })
    }

    fn resolve_ref(
        &mut self,
        type_ref: &TypeRef,
        field_name: &str,
        message: &str,
        file: &str,
    ) -> Result<ResolvedType> {
        match type_ref {
            TypeRef::Scalar(kind) => Ok(ResolvedType::Scalar(scalar_shape(*kind))),
            TypeRef::Message(name) => self.message_ref(name, field_name, message, file),
            TypeRef::Enum(name) => self.enum_ref(name, field_name, message, file),
        }
    }

    fn message_ref(
        &mut self,
        qualified: &str,
        field_name: &str,
        message: &str,
        file: &str,
    ) -> Result<ResolvedType> {
        // The well-known rule wins even when a user declaration shadows the
        // qualified name; the resolver has already surfaced the warning.
        if let Some(wkt) = WellKnown::from_qualified(qualified) {
            return Ok(self.well_known_ref(wkt));
        }
        let Some(decl) = self.resolver.get(qualified) else {
            return Err(Error::UnresolvedType {
                type_name: qualified.to_string(),
                context: field_context(field_name, message, file),
            });
        };
        if decl.kind != DeclKind::Message {
            return Err(Error::Schema(format!(
                "{} declares message type '{qualified}', which is an enum",
                field_context(field_name, message, file)
            )));
        }
        Ok(ResolvedType::Named(self.resolver.scoped_ident(self.package, decl)))
    }

    fn enum_ref(
        &mut self,
        qualified: &str,
        field_name: &str,
        message: &str,
        file: &str,
    ) -> Result<ResolvedType> {
        if let Some(wkt) = WellKnown::from_qualified(qualified) {
            return Ok(self.well_known_ref(wkt));
        }
        let Some(decl) = self.resolver.get(qualified) else {
            return Err(Error::UnresolvedType {
                type_name: qualified.to_string(),
                context: field_context(field_name, message, file),
            });
        };
        if decl.kind != DeclKind::Enum {
            return Err(Error::Schema(format!(
                "{} declares enum type '{qualified}', which is a message",
                field_context(field_name, message, file)
            )));
        }
        Ok(ResolvedType::Named(self.resolver.scoped_ident(self.package, decl)))
    }

    fn well_known_ref(&mut self, wkt: WellKnown) -> ResolvedType {
        self.used_well_known.insert(wkt);
        if let Some(dep) = wkt.requires() {
            self.used_well_known.insert(dep);
        }
        ResolvedType::Named(wkt.alias().to_string())
    }
}

/// Assemble the ordered declaration list for one package.
///
/// Per file: top-level enums first, then messages depth-first (each message
/// followed by its nested enums and nested messages). Files are taken in
/// input order, so output order is a pure function of the schema.
pub fn package_declarations(
    resolver: &Resolver,
    package: &str,
    files: &[&SchemaFile],
) -> Result<(Vec<Declaration>, BTreeSet<WellKnown>)> {
    let mut mapper = TypeMapper::new(resolver, package);
    let mut decls = Vec::new();

    for file in files {
        let mut path = Vec::new();
        for enm in &file.enums {
            path.push(enm.name.as_str());
            decls.push(Declaration::Enum(enum_decl(file, &path, enm)?));
            path.pop();
        }
        for msg in &file.messages {
            collect_message(&mut mapper, &mut decls, file, &mut path, msg)?;
        }
    }

    Ok((decls, mapper.used_well_known))
}

fn collect_message<'a>(
    mapper: &mut TypeMapper<'_>,
    decls: &mut Vec<Declaration>,
    file: &'a SchemaFile,
    path: &mut Vec<&'a str>,
    msg: &'a Message,
) -> Result<()> {
    path.push(msg.name.as_str());
    decls.push(Declaration::Message(message_decl(mapper, file, path, msg)?));
    for enm in &msg.enums {
        path.push(enm.name.as_str());
        decls.push(Declaration::Enum(enum_decl(file, path, enm)?));
        path.pop();
    }
    for nested in &msg.messages {
        collect_message(mapper, decls, file, path, nested)?;
    }
    path.pop();
    Ok(())
}

fn message_decl(
    mapper: &mut TypeMapper<'_>,
    file: &SchemaFile,
    path: &[&str],
    msg: &Message,
) -> Result<MessageDecl> {
    let qualified = qualify(&file.package, path);
    let mut fields = Vec::with_capacity(msg.fields.len());
    let mut json_names: BTreeMap<String, String> = BTreeMap::new();

    for field in &msg.fields {
        if let Some(group) = &field.oneof {
            if !msg.oneofs.iter().any(|o| o == group) {
                return Err(Error::Schema(format!(
                    "{} names undeclared oneof group '{group}'",
                    field_context(&field.name, &qualified, &file.name)
                )));
            }
            if field.label != Label::Singular || matches!(field.field_type, FieldType::Map(_)) {
                return Err(Error::Schema(format!(
                    "{} is a oneof member and must be a singular non-map field",
                    field_context(&field.name, &qualified, &file.name)
                )));
            }
        }

        let json_name = to_lower_camel(&field.name);
        if let Some(previous) = json_names.get(json_name.as_str()) {
            return Err(Error::NameCollision {
                ident: json_name,
                first: field_context(previous, &qualified, &file.name),
                second: field_context(&field.name, &qualified, &file.name),
            });
        }
        json_names.insert(json_name.clone(), field.name.clone());

        let shape = mapper.resolve_field(&qualified, &file.name, field)?;
        fields.push(FieldShape {
            json_name,
            optional: field.oneof.is_some(),
            shape,
            doc: field.doc.clone(),
        });
    }

    Ok(MessageDecl {
        ident: path.concat(),
        fields,
        doc: msg.doc.clone(),
    })
}

fn enum_decl(file: &SchemaFile, path: &[&str], enm: &Enum) -> Result<EnumDecl> {
    if enm.values.is_empty() {
        return Err(Error::Schema(format!(
            "enum '{}' ({}) has no values",
            qualify(&file.package, path),
            file.name
        )));
    }
    Ok(EnumDecl {
        ident: path.concat(),
        values: enm
            .values
            .iter()
            .map(|v| EnumValueShape {
                name: v.name.clone(),
                doc: v.doc.clone(),
            })
            .collect(),
        doc: enm.doc.clone(),
    })
}

/// Map a protobuf scalar kind to its JSON primitive.
pub fn scalar_shape(kind: ScalarKind) -> JsonPrimitive {
    match kind {
        ScalarKind::String | ScalarKind::Bytes => JsonPrimitive::String,
        ScalarKind::Bool => JsonPrimitive::Boolean,
        _ => JsonPrimitive::Number,
    }
}

/// Whether a map key kind is representable as a JSON object key.
///
/// Integral and string kinds only; bool, floating-point, and bytes keys are
/// rejected.
pub fn object_key_compatible(kind: ScalarKind) -> bool {
    !matches!(
        kind,
        ScalarKind::Double | ScalarKind::Float | ScalarKind::Bool | ScalarKind::Bytes
    )
}

fn qualify(package: &str, path: &[&str]) -> String {
    let dotted = path.join(".");
    if package.is_empty() {
        dotted
    } else {
        format!("{package}.{dotted}")
    }
}

fn field_context(field_name: &str, message: &str, file: &str) -> String {
    format!("field '{field_name}' of '{message}' ({file})")
}
