//! Declaration naming: the global registry, identifier flattening, and JSON
//! field-name conversion.
//!
//! The emitted representation has no nested-type concept, so every
//! declaration becomes a top-level named type. Identifiers are built by
//! concatenating the nesting path (`Outer.Inner` → `OuterInner`); references
//! that cross package boundaries prepend the package with its dots removed
//! (`example.v1` → `examplev1_OuterInner`). Two distinct declarations that
//! flatten to the same identifier in any package namespace are a fatal
//! generation error — no disambiguator is guessed.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::schema::{Message, SchemaFile, SchemaSet};
use crate::well_known::WellKnown;

/// Whether a registered declaration is a message or an enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Message,
    Enum,
}

/// A registered declaration with its resolved naming.
#[derive(Debug)]
pub struct Decl {
    /// Package-qualified dotted name (e.g., `"example.v1.Shipment.Status"`).
    pub qualified: String,

    /// Owning package (e.g., `"example.v1"`).
    pub package: String,

    /// Path of the file that declares this type.
    pub file: String,

    /// Flattened identifier within the owning package (e.g.,
    /// `"ShipmentStatus"`).
    pub local_ident: String,

    pub kind: DeclKind,
}

/// Global bijection from qualified declaration names to emission-safe
/// identifiers, built once per generation run before any type mapping.
#[derive(Debug)]
pub struct Resolver {
    decls: BTreeMap<String, Decl>,
    packages: BTreeSet<String>,
    warnings: Vec<String>,
}

impl Resolver {
    /// Register every message and enum across all files and verify that no
    /// two declarations collide in any package namespace.
    pub fn build(set: &SchemaSet) -> Result<Resolver> {
        let mut resolver = Resolver {
            decls: BTreeMap::new(),
            packages: BTreeSet::new(),
            warnings: Vec::new(),
        };

        for file in &set.files {
            resolver.packages.insert(file.package.clone());
            let mut path = Vec::new();
            for enm in &file.enums {
                path.push(enm.name.as_str());
                resolver.register(file, &path, DeclKind::Enum)?;
                path.pop();
            }
            for msg in &file.messages {
                resolver.register_message(file, &mut path, msg)?;
            }
        }

        resolver.check_collisions()?;
        Ok(resolver)
    }

    /// Look up a declaration by qualified name.
    pub fn get(&self, qualified: &str) -> Option<&Decl> {
        self.decls.get(qualified)
    }

    /// The emitted identifier for a reference to `qualified` from within
    /// `pkg`'s namespace. Returns `None` for unregistered names.
    pub fn ident(&self, pkg: &str, qualified: &str) -> Option<String> {
        self.decls.get(qualified).map(|d| ident_in(pkg, d))
    }

    /// The emitted identifier for an already-looked-up declaration within
    /// `pkg`'s namespace.
    pub fn scoped_ident(&self, pkg: &str, decl: &Decl) -> String {
        ident_in(pkg, decl)
    }

    /// Non-fatal ambiguities detected while building the registry, in
    /// registration order.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    fn register_message<'a>(
        &mut self,
        file: &'a SchemaFile,
        path: &mut Vec<&'a str>,
        msg: &'a Message,
    ) -> Result<()> {
        path.push(msg.name.as_str());
        self.register(file, path, DeclKind::Message)?;
        for enm in &msg.enums {
            path.push(enm.name.as_str());
            self.register(file, path, DeclKind::Enum)?;
            path.pop();
        }
        for nested in &msg.messages {
            self.register_message(file, path, nested)?;
        }
        path.pop();
        Ok(())
    }

    fn register(&mut self, file: &SchemaFile, path: &[&str], kind: DeclKind) -> Result<()> {
        let dotted = path.join(".");
        let qualified = if file.package.is_empty() {
            dotted
        } else {
            format!("{}.{dotted}", file.package)
        };

        if WellKnown::from_qualified(&qualified).is_some() {
            self.warnings.push(format!(
                "declaration '{qualified}' ({}) shadows a well-known type; \
                 references resolve to the built-in JSON mapping",
                file.name
            ));
        }

        let decl = Decl {
            qualified: qualified.clone(),
            package: file.package.clone(),
            file: file.name.clone(),
            local_ident: path.concat(),
            kind,
        };

        if let Some(existing) = self.decls.get(&qualified) {
            return Err(Error::NameCollision {
                ident: qualified.clone(),
                first: format!("'{}' ({})", existing.qualified, existing.file),
                second: format!("'{qualified}' ({})", file.name),
            });
        }
        self.decls.insert(qualified, decl);
        Ok(())
    }

    /// Verify identifier uniqueness in every package namespace.
    ///
    /// A declaration appears in its own package under its local identifier
    /// and in every other package under the package-prefixed form, so the
    /// check walks each namespace separately.
    fn check_collisions(&self) -> Result<()> {
        for pkg in &self.packages {
            let mut seen: BTreeMap<String, &Decl> = BTreeMap::new();
            for decl in self.decls.values() {
                let ident = ident_in(pkg, decl);
                if let Some(existing) = seen.get(ident.as_str()) {
                    return Err(Error::NameCollision {
                        ident,
                        first: format!("'{}' ({})", existing.qualified, existing.file),
                        second: format!("'{}' ({})", decl.qualified, decl.file),
                    });
                }
                seen.insert(ident, decl);
            }
        }
        Ok(())
    }
}

/// The identifier `decl` takes inside `pkg`'s emitted namespace.
fn ident_in(pkg: &str, decl: &Decl) -> String {
    if decl.package == pkg || decl.package.is_empty() {
        decl.local_ident.clone()
    } else {
        format!("{}_{}", package_prefix(&decl.package), decl.local_ident)
    }
}

/// Flatten a package name into an identifier prefix by removing the dots:
/// `"example.v1"` → `"examplev1"`.
pub fn package_prefix(pkg: &str) -> String {
    pkg.split('.').collect()
}

/// Convert a declared field name to its JSON key.
///
/// Straightforward underscore-boundary capitalization: each underscore is
/// dropped and the following character uppercased. Already-camel names pass
/// through unchanged; acronym runs are not specially cased.
///
/// - `"display_name"` → `"displayName"`
/// - `"k8s_cluster"` → `"k8sCluster"`
/// - `"alreadyCamel"` → `"alreadyCamel"`
pub fn to_lower_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaSet;

    fn schema(json: &str) -> SchemaSet {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn lower_camel_conversion() {
        assert_eq!(to_lower_camel("display_name"), "displayName");
        assert_eq!(to_lower_camel("shipment_id"), "shipmentId");
        assert_eq!(to_lower_camel("id"), "id");
        assert_eq!(to_lower_camel("alreadyCamel"), "alreadyCamel");
        assert_eq!(to_lower_camel("a_b_c"), "aBC");
    }

    #[test]
    fn lower_camel_does_not_special_case_acronyms() {
        assert_eq!(to_lower_camel("http_url"), "httpUrl");
        assert_eq!(to_lower_camel("k8s_cluster"), "k8sCluster");
    }

    #[test]
    fn lower_camel_collapses_consecutive_underscores() {
        assert_eq!(to_lower_camel("foo__bar"), "fooBar");
        assert_eq!(to_lower_camel("trailing_"), "trailing");
    }

    #[test]
    fn package_prefix_strips_dots() {
        assert_eq!(package_prefix("example.v1"), "examplev1");
        assert_eq!(package_prefix("single"), "single");
    }

    #[test]
    fn nested_declarations_flatten() {
        let set = schema(
            r#"{"files": [{
                "name": "a.proto",
                "package": "example.v1",
                "messages": [{
                    "name": "Outer",
                    "messages": [{"name": "Inner", "fields": []}],
                    "fields": []
                }]
            }]}"#,
        );
        let resolver = Resolver::build(&set).unwrap();

        assert_eq!(
            resolver.ident("example.v1", "example.v1.Outer.Inner").unwrap(),
            "OuterInner"
        );
        assert_eq!(
            resolver.ident("other.v1", "example.v1.Outer.Inner").unwrap(),
            "examplev1_OuterInner"
        );
    }

    #[test]
    fn nested_vs_flat_name_collision_is_fatal() {
        let set = schema(
            r#"{"files": [{
                "name": "a.proto",
                "package": "example.v1",
                "messages": [
                    {"name": "Outer", "messages": [{"name": "Inner", "fields": []}], "fields": []},
                    {"name": "OuterInner", "fields": []}
                ]
            }]}"#,
        );
        let err = Resolver::build(&set).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("OuterInner"), "unexpected error: {msg}");
        assert!(msg.contains("example.v1.Outer.Inner"), "unexpected error: {msg}");
    }

    #[test]
    fn duplicate_qualified_name_is_fatal() {
        let set = schema(
            r#"{"files": [
                {"name": "a.proto", "package": "p", "messages": [{"name": "M", "fields": []}]},
                {"name": "b.proto", "package": "p", "messages": [{"name": "M", "fields": []}]}
            ]}"#,
        );
        assert!(Resolver::build(&set).is_err());
    }

    #[test]
    fn cross_package_prefix_collision_is_fatal() {
        // "a.b" and "ab" flatten to the same prefix, so their "M" types
        // collide in any third namespace.
        let set = schema(
            r#"{"files": [
                {"name": "a.proto", "package": "a.b", "messages": [{"name": "M", "fields": []}]},
                {"name": "b.proto", "package": "ab", "messages": [{"name": "M", "fields": []}]},
                {"name": "c.proto", "package": "c", "messages": [{"name": "N", "fields": []}]}
            ]}"#,
        );
        assert!(Resolver::build(&set).is_err());
    }

    #[test]
    fn well_known_shadowing_is_a_warning_not_an_error() {
        let set = schema(
            r#"{"files": [{
                "name": "duration.proto",
                "package": "google.protobuf",
                "messages": [{"name": "Duration", "fields": []}]
            }]}"#,
        );
        let resolver = Resolver::build(&set).unwrap();
        assert_eq!(resolver.warnings().len(), 1);
        assert!(resolver.warnings()[0].contains("google.protobuf.Duration"));
    }

    #[test]
    fn nested_enum_is_registered() {
        let set = schema(
            r#"{"files": [{
                "name": "a.proto",
                "package": "p",
                "messages": [{
                    "name": "Shipment",
                    "fields": [],
                    "enums": [{"name": "Status", "values": [{"name": "STATUS_UNSPECIFIED", "number": 0}]}]
                }]
            }]}"#,
        );
        let resolver = Resolver::build(&set).unwrap();
        let decl = resolver.get("p.Shipment.Status").unwrap();
        assert_eq!(decl.kind, DeclKind::Enum);
        assert_eq!(decl.local_ident, "ShipmentStatus");
    }
}
