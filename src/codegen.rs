//! TypeScript code generation from the resolved type graph.
//!
//! Renders one `index.ts` per protobuf package, containing:
//! - A prologue declaring every well-known type the package references
//! - Enum declarations as closed string-literal unions
//! - Message declarations as `export type X = { ... };` field lists
//!
//! The generated output is deterministic: identical input always produces
//! byte-identical output. Packages are emitted in sorted order, files in
//! input order, declarations in declaration order. Nothing is written until
//! every package has resolved, so generation is all-or-nothing.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::names::Resolver;
use crate::schema::{SchemaFile, SchemaSet};
use crate::type_map::{
    Declaration, EnumDecl, JsonPrimitive, MessageDecl, ResolvedType, package_declarations,
};
use crate::well_known::WellKnown;

/// Statistics collected during generation for reporting.
#[derive(Debug, Default)]
pub struct GenerationStats {
    pub packages_generated: usize,
    pub messages_generated: usize,
    pub enums_generated: usize,
    pub well_known_emitted: usize,
    pub shadowed_declarations: usize,
}

/// Generate TypeScript declaration files for every package in the schema.
///
/// Builds the global name registry, resolves every package's type graph,
/// and writes one `<package path>/index.ts` per package under `output_dir`.
///
/// Returns generation statistics for reporting.
pub fn generate(set: &SchemaSet, output_dir: &Path) -> Result<GenerationStats> {
    let resolver = Resolver::build(set)?;
    for warning in resolver.warnings() {
        eprintln!("warning: {warning}");
    }
    let mut stats = GenerationStats {
        shadowed_declarations: resolver.warnings().len(),
        ..GenerationStats::default()
    };

    let mut by_package: BTreeMap<&str, Vec<&SchemaFile>> = BTreeMap::new();
    for file in &set.files {
        by_package.entry(file.package.as_str()).or_default().push(file);
    }

    // Resolve everything before writing anything.
    let mut outputs: Vec<(PathBuf, String)> = Vec::new();
    for (package, files) in &by_package {
        let (decls, used) = package_declarations(&resolver, package, files)?;
        let content = render_package(&decls, &used, &mut stats);
        outputs.push((package_path(output_dir, package), content));
    }

    for (path, content) in &outputs {
        write_file(path, content)?;
    }
    stats.packages_generated = outputs.len();
    Ok(stats)
}

// ── Package rendering ──────────────────────────────────────────────────

fn render_package(
    decls: &[Declaration],
    used_well_known: &BTreeSet<WellKnown>,
    stats: &mut GenerationStats,
) -> String {
    let mut out = String::new();

    writeln!(out, "// Code generated by proto-tsjson-gen. DO NOT EDIT.").unwrap();
    writeln!(out, "/* eslint-disable camelcase */").unwrap();
    writeln!(out, "// @ts-nocheck").unwrap();

    for wkt in WellKnown::ALL {
        if used_well_known.contains(&wkt) {
            writeln!(out).unwrap();
            write_well_known(&mut out, wkt);
            stats.well_known_emitted += 1;
        }
    }

    for decl in decls {
        writeln!(out).unwrap();
        match decl {
            Declaration::Enum(enm) => {
                write_enum(&mut out, enm);
                stats.enums_generated += 1;
            }
            Declaration::Message(msg) => {
                write_message(&mut out, msg);
                stats.messages_generated += 1;
            }
        }
    }

    out
}

/// Write one prologue declaration for a well-known type.
///
/// `Any` is the only interface (it carries an index signature alongside the
/// literal `@type` key); everything else is a type alias over its shape.
fn write_well_known(out: &mut String, wkt: WellKnown) {
    write_doc(out, 0, wkt.doc().iter().copied());
    if wkt == WellKnown::Any {
        writeln!(out, "interface {} {{", wkt.alias()).unwrap();
        writeln!(out, "  \"@type\": string;").unwrap();
        writeln!(out, "  [key: string]: unknown;").unwrap();
        writeln!(out, "}}").unwrap();
    } else {
        writeln!(out, "type {} = {};", wkt.alias(), type_reference(&wkt.shape())).unwrap();
    }
}

// ── Declaration rendering ──────────────────────────────────────────────

fn write_enum(out: &mut String, decl: &EnumDecl) {
    write_doc(out, 0, doc_lines(&decl.doc));
    writeln!(out, "export type {} =", decl.ident).unwrap();

    if let [value] = decl.values.as_slice() {
        write_doc(out, 1, doc_lines(&value.doc));
        writeln!(out, "  \"{}\";", value.name).unwrap();
        return;
    }

    let last = decl.values.len().saturating_sub(1);
    for (i, value) in decl.values.iter().enumerate() {
        write_doc(out, 1, doc_lines(&value.doc));
        if i == last {
            writeln!(out, "  | \"{}\";", value.name).unwrap();
        } else {
            writeln!(out, "  | \"{}\"", value.name).unwrap();
        }
    }
}

fn write_message(out: &mut String, decl: &MessageDecl) {
    write_doc(out, 0, doc_lines(&decl.doc));
    writeln!(out, "export type {} = {{", decl.ident).unwrap();

    for field in &decl.fields {
        write_doc(out, 1, doc_lines(&field.doc));
        let marker = if field.optional { "?" } else { "" };
        writeln!(
            out,
            "  {}{marker}: {};",
            field.json_name,
            type_reference(&field.shape)
        )
        .unwrap();
    }

    writeln!(out, "}};").unwrap();
}

/// Render the TypeScript expression referencing a resolved shape.
fn type_reference(shape: &ResolvedType) -> String {
    match shape {
        ResolvedType::Scalar(p) => primitive(*p).to_string(),
        ResolvedType::NullableScalar(p) => format!("{} | null", primitive(*p)),
        ResolvedType::Named(name) => name.clone(),
        ResolvedType::Array(element) => format!("{}[]", type_reference(element)),
        ResolvedType::Map(value) => format!("{{ [key: string]: {} }}", type_reference(value)),
        ResolvedType::DynamicAny => "{ \"@type\": string; [key: string]: unknown }".to_string(),
        ResolvedType::DynamicValue => "unknown".to_string(),
        ResolvedType::LiteralEmpty => "Record<never, never>".to_string(),
        ResolvedType::LiteralNull => "null".to_string(),
    }
}

fn primitive(p: JsonPrimitive) -> &'static str {
    match p {
        JsonPrimitive::String => "string",
        JsonPrimitive::Number => "number",
        JsonPrimitive::Boolean => "boolean",
    }
}

// ── Shared helpers ─────────────────────────────────────────────────────

fn doc_lines(doc: &Option<String>) -> impl Iterator<Item = &str> {
    doc.as_deref().into_iter().flat_map(str::lines)
}

/// Write a JSDoc block at the given indent level. Writes nothing for an
/// empty line set.
fn write_doc<'a>(out: &mut String, indent: usize, lines: impl IntoIterator<Item = &'a str>) {
    let mut lines = lines.into_iter().peekable();
    if lines.peek().is_none() {
        return;
    }
    let pad = "  ".repeat(indent);
    writeln!(out, "{pad}/**").unwrap();
    for line in lines {
        if line.is_empty() {
            writeln!(out, "{pad} *").unwrap();
        } else {
            writeln!(out, "{pad} * {line}").unwrap();
        }
    }
    writeln!(out, "{pad} */").unwrap();
}

/// The output file for a package: `example.v1` → `example/v1/index.ts`.
fn package_path(output_dir: &Path, package: &str) -> PathBuf {
    let mut path = output_dir.to_path_buf();
    if !package.is_empty() {
        for segment in package.split('.') {
            path.push(segment);
        }
    }
    path.join("index.ts")
}

/// Write content to a file, creating parent directories as needed.
fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, content).map_err(|e| Error::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
