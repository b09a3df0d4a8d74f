//! Generate TypeScript type definitions for the canonical protobuf JSON mapping.
//!
//! `proto-tsjson-gen` reads a fully-resolved protobuf schema model (see
//! [`schema`]) and generates TypeScript declarations describing the
//! [canonical JSON encoding](https://protobuf.dev/programming-guides/json/)
//! of every message and enum, one `index.ts` per package.
//!
//! # Features
//!
//! - Messages become `export type` field lists keyed by lower-camel JSON names
//! - Enums become closed string-literal unions of their value names
//! - Well-known types (`Duration`, `Any`, `Struct`, wrappers, ...) get their
//!   mandated JSON shapes via a prologue of shared declarations
//! - Oneof members flatten to independent optional fields, mirroring
//!   key-presence resolution in the JSON mapping
//! - Nested declarations flatten to collision-checked top-level identifiers
//! - Recursive message graphs resolve by named reference, never inline
//! - Deterministic output: byte-identical across runs
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//!
//! let set = proto_tsjson_gen::schema::load_schema(Path::new("schema.json"))?;
//! let stats = proto_tsjson_gen::codegen::generate(&set, Path::new("gen/"))?;
//! eprintln!(
//!     "Generated {} messages, {} enums",
//!     stats.messages_generated, stats.enums_generated
//! );
//! # Ok::<(), proto_tsjson_gen::error::Error>(())
//! ```

pub mod codegen;
pub mod error;
pub mod names;
pub mod schema;
pub mod type_map;
pub mod well_known;
