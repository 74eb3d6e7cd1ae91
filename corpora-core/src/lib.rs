//! # corpora-core
//!
//! Canonical schema shared by every corpora reader.
//!
//! This crate provides:
//! - **Sentence types**: `Token`, `Dependency`, `Sentence`
//! - **SRL**: `PredicateArgumentStructure`, `Argument`, `TokenSpan`
//! - **WSD**: `SenseAnnotation`, `SenseLabel`, `SenseInventory`
//! - **WiC**: `WicInstance`, `WicTarget`, `WicLabel`
//! - **Containers**: `AnnotatedSentence`, `Instance`, `Document`
//! - **Errors**: `Error`, `Issue`, `Report`
//!
//! Constructors check the schema invariants and return
//! [`Error::SchemaViolation`] instead of repairing their input. Objects are
//! immutable once built.

pub mod document;
pub mod error;
pub mod sense;
pub mod sentence;
pub mod srl;
pub mod wic;

// Re-exports for convenience
pub use document::{AnnotatedSentence, Document, Instance};
pub use error::{Error, Issue, IssueKind, Position, Report, Result, Severity};
pub use sense::{SenseAnnotation, SenseInventory, SenseLabel};
pub use sentence::{Dependency, Sentence, Token};
pub use srl::{Argument, PredicateArgumentStructure, RolePolicy, TokenSpan};
pub use wic::{WicInstance, WicLabel, WicTarget};
