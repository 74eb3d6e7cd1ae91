//! # corpora
//!
//! Readers for annotated NLP corpora, all producing one canonical schema.
//!
//! - **SRL**: CoNLL-2009, CoNLL-2012 (OntoNotes), UniteD-SRL
//! - **WSD**: WSD Evaluation Framework, XL-WSD
//! - **WiC**: WiC, XL-WiC, tabular MCL-WiC
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use corpora::{read, Format, ReaderConfig, Split};
//!
//! let config = ReaderConfig::new("data/conll2009").with_split(Split::Dev);
//! let mut records = read(Format::Conll2009, config)?;
//! for record in records.by_ref() {
//!     let record = record?;
//!     if let Some(sentence) = record.instance.as_sentence() {
//!         println!("{}: {} predicates", sentence.sentence().id(), sentence.predicates().len());
//!     }
//! }
//! eprintln!("{}", records.report());
//! # Ok::<(), corpora::Error>(())
//! ```
//!
//! ## Formats
//!
//! | Format | Family | Input |
//! |--------|--------|-------|
//! | `Conll2009` | SRL | column file, one block per sentence |
//! | `Conll2012` | SRL | `*.gold_conll` files, bracketed arguments |
//! | `UnitedSrl` | SRL | CoNLL-U style, BIO or dependency roles |
//! | `WsdFramework` | WSD | `*.data.xml` + `*.gold.key.txt` |
//! | `XlWsd` | WSD | per-language framework pairs, BabelNet keys |
//! | `Wic` | WiC | token-index table + optional label file |
//! | `XlWic` | WiC | character-offset table |
//!
//! ## Errors
//!
//! Unreadable inputs, unalignable gold files and bad configurations are
//! fatal. A malformed record, a missing gold key or a failed validation only
//! affects its own record: it is skipped (or marked) and reported in
//! [`Records::report`], and reading continues. `include_malformed` and
//! `strict` in [`ReaderConfig`] surface these issues in the sequence itself.
//!
//! The crate logs through the `log` facade and never installs a logger.

#![warn(missing_docs)]

pub mod config;
pub mod decode;
pub mod export;
pub mod reader;
pub mod validation;

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust,no_run
    //! use corpora::prelude::*;
    //!
    //! let reader = WicReader::open(Format::Wic, ReaderConfig::new("data/WiC_dataset"))?;
    //! let pairs = reader.read().filter_map(|r| r.ok()).count();
    //! # Ok::<(), corpora::Error>(())
    //! ```
    pub use crate::config::{MissingGoldPolicy, ReaderConfig, Split};
    pub use crate::reader::{read, CorpusReader, Format, Record, Records, SrlReader, WicReader, WsdReader};
    pub use corpora_core::{
        AnnotatedSentence, Document, Error, Instance, Issue, IssueKind, Report, Result, Sentence,
    };
}

// Re-exports
pub use config::{KeyPairing, MissingGoldPolicy, ReaderConfig, Split};
pub use corpora_core::{
    AnnotatedSentence, Argument, Dependency, Document, Error, Instance, Issue, IssueKind, Position,
    PredicateArgumentStructure, Report, Result, RolePolicy, SenseAnnotation, SenseInventory,
    SenseLabel, Sentence, Severity, Token, TokenSpan, WicInstance, WicLabel, WicTarget,
};
pub use decode::wic::{LemmaCheck, WicLayout};
pub use export::write_jsonl;
pub use reader::{
    read, CorpusReader, Documents, Family, Format, Record, Records, SrlReader, WicReader, WsdReader,
};
pub use validation::{validate, ValidationPolicy, Verdict};
