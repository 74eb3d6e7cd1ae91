//! Corpus readers.
//!
//! One reader per corpus family. Opening a reader resolves its input files
//! (applying `split` and `language` filters and pairing gold files) and
//! decodes nothing; [`CorpusReader::read`] hands out the lazy [`Records`]
//! sequence.
//!
//! ```no_run
//! use corpora::{read, Format, ReaderConfig, Split};
//!
//! let config = ReaderConfig::new("data/WSD_Evaluation_Framework").with_split(Split::Test);
//! let mut records = read(Format::WsdFramework, config)?;
//! for record in records.by_ref() {
//!     let record = record?;
//!     println!("{}", record.position);
//! }
//! println!("{}", records.report());
//! # Ok::<(), corpora::Error>(())
//! ```

mod locate;
mod records;
mod srl;
mod wic;
mod wsd;

pub use locate::locate;
pub use records::{Documents, Record, RecordPolicy, Records};
pub use srl::SrlReader;
pub use wic::WicReader;
pub use wsd::WsdReader;

use crate::config::{KeyPairing, ReaderConfig};
use crate::decode::Input;
use corpora_core::{Error, Result, RolePolicy};
use std::fmt;
use std::str::FromStr;

/// Supported corpus formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// CoNLL-2009 dependency SRL.
    Conll2009,
    /// CoNLL-2012 / OntoNotes span SRL.
    Conll2012,
    /// UniteD-SRL.
    UnitedSrl,
    /// WSD Evaluation Framework.
    WsdFramework,
    /// XL-WSD.
    XlWsd,
    /// WiC and English XL-WiC (token indices).
    Wic,
    /// XL-WiC and tabular MCL-WiC (character offsets).
    XlWic,
}

/// Corpus family of a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Semantic role labeling.
    Srl,
    /// Word sense disambiguation.
    Wsd,
    /// Word-in-Context.
    Wic,
}

impl Format {
    /// All formats.
    pub const ALL: [Format; 7] = [
        Format::Conll2009,
        Format::Conll2012,
        Format::UnitedSrl,
        Format::WsdFramework,
        Format::XlWsd,
        Format::Wic,
        Format::XlWic,
    ];

    /// Family the format belongs to.
    #[must_use]
    pub fn family(self) -> Family {
        match self {
            Self::Conll2009 | Self::Conll2012 | Self::UnitedSrl => Family::Srl,
            Self::WsdFramework | Self::XlWsd => Family::Wsd,
            Self::Wic | Self::XlWic => Family::Wic,
        }
    }

    /// Canonical name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Conll2009 => "conll2009",
            Self::Conll2012 => "conll2012",
            Self::UnitedSrl => "united-srl",
            Self::WsdFramework => "wsd-framework",
            Self::XlWsd => "xl-wsd",
            Self::Wic => "wic",
            Self::XlWic => "xl-wic",
        }
    }

    /// Repeated-role policy when the configuration sets none.
    ///
    /// Dependency SRL repeats modifier roles; span SRL does not.
    #[must_use]
    pub fn default_roles(self) -> RolePolicy {
        match self {
            Self::Conll2012 => RolePolicy::Reject,
            _ => RolePolicy::Permit,
        }
    }

    /// File extensions of data files found in a corpus directory.
    #[must_use]
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Conll2009 => &["txt", "conll", "conll09"],
            Self::Conll2012 => &["gold_conll"],
            Self::UnitedSrl => &["conll", "conllu", "tsv"],
            Self::WsdFramework | Self::XlWsd => &["xml"],
            Self::Wic | Self::XlWic => &["txt", "tsv"],
        }
    }

    /// Data/gold suffix pairing used when the configuration sets none.
    #[must_use]
    pub fn default_pairing(self) -> Option<KeyPairing> {
        match self {
            Self::WsdFramework | Self::XlWsd => Some(KeyPairing::wsd()),
            Self::Wic => Some(KeyPairing::wic()),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        let format = match key.as_str() {
            "conll2009" | "conll09" => Self::Conll2009,
            "conll2012" | "conll12" | "ontonotes" => Self::Conll2012,
            "unitedsrl" | "united" => Self::UnitedSrl,
            "wsdframework" | "wsd" | "raganato" => Self::WsdFramework,
            "xlwsd" => Self::XlWsd,
            "wic" => Self::Wic,
            "xlwic" | "mclwic" => Self::XlWic,
            _ => return Err(Error::config(format!("unknown format {:?}", s))),
        };
        Ok(format)
    }
}

/// A reader for one corpus family.
pub trait CorpusReader: Sized {
    /// Check the configuration and resolve the input files.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] for a bad configuration or a format of
    /// another family; [`Error::UnreadableInput`] when no input file (or a
    /// required gold file) exists.
    fn open(format: Format, config: ReaderConfig) -> Result<Self>;

    /// Format being read.
    fn format(&self) -> Format;

    /// Inputs in reading order.
    fn inputs(&self) -> &[Input];

    /// Consume the reader into its lazy record sequence.
    fn read(self) -> Records;
}

/// Open the reader for `format`'s family and start reading.
pub fn read(format: Format, config: ReaderConfig) -> Result<Records> {
    Ok(match format.family() {
        Family::Srl => SrlReader::open(format, config)?.read(),
        Family::Wsd => WsdReader::open(format, config)?.read(),
        Family::Wic => WicReader::open(format, config)?.read(),
    })
}

/// Reject a format outside the reader's family, then check the configuration.
fn check_open(format: Format, family: Family, config: &ReaderConfig) -> Result<()> {
    if format.family() != family {
        return Err(Error::config(format!(
            "{} is not a {:?} format",
            format, family
        )));
    }
    config.check()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names_round_trip() {
        for format in Format::ALL {
            assert_eq!(format.name().parse::<Format>().unwrap(), format);
        }
        assert_eq!("CoNLL-2009".parse::<Format>().unwrap(), Format::Conll2009);
        assert_eq!("MCL-WiC".parse::<Format>().unwrap(), Format::XlWic);
        assert!("semcor".parse::<Format>().is_err());
    }

    #[test]
    fn test_family_and_defaults() {
        assert_eq!(Format::UnitedSrl.family(), Family::Srl);
        assert_eq!(Format::XlWsd.family(), Family::Wsd);
        assert_eq!(Format::Conll2012.default_roles(), RolePolicy::Reject);
        assert_eq!(Format::Conll2009.default_roles(), RolePolicy::Permit);
        assert!(Format::XlWic.default_pairing().is_none());
    }

    #[test]
    fn test_wrong_family_is_invalid_config() {
        let config = ReaderConfig::new("x");
        assert!(matches!(
            SrlReader::open(Format::Wic, config),
            Err(Error::InvalidConfig(_))
        ));
    }
}
