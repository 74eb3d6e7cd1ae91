//! Reader configuration.
//!
//! Built in code with the `with_*` methods or loaded from JSON:
//!
//! ```json
//! {
//!   "path": "data/xl-wsd/evaluation_datasets",
//!   "split": "test",
//!   "language": "it",
//!   "missing_gold": "skip"
//! }
//! ```

use crate::decode::wic::LemmaCheck;
use corpora_core::{Error, Result, RolePolicy, SenseInventory};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// =============================================================================
// Split
// =============================================================================

/// Dataset split.
///
/// Deserializes through [`FromStr`], so JSON accepts every alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Split {
    /// Training data.
    Train,
    /// Development / validation data.
    Dev,
    /// Test / evaluation data.
    Test,
}

impl Split {
    /// Names used for this split in corpus file and directory names.
    #[must_use]
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Train => &["train", "training"],
            Self::Dev => &["dev", "development", "valid", "validation"],
            Self::Test => &["test", "evaluation", "eval"],
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.aliases()[0])
    }
}

impl FromStr for Split {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase();
        [Self::Train, Self::Dev, Self::Test]
            .into_iter()
            .find(|split| split.aliases().contains(&name.as_str()))
            .ok_or_else(|| Error::config(format!("unknown split {:?}", s)))
    }
}

impl TryFrom<String> for Split {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

// =============================================================================
// Policies
// =============================================================================

/// What to do with a WSD instance that has no gold key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingGoldPolicy {
    /// Keep the annotation as untagged and report it.
    #[default]
    Mark,
    /// Drop the annotation and report it.
    Skip,
}

/// Maps a data file to its gold companion by replacing a suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPairing {
    /// Suffix of data files, e.g. `.data.xml`.
    pub data_suffix: String,
    /// Suffix of the paired gold file, e.g. `.gold.key.txt`.
    pub key_suffix: String,
}

impl KeyPairing {
    /// Create a pairing.
    pub fn new(data_suffix: impl Into<String>, key_suffix: impl Into<String>) -> Self {
        Self {
            data_suffix: data_suffix.into(),
            key_suffix: key_suffix.into(),
        }
    }

    /// `.data.xml` -> `.gold.key.txt` (WSD Evaluation Framework, XL-WSD).
    #[must_use]
    pub fn wsd() -> Self {
        Self::new(".data.xml", ".gold.key.txt")
    }

    /// `.data.txt` -> `.gold.txt` (WiC).
    #[must_use]
    pub fn wic() -> Self {
        Self::new(".data.txt", ".gold.txt")
    }

    /// Whether `path` is a data file under this pairing.
    #[must_use]
    pub fn is_data(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map_or(false, |n| n.ends_with(&self.data_suffix))
    }

    /// Gold file paired with `data`, if `data` carries the data suffix.
    #[must_use]
    pub fn key_for(&self, data: &Path) -> Option<PathBuf> {
        let name = data.file_name()?.to_str()?;
        let stem = name.strip_suffix(&self.data_suffix)?;
        Some(data.with_file_name(format!("{}{}", stem, self.key_suffix)))
    }
}

// =============================================================================
// ReaderConfig
// =============================================================================

/// Everything a reader needs besides the format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Corpus file or directory.
    pub path: PathBuf,
    /// Keep only files of this split (directory inputs).
    pub split: Option<Split>,
    /// Keep only files of this language (directory inputs).
    pub language: Option<String>,
    /// Yield recoverable issues as error markers instead of only reporting them.
    pub include_malformed: bool,
    /// Stop at the first recoverable issue.
    pub strict: bool,
    /// Run the validation layer on every instance.
    pub validate: bool,
    /// Handling of WSD instances without gold key.
    pub missing_gold: MissingGoldPolicy,
    /// Override the format's repeated-role policy.
    pub repeated_roles: Option<RolePolicy>,
    /// Explicit gold key (WSD) or label (WiC) file.
    pub key_path: Option<PathBuf>,
    /// Override the family's data/key suffix pairing.
    pub key_pairing: Option<KeyPairing>,
    /// Override the sense inventory of WSD Framework corpora.
    pub sense_inventory: Option<SenseInventory>,
    /// Frame inventory UniteD-SRL frames are tagged with.
    pub frame_inventory: Option<String>,
    /// Lemma check for WiC targets.
    pub lemma_check: LemmaCheck,
    /// WiC tables start with a header row.
    pub has_header: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            split: None,
            language: None,
            include_malformed: false,
            strict: false,
            validate: true,
            missing_gold: MissingGoldPolicy::Mark,
            repeated_roles: None,
            key_path: None,
            key_pairing: None,
            sense_inventory: None,
            frame_inventory: None,
            lemma_check: LemmaCheck::Stem,
            has_header: false,
        }
    }
}

impl ReaderConfig {
    /// Configuration reading `path` with defaults everywhere else.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON configuration and check it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::config(format!("bad configuration: {}", e)))?;
        config.check()?;
        Ok(config)
    }

    /// Load a JSON configuration file and check it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Reject contradictory or incomplete settings.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] naming the offending setting.
    pub fn check(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(Error::config("path is empty"));
        }
        if self.strict && self.include_malformed {
            return Err(Error::config(
                "strict and include_malformed cannot both be set",
            ));
        }
        if matches!(&self.language, Some(l) if l.trim().is_empty()) {
            return Err(Error::config("language is empty"));
        }
        if let Some(pairing) = &self.key_pairing {
            if pairing.data_suffix.is_empty() || pairing.key_suffix.is_empty() {
                return Err(Error::config("key_pairing suffixes must not be empty"));
            }
            if pairing.data_suffix == pairing.key_suffix {
                return Err(Error::config("key_pairing suffixes must differ"));
            }
        }
        Ok(())
    }

    /// Read only `split`.
    #[must_use]
    pub fn with_split(mut self, split: Split) -> Self {
        self.split = Some(split);
        self
    }

    /// Read only `language`.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Yield recoverable issues as error markers.
    #[must_use]
    pub fn with_include_malformed(mut self, include: bool) -> Self {
        self.include_malformed = include;
        self
    }

    /// Stop at the first recoverable issue.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enable or disable validation.
    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Set the missing gold key policy.
    #[must_use]
    pub fn with_missing_gold(mut self, policy: MissingGoldPolicy) -> Self {
        self.missing_gold = policy;
        self
    }

    /// Override the repeated-role policy.
    #[must_use]
    pub fn with_repeated_roles(mut self, policy: RolePolicy) -> Self {
        self.repeated_roles = Some(policy);
        self
    }

    /// Use `path` as gold key or label file.
    #[must_use]
    pub fn with_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_path = Some(path.into());
        self
    }

    /// Override the data/key suffix pairing.
    #[must_use]
    pub fn with_key_pairing(mut self, pairing: KeyPairing) -> Self {
        self.key_pairing = Some(pairing);
        self
    }

    /// Override the WSD sense inventory.
    #[must_use]
    pub fn with_sense_inventory(mut self, inventory: SenseInventory) -> Self {
        self.sense_inventory = Some(inventory);
        self
    }

    /// Tag UniteD-SRL frames with `inventory`.
    #[must_use]
    pub fn with_frame_inventory(mut self, inventory: impl Into<String>) -> Self {
        self.frame_inventory = Some(inventory.into());
        self
    }

    /// Set the WiC lemma check.
    #[must_use]
    pub fn with_lemma_check(mut self, check: LemmaCheck) -> Self {
        self.lemma_check = check;
        self
    }

    /// Skip a header row in WiC tables.
    #[must_use]
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }
}
