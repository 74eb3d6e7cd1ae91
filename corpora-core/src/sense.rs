//! Sense annotations and the inventories their keys resolve against.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

// lemma%ss_type:lex_filenum:lex_id:head_word:head_id
static WORDNET_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^%\s]+%[1-5]:\d{2}:\d{2}:[^:\s]*:(\d{2})?$").unwrap());
static BABELNET_SYNSET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^bn:\d{8}[nvar]$").unwrap());

/// A fixed vocabulary of sense identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SenseInventory {
    /// Princeton WordNet sense keys (`art%1:06:00::`).
    WordNet {
        /// WordNet release, e.g. `3.0`.
        version: String,
    },
    /// BabelNet synset identifiers (`bn:00005928n`), per language.
    BabelNet {
        /// Language code of the annotated corpus.
        language: String,
    },
    /// Any other inventory; keys are only required to be non-empty tokens.
    Custom {
        /// Inventory name.
        name: String,
    },
}

impl SenseInventory {
    /// WordNet 3.0, the inventory of the WSD Evaluation Framework.
    #[must_use]
    pub fn wordnet30() -> Self {
        Self::WordNet {
            version: "3.0".to_string(),
        }
    }

    /// BabelNet for one language.
    pub fn babelnet(language: impl Into<String>) -> Self {
        Self::BabelNet {
            language: language.into(),
        }
    }

    /// Stable identifier (`wn:3.0`, `bn:it`, `custom:name`).
    #[must_use]
    pub fn id(&self) -> String {
        match self {
            Self::WordNet { version } => format!("wn:{}", version),
            Self::BabelNet { language } => format!("bn:{}", language),
            Self::Custom { name } => format!("custom:{}", name),
        }
    }

    /// Language of a cross-lingual inventory.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        match self {
            Self::BabelNet { language } => Some(language),
            _ => None,
        }
    }

    /// True if `key` is well formed for this inventory.
    #[must_use]
    pub fn resolves(&self, key: &str) -> bool {
        match self {
            Self::WordNet { .. } => WORDNET_KEY.is_match(key),
            Self::BabelNet { .. } => BABELNET_SYNSET.is_match(key),
            Self::Custom { .. } => !key.is_empty() && !key.chars().any(char::is_whitespace),
        }
    }
}

impl fmt::Display for SenseInventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// Gold annotation of one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenseLabel {
    /// One or more gold keys, in key-file order.
    Tagged(Vec<String>),
    /// No sense was tagged for this instance.
    Untagged,
}

impl SenseLabel {
    /// True for [`SenseLabel::Untagged`].
    #[must_use]
    pub fn is_untagged(&self) -> bool {
        matches!(self, Self::Untagged)
    }

    /// Gold keys; empty when untagged.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        match self {
            Self::Tagged(keys) => keys,
            Self::Untagged => &[],
        }
    }
}

/// A word instance to disambiguate, with its gold sense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenseAnnotation {
    instance_id: String,
    token: usize,
    lemma: String,
    pos: String,
    label: SenseLabel,
    inventory: SenseInventory,
}

impl SenseAnnotation {
    /// Create an annotation for the token at a 1-based index.
    pub fn new(
        instance_id: impl Into<String>,
        token: usize,
        lemma: impl Into<String>,
        pos: impl Into<String>,
        label: SenseLabel,
        inventory: SenseInventory,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            token,
            lemma: lemma.into(),
            pos: pos.into(),
            label,
            inventory,
        }
    }

    /// Instance identifier shared with the key file.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// 1-based index of the annotated token.
    #[must_use]
    pub fn token(&self) -> usize {
        self.token
    }

    /// Lemma used for sense lookup.
    #[must_use]
    pub fn lemma(&self) -> &str {
        &self.lemma
    }

    /// Coarse part of speech used for sense lookup.
    #[must_use]
    pub fn pos(&self) -> &str {
        &self.pos
    }

    /// Gold label.
    #[must_use]
    pub fn label(&self) -> &SenseLabel {
        &self.label
    }

    /// Inventory the gold keys belong to.
    #[must_use]
    pub fn inventory(&self) -> &SenseInventory {
        &self.inventory
    }

    /// Gold keys the inventory cannot resolve.
    #[must_use]
    pub fn unresolved_keys(&self) -> Vec<&str> {
        self.label
            .keys()
            .iter()
            .map(String::as_str)
            .filter(|k| !self.inventory.resolves(k))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wordnet_keys() {
        let wn = SenseInventory::wordnet30();
        assert!(wn.resolves("art%1:06:00::"));
        assert!(wn.resolves("long%3:00:02::"));
        assert!(wn.resolves("fast%5:00:00:quick:01"));
        assert!(!wn.resolves("bn:00005928n"));
        assert!(!wn.resolves("art"));
    }

    #[test]
    fn test_babelnet_synsets() {
        let bn = SenseInventory::babelnet("it");
        assert!(bn.resolves("bn:00005928n"));
        assert!(!bn.resolves("bn:5928n"));
        assert!(!bn.resolves("art%1:06:00::"));
        assert_eq!(bn.id(), "bn:it");
        assert_eq!(bn.language(), Some("it"));
    }

    #[test]
    fn test_unresolved_keys() {
        let ann = SenseAnnotation::new(
            "d000.s000.t000",
            2,
            "art",
            "NOUN",
            SenseLabel::Tagged(vec!["art%1:06:00::".into(), "nonsense".into()]),
            SenseInventory::wordnet30(),
        );
        assert_eq!(ann.unresolved_keys(), vec!["nonsense"]);
        assert!(!ann.label().is_untagged());
    }

    #[test]
    fn test_inventory_serde_tag() {
        let json = serde_json::to_string(&SenseInventory::babelnet("es")).unwrap();
        assert_eq!(json, r#"{"kind":"babel_net","language":"es"}"#);
    }
}
