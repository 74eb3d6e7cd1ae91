//! XL-WSD format.
//!
//! XL-WSD ships one WSD-Framework pair per language and split, named
//! `<name>_<lang>.data.xml` (or `<name>-<lang>.data.xml`) with gold keys
//! that are BabelNet synset ids. Each pair decodes like [`super::wsd`];
//! annotations are tagged with the BabelNet inventory of the pair's language.

use super::wsd::{build_steps, read_corpus, read_keys};
use super::{Decoder, Input, Steps};
use corpora_core::{Error, Result, SenseInventory};
use std::path::Path;

/// Suffix of XL-WSD data files.
pub const DATA_SUFFIX: &str = ".data.xml";

/// Decoder for one XL-WSD pair.
#[derive(Debug, Clone, Default)]
pub struct XlWsdDecoder {
    language: Option<String>,
}

impl XlWsdDecoder {
    /// Decoder deriving the language from each file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `language` when neither the file name nor the corpus names one.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

impl Decoder for XlWsdDecoder {
    fn decode(&self, input: &Input) -> Result<Steps> {
        let corpus = read_corpus(&input.data)?;
        let language = language_from_path(&input.data)
            .or_else(|| corpus.lang.as_ref().map(|l| l.to_lowercase()))
            .or_else(|| self.language.clone())
            .ok_or_else(|| {
                Error::unreadable(input.data.display(), "cannot determine the corpus language")
            })?;
        log::debug!("{}: XL-WSD language {}", input.data.display(), language);
        let keys = read_keys(input.companion.as_deref())?;
        build_steps(corpus, keys, SenseInventory::babelnet(language))
    }
}

/// ISO 639-1 codes accepted as file-name language suffixes.
const LANGUAGE_CODES: &[&str] = &[
    "af", "am", "ar", "az", "be", "bg", "bn", "bs", "ca", "cs", "cy", "da", "de", "el", "en", "eo",
    "es", "et", "eu", "fa", "fi", "fr", "ga", "gl", "gu", "he", "hi", "hr", "hu", "hy", "id", "is",
    "it", "ja", "ka", "kk", "km", "kn", "ko", "la", "lb", "lt", "lv", "mk", "ml", "mn", "mr", "ms",
    "mt", "my", "nb", "ne", "nl", "nn", "no", "pa", "pl", "pt", "ro", "ru", "sk", "sl", "sq", "sr",
    "sv", "sw", "ta", "te", "th", "tl", "tr", "uk", "ur", "uz", "vi", "zh",
];

/// Language code from the XL-WSD naming convention.
///
/// `semeval2013_it.data.xml` and `test-it.data.xml` both name `it`; a
/// suffix that is not a known language code (`foo_all`) names nothing.
#[must_use]
pub fn language_from_path(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(DATA_SUFFIX).unwrap_or(name);
    let (_, suffix) = stem.rsplit_once(['_', '-'])?;
    let code = suffix.to_lowercase();
    LANGUAGE_CODES.contains(&code.as_str()).then_some(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::Step;
    use corpora_core::Instance;
    use std::fs;
    use tempfile::TempDir;

    const XML: &str = r#"<corpus lang="IT" source="toy">
<text id="d0"><sentence id="d0.s0">
<wf lemma="il" pos="DET">Il</wf>
<instance id="d0.s0.t0" lemma="gatto" pos="NOUN">gatto</instance>
</sentence></text></corpus>"#;

    #[test]
    fn test_language_from_path() {
        assert_eq!(language_from_path(Path::new("semeval2013_it.data.xml")), Some("it".into()));
        assert_eq!(language_from_path(Path::new("dir/test-zh.data.xml")), Some("zh".into()));
        assert_eq!(language_from_path(Path::new("semeval2007.data.xml")), None);
        assert_eq!(language_from_path(Path::new("wngt_examples_2021.data.xml")), None);
        assert_eq!(language_from_path(Path::new("semeval_all.data.xml")), None);
        assert_eq!(language_from_path(Path::new("dev_EN.data.xml")), Some("en".into()));
    }

    #[test]
    fn test_babelnet_inventory_per_language() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("test_es.data.xml");
        let keys = dir.path().join("test_es.gold.key.txt");
        fs::write(&data, XML).unwrap();
        fs::write(&keys, "d0.s0.t0 bn:00015267n\n").unwrap();

        let steps: Vec<Step> = XlWsdDecoder::new()
            .decode(&Input::new(&data).with_companion(&keys))
            .unwrap()
            .map(|s| s.unwrap())
            .collect();
        match &steps[0] {
            Step::Decoded {
                instance: Instance::Sentence(s),
                ..
            } => {
                let sense = &s.senses()[0];
                assert_eq!(sense.inventory(), &SenseInventory::babelnet("es"));
                assert!(sense.unresolved_keys().is_empty());
            }
            other => panic!("expected sentence, got {:?}", other),
        }
    }

    #[test]
    fn test_corpus_lang_fallback() {
        let dir = TempDir::new().unwrap();
        for name in ["semeval2007.data.xml", "semeval_all.data.xml"] {
            let data = dir.path().join(name);
            fs::write(&data, XML).unwrap();
            let steps: Vec<Step> = XlWsdDecoder::new()
                .decode(&Input::new(&data))
                .unwrap()
                .map(|s| s.unwrap())
                .collect();
            match &steps[0] {
                Step::Decoded {
                    instance: Instance::Sentence(s),
                    ..
                } => assert_eq!(s.senses()[0].inventory().language(), Some("it"), "{}", name),
                other => panic!("expected sentence, got {:?}", other),
            }
        }
    }
}
