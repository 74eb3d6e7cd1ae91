//! Input resolution: directory search, split/language filters, gold pairing.

use super::{Family, Format};
use crate::config::{KeyPairing, ReaderConfig, Split};
use crate::decode::xlwsd::language_from_path;
use crate::decode::Input;
use corpora_core::{Error, Result};
use std::path::{Path, PathBuf};

/// Resolve the inputs `config` names for `format`, in reading order.
///
/// A file path is read as is. A directory is searched recursively for the
/// format's data files, which are then filtered by split and language and
/// sorted. WSD inputs get their gold key file; WiC token inputs get their
/// label file when one exists.
///
/// # Errors
///
/// [`Error::UnreadableInput`] when the path does not exist, nothing matches
/// the filters, or a required key file is missing; [`Error::InvalidConfig`]
/// when one explicit key file is given for several data files.
pub fn locate(format: Format, config: &ReaderConfig) -> Result<Vec<Input>> {
    let root = &config.path;
    if !root.exists() {
        return Err(Error::unreadable(root.display(), "no such file or directory"));
    }
    let pairing = config.key_pairing.clone().or_else(|| format.default_pairing());

    let data = if root.is_dir() {
        let files = search(root, format, pairing.as_ref())?;
        let kept: Vec<PathBuf> = files
            .into_iter()
            .filter(|f| config.split.map_or(true, |s| matches_split(root, f, s)))
            .filter(|f| {
                config
                    .language
                    .as_deref()
                    .map_or(true, |l| matches_language(root, f, l, format))
            })
            .collect();
        if kept.is_empty() {
            return Err(Error::unreadable(
                root.display(),
                format!(
                    "no {} files match split {} and language {}",
                    format,
                    config.split.map_or_else(|| "any".to_string(), |s| s.to_string()),
                    config.language.as_deref().unwrap_or("any")
                ),
            ));
        }
        kept
    } else {
        vec![root.clone()]
    };
    log::debug!("{}: {} input files under {}", format, data.len(), root.display());

    if config.key_path.is_some() && data.len() > 1 {
        return Err(Error::config(format!(
            "key_path names one key file but {} data files were found",
            data.len()
        )));
    }

    data.into_iter()
        .map(|path| pair(format, config, pairing.as_ref(), path))
        .collect()
}

/// Data files of `format` below `root`, sorted.
fn search(root: &Path, format: Format, pairing: Option<&KeyPairing>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for ext in format.extensions() {
        let pattern = root.join("**").join(format!("*.{}", ext));
        let paths = glob::glob(&pattern.to_string_lossy())
            .map_err(|e| Error::unreadable(root.display(), e.to_string()))?;
        files.extend(paths.filter_map(|p| p.ok()));
    }
    files.sort();
    files.dedup();
    files.retain(|f| is_data_file(f, format, pairing));
    Ok(files)
}

fn is_data_file(path: &Path, format: Format, pairing: Option<&KeyPairing>) -> bool {
    match (format.family(), pairing) {
        (Family::Wsd, Some(p)) => p.is_data(path),
        (Family::Wic, Some(p)) => p.is_data(path),
        (Family::Wic, None) => {
            let name = file_name(path).to_lowercase();
            !name.contains("gold")
        }
        _ => true,
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

/// Lowercase words of the path below `root`: directory names and the parts
/// of the file name between `.`, `_` and `-`.
fn words(root: &Path, path: &Path) -> Vec<String> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .iter()
        .filter_map(|c| c.to_str())
        .flat_map(|c| c.split(|ch: char| !ch.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn matches_split(root: &Path, path: &Path, split: Split) -> bool {
    let words = words(root, path);
    split.aliases().iter().any(|a| words.iter().any(|w| w == a))
}

fn matches_language(root: &Path, path: &Path, language: &str, format: Format) -> bool {
    let language = language.to_lowercase();
    if format == Format::XlWsd {
        if let Some(code) = language_from_path(path) {
            return code == language;
        }
    }
    words(root, path).iter().any(|w| *w == language)
}

fn pair(
    format: Format,
    config: &ReaderConfig,
    pairing: Option<&KeyPairing>,
    data: PathBuf,
) -> Result<Input> {
    let input = Input::new(data);
    match format.family() {
        Family::Srl => {
            if config.key_path.is_some() {
                log::warn!("key_path is ignored for {}", format);
            }
            Ok(input)
        }
        Family::Wsd => {
            let key = match (&config.key_path, pairing) {
                (Some(key), _) => key.clone(),
                (None, Some(p)) => p.key_for(&input.data).ok_or_else(|| {
                    Error::unreadable(
                        input.data.display(),
                        format!("name does not end in {}", p.data_suffix),
                    )
                })?,
                (None, None) => {
                    return Err(Error::unreadable(input.data.display(), "no key file pairing"))
                }
            };
            if !key.is_file() {
                return Err(Error::unreadable(key.display(), "gold key file not found"));
            }
            Ok(input.with_companion(key))
        }
        Family::Wic => {
            if let Some(key) = &config.key_path {
                if !key.is_file() {
                    return Err(Error::unreadable(key.display(), "label file not found"));
                }
                return Ok(input.with_companion(key));
            }
            let labels = pairing
                .and_then(|p| p.key_for(&input.data))
                .filter(|k| k.is_file());
            Ok(match labels {
                Some(labels) => input.with_companion(labels),
                None => input,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_wsd_directory_split_and_pairing() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "semeval2007/semeval2007.data.xml");
        touch(dir.path(), "semeval2007/semeval2007.gold.key.txt");
        touch(dir.path(), "test/senseval2.data.xml");
        touch(dir.path(), "test/senseval2.gold.key.txt");

        let config = ReaderConfig::new(dir.path()).with_split(Split::Test);
        let inputs = locate(Format::WsdFramework, &config).unwrap();
        assert_eq!(inputs.len(), 1);
        assert!(inputs[0].data.ends_with("test/senseval2.data.xml"));
        assert!(inputs[0].companion.as_ref().unwrap().ends_with("senseval2.gold.key.txt"));

        let all = locate(Format::WsdFramework, &ReaderConfig::new(dir.path())).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_missing_key_is_unreadable() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "semcor.data.xml");
        let err = locate(Format::WsdFramework, &ReaderConfig::new(dir.path())).unwrap_err();
        assert!(matches!(err, Error::UnreadableInput { .. }));
    }

    #[test]
    fn test_xlwsd_language_filter() {
        let dir = TempDir::new().unwrap();
        for lang in ["it", "es"] {
            touch(dir.path(), &format!("test-{}.data.xml", lang));
            touch(dir.path(), &format!("test-{}.gold.key.txt", lang));
        }
        let config = ReaderConfig::new(dir.path()).with_language("ES");
        let inputs = locate(Format::XlWsd, &config).unwrap();
        assert_eq!(inputs.len(), 1);
        assert!(inputs[0].data.ends_with("test-es.data.xml"));
    }

    #[test]
    fn test_wic_optional_labels() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "train/train.data.txt");
        touch(dir.path(), "train/train.gold.txt");
        touch(dir.path(), "test/test.data.txt");
        let inputs = locate(Format::Wic, &ReaderConfig::new(dir.path())).unwrap();
        assert_eq!(inputs.len(), 2);
        assert!(inputs[0].companion.is_none());
        assert!(inputs[1].companion.is_some());
    }

    #[test]
    fn test_nothing_matches() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "train.gold_conll");
        let config = ReaderConfig::new(dir.path()).with_split(Split::Dev);
        assert!(locate(Format::Conll2012, &config).is_err());
        assert!(locate(Format::Conll2012, &ReaderConfig::new("/no/such/dir")).is_err());
    }

    #[test]
    fn test_split_words() {
        let root = Path::new("/c");
        assert!(matches_split(root, Path::new("/c/v4/development/a.gold_conll"), Split::Dev));
        assert!(!matches_split(root, Path::new("/c/contest/a.gold_conll"), Split::Test));
    }
}
