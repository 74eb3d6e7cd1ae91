use super::{check_open, locate, CorpusReader, Family, Format, RecordPolicy, Records};
use crate::config::ReaderConfig;
use crate::decode::wic::{WicDecoder, WicLayout};
use crate::decode::Input;
use crate::validation::ValidationPolicy;
use corpora_core::Result;

/// Reader for WiC, XL-WiC and tabular MCL-WiC corpora.
#[derive(Debug, Clone)]
pub struct WicReader {
    format: Format,
    config: ReaderConfig,
    inputs: Vec<Input>,
}

impl WicReader {
    /// Column layout of the tables being read.
    #[must_use]
    pub fn layout(&self) -> WicLayout {
        match self.format {
            Format::XlWic => WicLayout::Offsets,
            _ => WicLayout::Tokens,
        }
    }
}

impl CorpusReader for WicReader {
    fn open(format: Format, config: ReaderConfig) -> Result<Self> {
        check_open(format, Family::Wic, &config)?;
        let inputs = locate(format, &config)?;
        Ok(Self {
            format,
            config,
            inputs,
        })
    }

    fn format(&self) -> Format {
        self.format
    }

    fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    fn read(self) -> Records {
        let policy = RecordPolicy::from_config(&self.config, ValidationPolicy::default());
        let decoder = WicDecoder::new(self.layout())
            .with_lemma_check(self.config.lemma_check)
            .with_header(self.config.has_header);
        Records::new(self.inputs, Box::new(decoder), policy)
    }
}
