use super::{check_open, locate, CorpusReader, Family, Format, RecordPolicy, Records};
use crate::config::ReaderConfig;
use crate::decode::wsd::WsdDecoder;
use crate::decode::xlwsd::XlWsdDecoder;
use crate::decode::{Decoder, Input};
use crate::validation::ValidationPolicy;
use corpora_core::{Result, SenseInventory};

/// Reader for WSD Evaluation Framework and XL-WSD corpora.
///
/// Every data file is paired with its gold key file when the reader is
/// opened; a missing key file fails `open`.
#[derive(Debug, Clone)]
pub struct WsdReader {
    format: Format,
    config: ReaderConfig,
    inputs: Vec<Input>,
}

impl WsdReader {
    fn decoder(&self) -> Box<dyn Decoder + Send> {
        match self.format {
            Format::XlWsd => {
                let mut decoder = XlWsdDecoder::new();
                if let Some(language) = &self.config.language {
                    decoder = decoder.with_language(language.to_lowercase());
                }
                Box::new(decoder)
            }
            _ => {
                let inventory = self
                    .config
                    .sense_inventory
                    .clone()
                    .unwrap_or_else(SenseInventory::wordnet30);
                Box::new(WsdDecoder::new().with_inventory(inventory))
            }
        }
    }
}

impl CorpusReader for WsdReader {
    fn open(format: Format, config: ReaderConfig) -> Result<Self> {
        check_open(format, Family::Wsd, &config)?;
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
        let decoder = self.decoder();
        Records::new(self.inputs, decoder, policy)
    }
}
