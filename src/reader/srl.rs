use super::{check_open, locate, CorpusReader, Family, Format, RecordPolicy, Records};
use crate::config::ReaderConfig;
use crate::decode::conll2009::Conll2009Decoder;
use crate::decode::conll2012::Conll2012Decoder;
use crate::decode::united::UnitedDecoder;
use crate::decode::{Decoder, Input};
use crate::validation::ValidationPolicy;
use corpora_core::{Result, RolePolicy};

/// Reader for CoNLL-2009, CoNLL-2012 and UniteD-SRL corpora.
#[derive(Debug, Clone)]
pub struct SrlReader {
    format: Format,
    config: ReaderConfig,
    inputs: Vec<Input>,
}

impl SrlReader {
    /// Repeated-role policy in effect.
    #[must_use]
    pub fn roles(&self) -> RolePolicy {
        self.config
            .repeated_roles
            .unwrap_or_else(|| self.format.default_roles())
    }

    fn decoder(&self) -> Box<dyn Decoder + Send> {
        let roles = self.roles();
        match self.format {
            Format::Conll2012 => Box::new(Conll2012Decoder::new().with_role_policy(roles)),
            Format::UnitedSrl => {
                let mut decoder = UnitedDecoder::new().with_role_policy(roles);
                if let Some(inventory) = &self.config.frame_inventory {
                    decoder = decoder.with_frame_inventory(inventory.as_str());
                }
                Box::new(decoder)
            }
            _ => Box::new(Conll2009Decoder::new().with_role_policy(roles)),
        }
    }
}

impl CorpusReader for SrlReader {
    fn open(format: Format, config: ReaderConfig) -> Result<Self> {
        check_open(format, Family::Srl, &config)?;
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
        let policy = RecordPolicy::from_config(&self.config, ValidationPolicy::new(self.roles()));
        let decoder = self.decoder();
        Records::new(self.inputs, decoder, policy)
    }
}
