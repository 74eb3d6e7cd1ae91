//! The lazy record sequence shared by all readers.

use crate::config::{MissingGoldPolicy, ReaderConfig};
use crate::decode::{source_name, Decoder, Input, Step, Steps};
use crate::validation::{validate, ValidationPolicy, Verdict};
use corpora_core::{Document, Instance, Issue, IssueKind, Position, Report, Result, Severity};
use serde::Serialize;
use std::collections::VecDeque;

/// One canonical instance handed to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Where the instance was read from.
    pub position: Position,
    /// The instance.
    pub instance: Instance,
    /// Findings that did not prevent the instance from being produced.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Issue>,
}

/// How [`Records`] treats recoverable issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordPolicy {
    /// Keep or drop annotations without gold key.
    pub missing_gold: MissingGoldPolicy,
    /// `None` disables validation.
    pub validation: Option<ValidationPolicy>,
    /// Yield issues that removed content as `Err` markers.
    pub include_malformed: bool,
    /// End the sequence at the first issue that removed content.
    pub strict: bool,
}

impl RecordPolicy {
    /// Policy from a reader configuration and the format's role policy.
    #[must_use]
    pub fn from_config(config: &ReaderConfig, validation: ValidationPolicy) -> Self {
        Self {
            missing_gold: config.missing_gold,
            validation: config.validate.then_some(validation),
            include_malformed: config.include_malformed,
            strict: config.strict,
        }
    }
}

/// Lazy sequence of records over all inputs of a reader.
///
/// Inputs are opened one at a time, when the previous one is exhausted.
/// Recoverable issues are collected in [`Records::report`]; whether they
/// also appear in the sequence depends on the [`RecordPolicy`]. A fatal
/// error is yielded once and ends the sequence.
pub struct Records {
    inputs: VecDeque<Input>,
    decoder: Box<dyn Decoder + Send>,
    current: Option<Steps>,
    policy: RecordPolicy,
    report: Report,
    pending: VecDeque<Result<Record>>,
    produced: usize,
    /// Inputs opened so far; the last one produced the pending records.
    opened: usize,
    finished: bool,
}

impl Records {
    /// Sequence over `inputs`, decoded with `decoder`.
    pub fn new(inputs: Vec<Input>, decoder: Box<dyn Decoder + Send>, policy: RecordPolicy) -> Self {
        Self {
            inputs: inputs.into(),
            decoder,
            current: None,
            policy,
            report: Report::new(),
            pending: VecDeque::new(),
            produced: 0,
            opened: 0,
            finished: false,
        }
    }

    /// Issues seen so far.
    #[must_use]
    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Finish reading and keep only the report.
    #[must_use]
    pub fn into_report(self) -> Report {
        self.report
    }

    /// Group consecutive records into documents.
    #[must_use]
    pub fn documents(self) -> Documents {
        Documents {
            records: self,
            current: None,
            input: 0,
        }
    }

    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            self.current = None;
            self.inputs.clear();
            log::info!(
                "read {} records, {} issues ({} malformed, {} missing gold, {} schema)",
                self.produced,
                self.report.len(),
                self.report.count(IssueKind::MalformedRecord),
                self.report.count(IssueKind::MissingGoldKey),
                self.report.count(IssueKind::SchemaViolation)
            );
        }
    }

    /// Next decoder step, opening inputs as needed.
    fn next_step(&mut self) -> Option<Result<Step>> {
        loop {
            if let Some(steps) = self.current.as_mut() {
                match steps.next() {
                    Some(step) => return Some(step),
                    None => self.current = None,
                }
            }
            let input = self.inputs.pop_front()?;
            log::debug!("reading {}", input.data.display());
            self.opened += 1;
            match self.decoder.decode(&input) {
                Ok(steps) => self.current = Some(steps),
                Err(e) => return Some(Err(e)),
            }
        }
    }

    /// Record one issue and decide whether it surfaces in the sequence.
    fn handle_issue(&mut self, issue: Issue) {
        self.report.push(issue.clone());
        if issue.severity != Severity::Error {
            return;
        }
        if self.policy.strict {
            self.pending.push_back(Err(issue.into_error()));
            self.finished_after_pending();
        } else if self.policy.include_malformed {
            self.pending.push_back(Err(issue.into_error()));
        }
    }

    fn finished_after_pending(&mut self) {
        self.current = None;
        self.inputs.clear();
        self.finished = true;
        log::info!(
            "stopped after {} records at first issue ({} issues)",
            self.produced,
            self.report.len()
        );
    }

    fn process(&mut self, step: Step) {
        let (mut instance, position, mut issues) = match step {
            Step::Skipped(issue) => {
                self.handle_issue(issue);
                return;
            }
            Step::Decoded {
                instance,
                position,
                notes,
            } => (instance, position, notes),
        };

        let missing_gold = issues.iter().any(|i| i.kind == IssueKind::MissingGoldKey);
        if missing_gold && self.policy.missing_gold == MissingGoldPolicy::Skip {
            instance = match instance {
                Instance::Sentence(s) => {
                    Instance::Sentence(s.retain_senses(|sense| !sense.label().is_untagged()))
                }
                other => other,
            };
            for issue in issues.iter_mut().filter(|i| i.kind == IssueKind::MissingGoldKey) {
                issue.severity = Severity::Error;
            }
        }

        let mut rejected = false;
        if let Some(policy) = &self.policy.validation {
            let verdict = validate(&instance, policy).at(&position);
            rejected = verdict.is_rejected();
            if let Verdict::Warn(found) | Verdict::Reject(found) = verdict {
                for issue in &found {
                    log::warn!("{}", issue);
                }
                issues.extend(found);
            }
        }

        let (warnings, errors): (Vec<Issue>, Vec<Issue>) = issues
            .into_iter()
            .partition(|i| i.severity == Severity::Warning);
        for warning in &warnings {
            self.report.push(warning.clone());
        }
        if !rejected {
            self.produced += 1;
            self.pending.push_back(Ok(Record {
                position,
                instance,
                warnings,
            }));
        }
        for error in errors {
            if self.finished {
                self.report.push(error);
            } else {
                self.handle_issue(error);
            }
        }
    }
}

impl Iterator for Records {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(item);
            }
            if self.finished {
                return None;
            }
            match self.next_step() {
                None => {
                    self.finish();
                    return None;
                }
                Some(Err(e)) => {
                    log::warn!("stopping: {}", e);
                    self.finish();
                    return Some(Err(e));
                }
                Some(Ok(step)) => self.process(step),
            }
        }
    }
}

/// Records grouped into documents.
///
/// Consecutive sentences sharing a document id form one document; sentences
/// without one are grouped by input file. WiC pairs form one document per
/// input file. A document never spans two inputs, even when their file names
/// agree. Errors pass through as they occur.
pub struct Documents {
    records: Records,
    current: Option<Document>,
    /// Input the current document was read from.
    input: usize,
}

impl Documents {
    /// Issues seen so far.
    #[must_use]
    pub fn report(&self) -> &Report {
        self.records.report()
    }

    fn add(&mut self, record: Record) -> Result<Option<Document>> {
        let key = document_key(&record);
        let input = self.records.opened;
        let switch = self
            .current
            .as_ref()
            .map_or(false, |doc| doc.id() != key || self.input != input);
        self.input = input;
        let flushed = if switch { self.current.take() } else { None };
        let doc = self.current.get_or_insert_with(|| Document::new(key));
        match record.instance {
            Instance::Sentence(sentence) => doc.push(sentence)?,
            Instance::Wic(pair) => doc.push_wic(pair),
        }
        Ok(flushed)
    }
}

fn document_key(record: &Record) -> String {
    let by_source = || {
        let name = source_name(std::path::Path::new(&record.position.source));
        name.split('.').next().unwrap_or_default().to_string()
    };
    match &record.instance {
        Instance::Sentence(s) => s
            .sentence()
            .document()
            .map_or_else(by_source, str::to_string),
        Instance::Wic(_) => by_source(),
    }
}

impl Iterator for Documents {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.records.next() {
                None => return self.current.take().map(Ok),
                Some(Err(e)) => return Some(Err(e)),
                Some(Ok(record)) => match self.add(record) {
                    Ok(Some(done)) => return Some(Ok(done)),
                    Ok(None) => {}
                    Err(e) => return Some(Err(e)),
                },
            }
        }
    }
}
