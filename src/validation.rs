//! Validation of canonical instances.
//!
//! Decoders build instances through checked constructors; validation runs
//! the same invariants again on the finished object, plus the checks that
//! depend on reader policy:
//!
//! | Check | Outcome |
//! |-------|---------|
//! | token indices, dependency heads | reject |
//! | predicate, argument and sense bounds | reject |
//! | repeated role under [`RolePolicy::Reject`] | reject |
//! | WiC target surface vs. token | reject |
//! | gold key not resolvable in its inventory | warn |
//! | empty WiC lemma | warn |
//!
//! Validation never modifies the instance.

use corpora_core::{
    AnnotatedSentence, Instance, Issue, Position, RolePolicy, Severity, WicInstance,
};

/// Policy-dependent parts of validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Whether a role label may repeat on one predicate.
    pub roles: RolePolicy,
}

impl ValidationPolicy {
    /// Policy with the given repeated-role handling.
    #[must_use]
    pub fn new(roles: RolePolicy) -> Self {
        Self { roles }
    }
}

/// Outcome of validating one instance.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// No findings.
    Pass,
    /// Usable, with findings worth reporting.
    Warn(Vec<Issue>),
    /// Not usable; contains every finding, warnings included.
    Reject(Vec<Issue>),
}

impl Verdict {
    fn from_issues(issues: Vec<Issue>) -> Self {
        if issues.is_empty() {
            Self::Pass
        } else if issues.iter().any(|i| i.severity == Severity::Error) {
            Self::Reject(issues)
        } else {
            Self::Warn(issues)
        }
    }

    /// Findings, empty for [`Verdict::Pass`].
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Pass => &[],
            Self::Warn(issues) | Self::Reject(issues) => issues,
        }
    }

    /// Whether the instance must not be used.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Reject(_))
    }

    /// Attach `position` to every finding.
    #[must_use]
    pub fn at(self, position: &Position) -> Self {
        let stamp = |issues: Vec<Issue>| {
            issues
                .into_iter()
                .map(|mut issue| {
                    issue.position = position.clone();
                    issue
                })
                .collect()
        };
        match self {
            Self::Pass => Self::Pass,
            Self::Warn(issues) => Self::Warn(stamp(issues)),
            Self::Reject(issues) => Self::Reject(stamp(issues)),
        }
    }
}

/// Validate one instance.
#[must_use]
pub fn validate(instance: &Instance, policy: &ValidationPolicy) -> Verdict {
    let mut issues = Vec::new();
    match instance {
        Instance::Sentence(annotated) => check_sentence(annotated, policy, &mut issues),
        Instance::Wic(pair) => check_wic(pair, &mut issues),
    }
    Verdict::from_issues(issues)
}

fn error(message: impl Into<String>) -> Issue {
    Issue::schema(Position::default(), Severity::Error, message)
}

fn warning(message: impl Into<String>) -> Issue {
    Issue::schema(Position::default(), Severity::Warning, message)
}

fn check_sentence(annotated: &AnnotatedSentence, policy: &ValidationPolicy, issues: &mut Vec<Issue>) {
    let sentence = annotated.sentence();
    if let Err(e) = sentence.check() {
        issues.push(error(e.to_string()));
    }
    if let Err(e) = annotated.check_bounds() {
        issues.push(error(e.to_string()));
    }
    if policy.roles == RolePolicy::Reject {
        for pas in annotated.predicates() {
            if let Some(role) = pas.repeated_role() {
                issues.push(error(format!(
                    "sentence {}: predicate {} ({}) repeats role {}",
                    sentence.id(),
                    pas.predicate(),
                    pas.frame(),
                    role
                )));
            }
        }
    }
    for sense in annotated.senses() {
        for key in sense.unresolved_keys() {
            issues.push(warning(format!(
                "instance {}: key {:?} does not resolve in {}",
                sense.instance_id(),
                key,
                sense.inventory()
            )));
        }
    }
}

fn check_wic(pair: &WicInstance, issues: &mut Vec<Issue>) {
    for target in [pair.first(), pair.second()] {
        if let Err(e) = target.sentence().check() {
            issues.push(error(format!("pair {}: {}", pair.id(), e)));
        }
        if let Err(e) = target.check() {
            issues.push(error(format!("pair {}: {}", pair.id(), e)));
        }
    }
    if pair.lemma().trim().is_empty() {
        issues.push(warning(format!("pair {} has an empty lemma", pair.id())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpora_core::{
        Argument, PredicateArgumentStructure, SenseAnnotation, SenseInventory, SenseLabel,
        Sentence, Token, TokenSpan, WicTarget,
    };

    fn sentence(words: &[&str]) -> Sentence {
        let tokens = words
            .iter()
            .enumerate()
            .map(|(i, w)| Token::new(i + 1, *w))
            .collect();
        Sentence::from_tokens("s1", tokens).unwrap()
    }

    #[test]
    fn test_clean_sentence_passes() {
        let annotated = AnnotatedSentence::bare(sentence(&["Dogs", "bark"]));
        assert_eq!(validate(&annotated.into(), &ValidationPolicy::default()), Verdict::Pass);
    }

    #[test]
    fn test_repeated_roles_follow_policy() {
        let args = vec![
            Argument::new("AM-TMP", TokenSpan::single(1).unwrap()),
            Argument::new("AM-TMP", TokenSpan::single(2).unwrap()),
        ];
        let pas = PredicateArgumentStructure::new(
            3,
            TokenSpan::single(3).unwrap(),
            "go.01",
            args,
            RolePolicy::Permit,
        )
        .unwrap();
        let annotated = AnnotatedSentence::new(sentence(&["Then", "now", "go"]), vec![pas], vec![]).unwrap();
        let instance: Instance = annotated.into();
        assert_eq!(validate(&instance, &ValidationPolicy::new(RolePolicy::Permit)), Verdict::Pass);
        assert!(validate(&instance, &ValidationPolicy::new(RolePolicy::Reject)).is_rejected());
    }

    #[test]
    fn test_unresolved_key_warns() {
        let sense = SenseAnnotation::new(
            "d0.s0.t0",
            1,
            "art",
            "NOUN",
            SenseLabel::Tagged(vec!["not-a-key".into()]),
            SenseInventory::wordnet30(),
        );
        let annotated = AnnotatedSentence::new(sentence(&["art"]), vec![], vec![sense]).unwrap();
        let verdict = validate(&annotated.into(), &ValidationPolicy::default());
        assert!(matches!(verdict, Verdict::Warn(ref issues) if issues.len() == 1));
        let stamped = verdict.at(&Position::new("x.xml", 0, 4));
        assert_eq!(stamped.issues()[0].position.record, 4);
    }

    #[test]
    fn test_empty_wic_lemma_warns() {
        let first = WicTarget::at(sentence(&["Beat", "it"]), 1).unwrap();
        let second = WicTarget::at(sentence(&["Beat", "them"]), 1).unwrap();
        let pair = WicInstance::new("p1", "", None, first, second, None);
        let verdict = validate(&pair.into(), &ValidationPolicy::default());
        assert!(matches!(verdict, Verdict::Warn(_)));
    }
}
