//! Error kind detector
//!
//! Infers an [`ErrKind`] for errors that were never tagged, by matching leaf
//! messages against regex patterns for well-known network and deadline failures.

use regex::Regex;

use super::{ErrKind, ErrorX};

/// A pattern that identifies one error kind in a message.
#[derive(Debug, Clone)]
pub struct KindPattern {
    /// The compiled regex pattern.
    regex: Regex,
    /// The kind to assign when this pattern matches.
    kind: ErrKind,
    /// A human-readable description of what this pattern detects.
    description: String,
}

impl KindPattern {
    /// Creates a new kind pattern.
    ///
    /// # Panics
    /// Panics if the regex pattern is invalid.
    pub fn new(pattern: &str, kind: ErrKind, description: impl Into<String>) -> Self {
        Self {
            regex: Regex::new(pattern).expect("Invalid regex pattern"),
            kind,
            description: description.into(),
        }
    }

    /// Creates a new kind pattern with a pre-compiled regex.
    pub fn with_regex(regex: Regex, kind: ErrKind, description: impl Into<String>) -> Self {
        Self {
            regex,
            kind,
            description: description.into(),
        }
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn kind(&self) -> ErrKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Checks if this pattern matches the given text.
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Infers error kinds from leaf messages.
///
/// Patterns are tried in order; the first pattern matching any leaf decides
/// the kind. The defaults check deadlines first, then permanent and finally
/// temporary network failures.
#[derive(Debug, Clone)]
pub struct KindDetector {
    patterns: Vec<KindPattern>,
}

impl Default for KindDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl KindDetector {
    /// Creates a detector with the default patterns.
    pub fn new() -> Self {
        Self {
            patterns: Self::default_patterns(),
        }
    }

    /// Creates a detector with custom patterns.
    pub fn with_patterns(patterns: Vec<KindPattern>) -> Self {
        Self { patterns }
    }

    fn default_patterns() -> Vec<KindPattern> {
        vec![
            // Deadlines
            KindPattern::new(
                r"(?i)context deadline exceeded",
                ErrKind::Deadline,
                "Context deadline exceeded",
            ),
            KindPattern::new(
                r"(?i)deadline\s*(exceeded|expired)",
                ErrKind::Deadline,
                "Deadline exceeded",
            ),
            // Permanent network failures
            KindPattern::new(
                r"(?i)no such host",
                ErrKind::NetworkPermanent,
                "Host does not resolve",
            ),
            KindPattern::new(
                r"(?i)could not resolve host",
                ErrKind::NetworkPermanent,
                "Host does not resolve",
            ),
            KindPattern::new(
                r"(?i)no address found for host",
                ErrKind::NetworkPermanent,
                "Host has no address",
            ),
            KindPattern::new(
                r"(?i)port closed or filtered",
                ErrKind::NetworkPermanent,
                "Port closed or filtered",
            ),
            KindPattern::new(
                r"(?i)connection refused",
                ErrKind::NetworkPermanent,
                "Connection refused",
            ),
            KindPattern::new(
                r"(?i)network\s+is\s+unreachable",
                ErrKind::NetworkPermanent,
                "Network unreachable",
            ),
            // Temporary network failures
            KindPattern::new(
                r"(?i)i/o timeout",
                ErrKind::NetworkTemporary,
                "I/O timeout",
            ),
            KindPattern::new(
                r"(?i)connection reset",
                ErrKind::NetworkTemporary,
                "Connection reset",
            ),
            KindPattern::new(
                r"(?i)broken pipe",
                ErrKind::NetworkTemporary,
                "Broken pipe",
            ),
            KindPattern::new(
                r"(?i)temporary failure in name resolution",
                ErrKind::NetworkTemporary,
                "Temporary DNS failure",
            ),
            KindPattern::new(
                r"(?i)\btimed?\s*out\b",
                ErrKind::NetworkTemporary,
                "Timeout",
            ),
            KindPattern::new(
                r"(?i)\beof\b",
                ErrKind::NetworkTemporary,
                "Unexpected end of stream",
            ),
        ]
    }

    /// Adds a custom pattern after the existing ones.
    pub fn add_pattern(&mut self, pattern: KindPattern) {
        self.patterns.push(pattern);
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn patterns(&self) -> &[KindPattern] {
        &self.patterns
    }

    /// Returns the kind of the first pattern matching `text`.
    pub fn detect_text(&self, text: &str) -> Option<ErrKind> {
        self.patterns
            .iter()
            .find(|pattern| pattern.matches(text))
            .map(KindPattern::kind)
    }

    /// Determines the kind of an error.
    ///
    /// An explicitly set kind always wins. Otherwise the first pattern that
    /// matches any leaf decides, and `Unknown` is returned when nothing matches.
    pub fn detect(&self, err: &ErrorX) -> ErrKind {
        if let Some(kind) = err.raw_kind() {
            return kind;
        }
        self.patterns
            .iter()
            .find(|pattern| {
                err.errors()
                    .iter()
                    .any(|leaf| pattern.matches(leaf.message()))
            })
            .map(KindPattern::kind)
            .unwrap_or_default()
    }
}
