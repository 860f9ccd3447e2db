//! Error kinds attached to a canonical error
//!
//! An [`ErrKind`] names the category an error belongs to. Kinds are ranked by
//! specificity so that two kinds can always be merged into one with
//! [`combine`], independent of the order they were discovered in.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// The category of an error.
///
/// Variants are declared from least to most specific. The declaration order is
/// the precedence used by [`combine`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrKind {
    /// No category could be determined.
    #[default]
    Unknown,
    /// A bug or invalid state in the calling code.
    Logic,
    /// A network failure of unspecified persistence.
    Network,
    /// A network failure that may resolve on its own (reset, i/o timeout).
    NetworkTemporary,
    /// A network failure that will not resolve on retry (unresolvable host, closed port).
    NetworkPermanent,
    /// A deadline or context timeout was exceeded.
    Deadline,
}

impl ErrKind {
    /// All kinds, in ascending precedence.
    pub const ALL: [ErrKind; 6] = [
        ErrKind::Unknown,
        ErrKind::Logic,
        ErrKind::Network,
        ErrKind::NetworkTemporary,
        ErrKind::NetworkPermanent,
        ErrKind::Deadline,
    ];

    /// Stable machine-readable name, used in rendered and serialized output.
    pub fn name(self) -> &'static str {
        match self {
            ErrKind::Unknown => "unknown-error",
            ErrKind::Logic => "logic-error",
            ErrKind::Network => "network-error",
            ErrKind::NetworkTemporary => "network-temporary-error",
            ErrKind::NetworkPermanent => "network-permanent-error",
            ErrKind::Deadline => "deadline-exceeded",
        }
    }

    /// Human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            ErrKind::Unknown => "unknown error",
            ErrKind::Logic => "logic error",
            ErrKind::Network => "network error",
            ErrKind::NetworkTemporary => "temporary network error",
            ErrKind::NetworkPermanent => "permanent network error",
            ErrKind::Deadline => "deadline exceeded",
        }
    }

    /// Position in the precedence table. Higher wins in [`combine`].
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Returns true for any of the network kinds.
    pub fn is_network(self) -> bool {
        matches!(
            self,
            ErrKind::Network | ErrKind::NetworkTemporary | ErrKind::NetworkPermanent
        )
    }
}

/// Merges two kinds into one.
///
/// The more specific kind wins according to the declaration order of
/// [`ErrKind`]. `Unknown` is the identity, and the result does not depend on
/// argument order.
pub fn combine(a: ErrKind, b: ErrKind) -> ErrKind {
    a.max(b)
}

/// Merges an optional current kind with a newly discovered one.
///
/// An absent kind adopts the other side unchanged.
pub(crate) fn combine_opt(current: Option<ErrKind>, other: Option<ErrKind>) -> Option<ErrKind> {
    match (current, other) {
        (Some(a), Some(b)) => Some(combine(a, b)),
        (a, None) => a,
        (None, b) => b,
    }
}

impl fmt::Display for ErrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ErrKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Returned when a string does not name any [`ErrKind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown error kind: {0}")]
pub struct UnknownKindError(pub String);

impl FromStr for ErrKind {
    type Err = UnknownKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ErrKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownKindError(s.to_string()))
    }
}
