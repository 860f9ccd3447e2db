//! Error reconstruction and classification
//!
//! This module turns arbitrary errors, whether structured, wrapped, joined or
//! flattened to text, into one canonical [`ErrorX`] carrying an [`ErrKind`], an
//! ordered list of unique [`Leaf`] messages and optional [`Attr`]ibutes.

pub mod attr;
pub mod detector;
pub mod engine;
pub mod errorx;
pub mod kind;
pub mod leaf;
pub mod probe;
mod render;

// Re-export main types for convenient access
pub use attr::{Attr, AttrGroup};
pub use detector::{KindDetector, KindPattern};
pub use engine::{
    Classifier, DELIM_ARROW, DELIM_ARROW_SERIALIZED, DELIM_MULTILINE, DELIM_SEMICOLON,
    MAX_NESTING, MULTILINE_PREFIX,
};
pub use errorx::{ErrorX, OptionErrorXExt};
pub use kind::{combine, ErrKind, UnknownKindError};
pub use leaf::Leaf;
pub use probe::{join, BoxError, CausedError, HasCause, HasChildren, MultiError, Probe, Shape};
