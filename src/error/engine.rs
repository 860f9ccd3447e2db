//! Decomposition engine
//!
//! A [`Classifier`] turns any error into an [`ErrorX`]. Structure is tried
//! first (an existing `ErrorX`, ordered children, the `source()` chain, a root
//! cause); errors that only expose text are split on the delimiters other code
//! uses to join error messages.

use std::error::Error;
use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::{debug, trace};

use super::detector::KindDetector;
use super::probe::{Probe, Shape};
use super::{ErrKind, ErrorX, Leaf};
use crate::settings::Settings;

/// Arrow used to chain an error onto its context, innermost cause last.
pub const DELIM_ARROW: &str = "<-";
/// The arrow as it appears in JSON-escaped output.
pub const DELIM_ARROW_SERIALIZED: &str = r"\u003c-";
/// Separator conventionally used to join errors on one line.
pub const DELIM_SEMICOLON: &str = "; ";
/// Separator between entries of a multi-line error block.
pub const DELIM_MULTILINE: &str = "\n -  ";
/// Heading that introduces a multi-line error block.
pub const MULTILINE_PREFIX: &str = "the following errors occurred:";

/// Maximum number of structural levels (children or `source()`) followed
/// before an error is handled as plain text.
pub const MAX_NESTING: usize = 32;

/// Order in which the segments of a split are revisited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SegmentOrder {
    Forward,
    /// Arrow chains list context first; reversing restores cause-first order.
    Reverse,
}

/// A textual join convention.
#[derive(Debug)]
struct Delimiter {
    /// Text whose presence selects this delimiter.
    marker: &'static str,
    /// Text removed before splitting.
    strip: Option<&'static str>,
    /// Text the message is split on.
    split: &'static str,
    order: SegmentOrder,
}

/// Recognised join conventions, in priority order.
static DELIMITERS: [Delimiter; 4] = [
    Delimiter {
        marker: DELIM_ARROW,
        strip: None,
        split: DELIM_ARROW,
        order: SegmentOrder::Reverse,
    },
    Delimiter {
        marker: DELIM_ARROW_SERIALIZED,
        strip: None,
        split: DELIM_ARROW_SERIALIZED,
        order: SegmentOrder::Reverse,
    },
    Delimiter {
        marker: DELIM_SEMICOLON,
        strip: None,
        split: DELIM_SEMICOLON,
        order: SegmentOrder::Forward,
    },
    Delimiter {
        marker: MULTILINE_PREFIX,
        strip: Some(MULTILINE_PREFIX),
        split: DELIM_MULTILINE,
        order: SegmentOrder::Forward,
    },
];

struct Inner {
    settings: Settings,
    probes: Vec<Probe>,
    detector: KindDetector,
}

/// Classifies errors into [`ErrorX`].
///
/// Cloning is cheap; all clones share the same immutable settings, probes and
/// kind detector. Every `ErrorX` keeps a handle to the classifier that built it
/// so that rendering and matching use the same settings.
///
/// Structural chains (children or `source()`) are followed at most
/// [`MAX_NESTING`] levels deep. An error found at that depth is split as text
/// and anything beneath it, including the innermost cause, is not visited.
#[derive(Clone)]
pub struct Classifier {
    inner: Arc<Inner>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("settings", &self.inner.settings)
            .field("probes", &self.inner.probes)
            .finish_non_exhaustive()
    }
}

impl Classifier {
    /// Creates a classifier with the built-in probes and kind patterns.
    pub fn new(settings: Settings) -> Self {
        Self::with_parts(settings, Probe::builtin(), KindDetector::new())
    }

    /// Creates a classifier from explicit parts.
    pub fn with_parts(settings: Settings, probes: Vec<Probe>, detector: KindDetector) -> Self {
        Self {
            inner: Arc::new(Inner {
                settings,
                probes,
                detector,
            }),
        }
    }

    /// Shared classifier with default settings, used by [`ErrorX::new`].
    pub fn shared() -> &'static Classifier {
        static SHARED: OnceLock<Classifier> = OnceLock::new();
        SHARED.get_or_init(Classifier::default)
    }

    /// Returns a classifier that also recognises `probe`.
    ///
    /// Probes added later run after the existing ones within the same shape.
    pub fn with_probe(&self, probe: Probe) -> Self {
        let mut probes = self.inner.probes.clone();
        probes.push(probe);
        Self::with_parts(self.inner.settings.clone(), probes, self.inner.detector.clone())
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn max_depth(&self) -> usize {
        self.inner.settings.max_depth
    }

    pub fn separator(&self) -> &str {
        &self.inner.settings.separator
    }

    pub fn detector(&self) -> &KindDetector {
        &self.inner.detector
    }

    /// Decomposes an error into a fresh [`ErrorX`].
    pub fn classify(&self, err: &(dyn Error + 'static)) -> ErrorX {
        let mut target = ErrorX::empty(self.clone());
        self.decompose(&mut target, err, 0);
        target
    }

    /// Like [`Classifier::classify`], but passes `None` through.
    pub fn classify_opt(&self, err: Option<&(dyn Error + 'static)>) -> Option<ErrorX> {
        err.map(|err| self.classify(err))
    }

    /// Classifies `err` and appends `message` as context.
    pub fn wrap(&self, err: &(dyn Error + 'static), message: impl fmt::Display) -> ErrorX {
        let mut x = self.classify(err);
        x.msg(message);
        x
    }

    /// Classifies `err` and determines its kind, inferring one from the leaf
    /// messages when none was set explicitly.
    pub fn kind_of(&self, err: &(dyn Error + 'static)) -> ErrKind {
        self.inner.detector.detect(&self.classify(err))
    }

    /// Recursively adds everything `err` is made of to `to`.
    ///
    /// Both guards are checked on every entry: the leaf bound stops the walk
    /// once `to` is full, and the nesting bound stops structural chains that
    /// never yield a leaf, such as an error that is its own `source()`.
    fn decompose(&self, to: &mut ErrorX, err: &(dyn Error + 'static), nesting: usize) {
        if let Some(existing) = err.downcast_ref::<ErrorX>() {
            trace!("merging existing ErrorX");
            to.absorb(existing);
            return;
        }
        if to.is_full() {
            return;
        }
        if nesting >= MAX_NESTING {
            debug!(nesting, "error chain nested too deeply; treating as text");
            self.decompose_text(to, &err.to_string());
            return;
        }

        if let Some(children) = self.children_of(err) {
            if children.is_empty() {
                self.decompose_text(to, &err.to_string());
                return;
            }
            for child in children {
                self.decompose(to, child, nesting + 1);
            }
            return;
        }

        if let Some(child) = err.source() {
            self.decompose(to, child, nesting + 1);
            return;
        }

        if let Some(cause) = self.cause_of(err) {
            let cause_text = cause.to_string();
            to.push_text(&cause_text);
            let remaining = err.to_string().replace(&cause_text, "");
            if !remaining.trim().is_empty() {
                self.decompose_text(to, &remaining);
            }
            return;
        }

        self.decompose_text(to, &err.to_string());
    }

    fn decompose_text(&self, to: &mut ErrorX, text: &str) {
        if to.is_full() {
            return;
        }

        let Some(delim) = DELIMITERS.iter().find(|d| text.contains(d.marker)) else {
            // irreducible, kept even when empty
            to.push_leaf(Leaf::new(text.trim()));
            return;
        };

        let body = match delim.strip {
            Some(strip) => text.replace(strip, ""),
            None => text.to_string(),
        };
        trace!(marker = ?delim.marker, "splitting error text");

        let mut parts: Vec<&str> = body.split(delim.split).map(str::trim).collect();
        if delim.order == SegmentOrder::Reverse {
            parts.reverse();
        }
        for part in parts {
            if !part.is_empty() {
                self.decompose_text(to, part);
            }
        }
    }

    fn children_of<'a>(
        &self,
        err: &'a (dyn Error + 'static),
    ) -> Option<Vec<&'a (dyn Error + 'static)>> {
        self.inner.probes.iter().find_map(|probe| match probe.detect(err) {
            Some(Shape::Children(children)) => {
                trace!(probe = probe.name(), count = children.len(), "children probe matched");
                Some(children)
            }
            _ => None,
        })
    }

    fn cause_of<'a>(&self, err: &'a (dyn Error + 'static)) -> Option<&'a (dyn Error + 'static)> {
        self.inner.probes.iter().find_map(|probe| match probe.detect(err) {
            Some(Shape::Cause(cause)) => {
                trace!(probe = probe.name(), "cause probe matched");
                Some(cause)
            }
            _ => None,
        })
    }
}
