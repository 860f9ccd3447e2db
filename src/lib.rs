//! errkit - canonical error reconstruction and classification
//!
//! Errors reach logging and comparison code in many shapes: typed errors with a
//! `source()` chain, joined lists, causes with context glued on as text, or
//! plain strings joined with `<-`, `; ` or a multi-line block. [`Classifier`]
//! reduces all of them to one [`ErrorX`]: an [`ErrKind`], a deduplicated,
//! bounded list of leaf messages, and key-value attributes.
//!
//! ```
//! use errkit::{Classifier, Leaf};
//!
//! let x = Classifier::default().classify(&Leaf::new("disk full <- write failed <- save config"));
//! let leaves: Vec<&str> = x.errors().iter().map(|l| l.message()).collect();
//! assert_eq!(leaves, ["save config", "write failed", "disk full"]);
//! assert_eq!(x.to_string(), "save config; write failed; disk full");
//! ```

pub mod error;
pub mod logging;
pub mod settings;

pub use error::{
    combine, join, Attr, CausedError, Classifier, ErrKind, ErrorX, HasCause, HasChildren,
    KindDetector, Leaf, MultiError, OptionErrorXExt, Probe,
};
pub use settings::{Settings, SettingsError};
