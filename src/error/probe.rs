//! Capability probes used by the decomposition engine
//!
//! Rust cannot ask an arbitrary `dyn Error` whether it implements some other
//! trait, so the engine carries a list of [`Probe`]s. Each probe downcasts to one
//! concrete type and, on success, reports the shape that type exposes. The
//! single-child shape needs no probe: it is [`Error::source`].

use std::error::Error;
use std::fmt;

/// Boxed error accepted by the adapters in this module.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// An error made of an ordered list of child errors.
pub trait HasChildren: Error {
    /// The children, in order.
    fn children(&self) -> Vec<&(dyn Error + 'static)>;
}

/// An error that knows its root cause and whose message contains the cause's message.
pub trait HasCause: Error {
    /// The root cause.
    fn root_cause(&self) -> &(dyn Error + 'static);
}

/// A decomposition shape reported by a probe.
#[derive(Debug)]
pub enum Shape<'a> {
    /// Ordered children.
    Children(Vec<&'a (dyn Error + 'static)>),
    /// Root cause, with the remainder found in the full message.
    Cause(&'a (dyn Error + 'static)),
}

type DetectFn = for<'a> fn(&'a (dyn Error + 'static)) -> Option<Shape<'a>>;

/// Recognises one concrete error type and reports its shape.
#[derive(Clone, Copy)]
pub struct Probe {
    name: &'static str,
    detect: DetectFn,
}

impl Probe {
    /// Probe for a type exposing ordered children.
    pub fn children<T: HasChildren + 'static>(name: &'static str) -> Self {
        Self {
            name,
            detect: detect_children::<T>,
        }
    }

    /// Probe for a type exposing a root cause.
    pub fn cause<T: HasCause + 'static>(name: &'static str) -> Self {
        Self {
            name,
            detect: detect_cause::<T>,
        }
    }

    /// Name used in trace output.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Runs the probe against an error.
    pub fn detect<'a>(&self, err: &'a (dyn Error + 'static)) -> Option<Shape<'a>> {
        (self.detect)(err)
    }

    /// Probes for the adapters shipped with this crate.
    pub fn builtin() -> Vec<Probe> {
        vec![
            Probe::children::<MultiError>("multi"),
            Probe::cause::<CausedError>("caused"),
        ]
    }
}

impl fmt::Debug for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Probe").field("name", &self.name).finish()
    }
}

fn detect_children<'a, T: HasChildren + 'static>(
    err: &'a (dyn Error + 'static),
) -> Option<Shape<'a>> {
    err.downcast_ref::<T>()
        .map(|joined| Shape::Children(joined.children()))
}

fn detect_cause<'a, T: HasCause + 'static>(err: &'a (dyn Error + 'static)) -> Option<Shape<'a>> {
    err.downcast_ref::<T>()
        .map(|caused| Shape::Cause(caused.root_cause()))
}

/// Several errors joined into one, in order.
#[derive(Debug, Default)]
pub struct MultiError {
    errors: Vec<BoxError>,
}

impl MultiError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error to the end of the list.
    pub fn push(&mut self, err: impl Into<BoxError>) {
        self.errors.push(err.into());
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Joins errors into a [`MultiError`].
pub fn join<I, E>(errors: I) -> MultiError
where
    I: IntoIterator<Item = E>,
    E: Into<BoxError>,
{
    MultiError {
        errors: errors.into_iter().map(Into::into).collect(),
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl Error for MultiError {}

impl HasChildren for MultiError {
    fn children(&self) -> Vec<&(dyn Error + 'static)> {
        self.errors
            .iter()
            .map(|err| &**err as &(dyn Error + 'static))
            .collect()
    }
}

/// A root cause plus a full message that embeds the cause's text.
///
/// Mirrors errors that append context to their cause as plain text, such as
/// `"timeout while connecting to host"` around a `"timeout"` cause.
#[derive(Debug)]
pub struct CausedError {
    cause: BoxError,
    message: String,
}

impl CausedError {
    /// Uses `message` verbatim as the full message.
    pub fn new(cause: impl Into<BoxError>, message: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
            message: message.into(),
        }
    }

    /// Builds the full message as `"<cause> <context>"`.
    pub fn with_context(cause: impl Into<BoxError>, context: impl fmt::Display) -> Self {
        let cause = cause.into();
        let message = format!("{cause} {context}");
        Self { cause, message }
    }
}

impl fmt::Display for CausedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for CausedError {}

impl HasCause for CausedError {
    fn root_cause(&self) -> &(dyn Error + 'static) {
        &*self.cause
    }
}
