//! The canonical error container

use std::collections::HashSet;
use std::error::Error;
use std::fmt;

use tracing::debug;

use super::kind::combine_opt;
use super::probe::{BoxError, HasChildren};
use super::{Attr, Classifier, ErrKind, Leaf};

/// An error reduced to its kind, its irreducible leaves and its attributes.
///
/// Leaves are unique by message and kept in discovery order. Both the number of
/// leaves and the number of attributes are capped by the classifier's
/// `max_depth`; anything past the cap is dropped.
#[derive(Clone)]
pub struct ErrorX {
    kind: Option<ErrKind>,
    attrs: Vec<Attr>,
    errs: Vec<Leaf>,
    uniq: HashSet<String>,
    classifier: Classifier,
}

impl ErrorX {
    /// Creates an error holding exactly one leaf, using the default settings.
    pub fn new(message: impl fmt::Display) -> Self {
        Self::new_in(Classifier::shared().clone(), message)
    }

    /// Creates an error holding exactly one leaf, using `classifier`'s settings.
    pub fn new_in(classifier: Classifier, message: impl fmt::Display) -> Self {
        let mut x = Self::empty(classifier);
        x.push_leaf(Leaf::new(message.to_string()));
        x
    }

    pub(crate) fn empty(classifier: Classifier) -> Self {
        Self {
            kind: None,
            attrs: Vec::new(),
            errs: Vec::new(),
            uniq: HashSet::new(),
            classifier,
        }
    }

    /// Appends a message as a new leaf.
    pub fn msg(&mut self, message: impl fmt::Display) -> &mut Self {
        self.push_leaf(Leaf::new(message.to_string()));
        self
    }

    /// Sets the kind, merging with any kind already present.
    pub fn set_kind(&mut self, kind: ErrKind) -> &mut Self {
        self.kind = combine_opt(self.kind, Some(kind));
        self
    }

    /// Adds attributes whose keys are not present yet, up to the depth bound.
    pub fn set_attrs(&mut self, attrs: impl IntoIterator<Item = Attr>) -> &mut Self {
        for attr in attrs {
            self.push_attr(attr);
        }
        self
    }

    /// Consuming form of [`ErrorX::set_kind`].
    pub fn with_kind(mut self, kind: ErrKind) -> Self {
        self.set_kind(kind);
        self
    }

    /// Consuming form of [`ErrorX::set_attrs`] for a single attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.push_attr(Attr::new(key, value));
        self
    }

    /// The leaves, in order.
    pub fn errors(&self) -> &[Leaf] {
        &self.errs
    }

    /// The attributes, in insertion order.
    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    /// The kind, or `Unknown` when none was set.
    pub fn kind(&self) -> ErrKind {
        self.kind.unwrap_or_default()
    }

    /// The kind exactly as set, `None` when never set.
    pub fn raw_kind(&self) -> Option<ErrKind> {
        self.kind
    }

    /// The first leaf: the origin of the chain.
    pub fn cause(&self) -> Option<&Leaf> {
        self.errs.first()
    }

    /// The classifier whose settings govern this error.
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Returns true when `other`, classified on its own, shares a leaf with `self`.
    pub fn matches(&self, other: &(dyn Error + 'static)) -> bool {
        let other = self.classifier.classify(other);
        self.errs
            .iter()
            .any(|orig| other.errs.iter().any(|candidate| orig == candidate))
    }

    /// Returns true when the kind is `kind`.
    pub fn is_kind(&self, kind: ErrKind) -> bool {
        self.kind() == kind
    }

    /// Boxes the error for use where a trait object is expected.
    pub fn build(self) -> BoxError {
        Box::new(self)
    }

    pub(crate) fn is_full(&self) -> bool {
        self.errs.len() >= self.classifier.max_depth()
    }

    /// Pushes trimmed text as a leaf, ignoring empty text.
    pub(crate) fn push_text(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            self.push_leaf(Leaf::new(text));
        }
    }

    pub(crate) fn push_leaf(&mut self, leaf: Leaf) {
        if self.uniq.contains(leaf.message()) {
            return;
        }
        if self.is_full() {
            debug!(
                dropped = leaf.message(),
                max_depth = self.classifier.max_depth(),
                "error depth bound reached; dropping leaf"
            );
            return;
        }
        self.uniq.insert(leaf.message().to_string());
        self.errs.push(leaf);
    }

    fn push_attr(&mut self, attr: Attr) {
        if self.attrs.iter().any(|a| a.key() == attr.key()) {
            return;
        }
        if self.attrs.len() >= self.classifier.max_depth() {
            debug!(
                dropped = attr.key(),
                max_depth = self.classifier.max_depth(),
                "error depth bound reached; dropping attribute"
            );
            return;
        }
        self.attrs.push(attr);
    }

    /// Merges another canonical error into this one without re-splitting its leaves.
    pub(crate) fn absorb(&mut self, other: &ErrorX) {
        for leaf in &other.errs {
            self.push_leaf(leaf.clone());
        }
        self.kind = combine_opt(self.kind, other.kind);
        for attr in &other.attrs {
            self.push_attr(attr.clone());
        }
    }
}

impl fmt::Debug for ErrorX {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorX")
            .field("kind", &self.kind)
            .field("attrs", &self.attrs)
            .field("errs", &self.errs)
            .finish()
    }
}

impl PartialEq for ErrorX {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.errs == other.errs && self.attrs == other.attrs
    }
}

impl Error for ErrorX {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause().map(|leaf| leaf as &(dyn Error + 'static))
    }
}

impl HasChildren for ErrorX {
    fn children(&self) -> Vec<&(dyn Error + 'static)> {
        self.errs
            .iter()
            .map(|leaf| leaf as &(dyn Error + 'static))
            .collect()
    }
}

/// Mutators that are no-ops when no error is present.
pub trait OptionErrorXExt {
    /// Appends a message if an error is present.
    fn msg(&mut self, message: impl fmt::Display);

    /// Sets the kind if an error is present.
    fn set_kind(&mut self, kind: ErrKind);

    /// Adds attributes if an error is present.
    fn set_attrs(&mut self, attrs: impl IntoIterator<Item = Attr>);
}

impl OptionErrorXExt for Option<ErrorX> {
    fn msg(&mut self, message: impl fmt::Display) {
        if let Some(x) = self {
            x.msg(message);
        }
    }

    fn set_kind(&mut self, kind: ErrKind) {
        if let Some(x) = self {
            x.set_kind(kind);
        }
    }

    fn set_attrs(&mut self, attrs: impl IntoIterator<Item = Attr>) {
        if let Some(x) = self {
            x.set_attrs(attrs);
        }
    }
}

/// Creates an [`ErrorX`] from a format string, like `format!`.
#[macro_export]
macro_rules! errorx {
    ($($arg:tt)*) => {
        $crate::ErrorX::new(::std::format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    fn leaves(x: &ErrorX) -> Vec<&str> {
        x.errors().iter().map(|leaf| leaf.message()).collect()
    }

    #[test]
    fn test_new_has_one_leaf_and_no_kind() {
        let x = ErrorX::new("failed to open file");
        assert_eq!(leaves(&x), vec!["failed to open file"]);
        assert_eq!(x.raw_kind(), None);
        assert_eq!(x.kind(), ErrKind::Unknown);
        assert!(x.attrs().is_empty());
    }

    #[test]
    fn test_new_keeps_text_verbatim() {
        let x = ErrorX::new("a <- b");
        assert_eq!(leaves(&x), vec!["a <- b"]);
    }

    #[test]
    fn test_errorx_macro() {
        let x = crate::errorx!("port {} closed", 8080);
        assert_eq!(leaves(&x), vec!["port 8080 closed"]);
    }

    #[test]
    fn test_msg_dedups() {
        let mut x = ErrorX::new("first");
        x.msg("second").msg("second").msg("first");
        assert_eq!(leaves(&x), vec!["first", "second"]);
    }

    #[test]
    fn test_msg_respects_depth_bound() {
        let mut x = ErrorX::new("1");
        x.msg("2").msg("3").msg("4");
        assert_eq!(leaves(&x), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_set_kind_adopts_then_combines() {
        let mut x = ErrorX::new("e");
        x.set_kind(ErrKind::NetworkPermanent);
        assert_eq!(x.kind(), ErrKind::NetworkPermanent);
        x.set_kind(ErrKind::NetworkTemporary);
        assert_eq!(x.kind(), ErrKind::NetworkPermanent);
        x.set_kind(ErrKind::Deadline);
        assert_eq!(x.kind(), ErrKind::Deadline);
    }

    #[test]
    fn test_set_kind_unknown_is_recorded() {
        let mut x = ErrorX::new("e");
        x.set_kind(ErrKind::Unknown);
        assert_eq!(x.raw_kind(), Some(ErrKind::Unknown));
    }

    #[test]
    fn test_set_attrs_first_key_wins() {
        let mut x = ErrorX::new("e");
        x.set_attrs([Attr::new("k", 1), Attr::new("k", 2)]);
        assert_eq!(x.attrs().len(), 1);
        assert_eq!(x.attrs()[0].value(), &serde_json::Value::from(1));
    }

    #[test]
    fn test_set_attrs_bounded() {
        let mut x = ErrorX::new("e");
        x.set_attrs((0..10).map(|i| Attr::new(format!("k{i}"), i)));
        let keys: Vec<&str> = x.attrs().iter().map(|a| a.key()).collect();
        assert_eq!(keys, vec!["k0", "k1", "k2"]);
    }

    #[test]
    fn test_with_builders() {
        let x = ErrorX::new("e")
            .with_kind(ErrKind::Logic)
            .with_attr("step", "render");
        assert!(x.is_kind(ErrKind::Logic));
        assert_eq!(x.attrs()[0].key(), "step");
    }

    #[test]
    fn test_cause_is_first_leaf() {
        let mut x = ErrorX::new("root");
        x.msg("context");
        assert_eq!(x.cause().map(Leaf::message), Some("root"));
        assert_eq!(x.source().map(|s| s.to_string()), Some("root".to_string()));
    }

    #[test]
    fn test_cause_absent_when_empty() {
        let x = ErrorX::empty(Classifier::default());
        assert!(x.cause().is_none());
        assert!(x.source().is_none());
    }

    #[test]
    fn test_matches_shares_a_leaf() {
        let x = ErrorX::new("disk full");
        assert!(x.matches(&Leaf::new("disk full <- write failed")));
        assert!(x.matches(&Leaf::new("disk full")));
        assert!(!x.matches(&Leaf::new("disk almost full")));
    }

    #[test]
    fn test_matches_other_errorx() {
        let mut a = ErrorX::new("timeout");
        a.msg("fetch page");
        let b = ErrorX::new("fetch page");
        assert!(a.matches(&b));
        assert!(b.matches(&a));
    }

    #[test]
    fn test_option_ext_noop_on_none() {
        let mut none: Option<ErrorX> = None;
        none.msg("ignored");
        none.set_kind(ErrKind::Logic);
        none.set_attrs([Attr::new("k", 1)]);
        assert!(none.is_none());

        let mut some = Some(ErrorX::new("a"));
        some.msg("b");
        some.set_kind(ErrKind::Logic);
        let x = some.unwrap();
        assert_eq!(leaves(&x), vec!["a", "b"]);
        assert_eq!(x.kind(), ErrKind::Logic);
    }

    #[test]
    fn test_custom_classifier_bound() {
        let classifier = Classifier::new(Settings::new().with_max_depth(1));
        let mut x = ErrorX::new_in(classifier, "only");
        x.msg("dropped");
        x.set_attrs([Attr::new("a", 1), Attr::new("b", 2)]);
        assert_eq!(leaves(&x), vec!["only"]);
        assert_eq!(x.attrs().len(), 1);
    }

    #[test]
    fn test_absorb_merges_everything() {
        let mut target = ErrorX::new("a").with_kind(ErrKind::NetworkTemporary);
        let other = ErrorX::new("b")
            .with_kind(ErrKind::NetworkPermanent)
            .with_attr("host", "example.com");
        target.absorb(&other);
        assert_eq!(leaves(&target), vec!["a", "b"]);
        assert_eq!(target.kind(), ErrKind::NetworkPermanent);
        assert_eq!(target.attrs().len(), 1);
    }

    #[test]
    fn test_children_are_leaves() {
        let mut x = ErrorX::new("a");
        x.msg("b");
        let children: Vec<String> = x.children().iter().map(|c| c.to_string()).collect();
        assert_eq!(children, vec!["a", "b"]);
    }

    #[test]
    fn test_build_boxes_and_downcasts() {
        let boxed = ErrorX::new("boxed").build();
        let back = boxed.downcast_ref::<ErrorX>().unwrap();
        assert_eq!(leaves(back), vec!["boxed"]);
    }
}
