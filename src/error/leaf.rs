use std::fmt;

/// An irreducible error message.
///
/// Leaves are what remains once an error has been decomposed as far as its
/// structure and text allow. Two leaves are the same error when their messages
/// are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Leaf {
    message: String,
}

impl Leaf {
    /// Creates a leaf holding the given message verbatim.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The leaf's message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Leaf {}

impl From<String> for Leaf {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for Leaf {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_leaf_display_is_message() {
        let leaf = Leaf::new("disk full");
        assert_eq!(leaf.to_string(), "disk full");
        assert_eq!(leaf.message(), "disk full");
        assert!(leaf.source().is_none());
    }

    #[test]
    fn test_leaf_equality_by_message() {
        assert_eq!(Leaf::from("a"), Leaf::from("a".to_string()));
        assert_ne!(Leaf::from("a"), Leaf::from("b"));
    }
}
