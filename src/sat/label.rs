//! Labels: structured keys that name allocated variables

use serde::Serialize;
use std::fmt;

/// One component of a label
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Key {
    /// Free-form name, e.g. a puzzle axis value or a region name
    Name(String),
    /// Integer index, e.g. a layer number or a grid coordinate
    Index(i64),
    /// Grid cell
    Point(i64, i64),
    /// Fixed role tag used by the encoders (`layer`, `summary`, ...)
    Role(&'static str),
}

impl Key {
    pub fn name(&self) -> Option<&str> {
        match self {
            Key::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn index(&self) -> Option<i64> {
        match self {
            Key::Index(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => write!(f, "{}", name),
            Key::Index(i) => write!(f, "{}", i),
            Key::Point(x, y) => write!(f, "({},{})", x, y),
            Key::Role(role) => write!(f, "#{}", role),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Key::Name(name.clone())
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Index(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Index(i as i64)
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i as i64)
    }
}

impl From<(i64, i64)> for Key {
    fn from((x, y): (i64, i64)) -> Self {
        Key::Point(x, y)
    }
}

impl From<(i32, i32)> for Key {
    fn from((x, y): (i32, i32)) -> Self {
        Key::Point(x as i64, y as i64)
    }
}

impl From<(usize, usize)> for Key {
    fn from((x, y): (usize, usize)) -> Self {
        Key::Point(x as i64, y as i64)
    }
}

/// Ordered tuple of keys; the unit of variable allocation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Label(Vec<Key>);

impl Label {
    pub fn new(keys: Vec<Key>) -> Self {
        Label(keys)
    }

    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Same keys sorted, for labels whose component order carries no meaning
    pub fn unordered(mut self) -> Self {
        self.0.sort();
        self
    }

    /// Extend with one more component
    pub fn with(mut self, key: impl Into<Key>) -> Self {
        self.0.push(key.into());
        self
    }

    /// Whether this label starts with every key of `prefix`
    pub fn starts_with(&self, prefix: &[Key]) -> bool {
        self.0.starts_with(prefix)
    }
}

impl From<Vec<Key>> for Label {
    fn from(keys: Vec<Key>) -> Self {
        Label(keys)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", key)?;
        }
        write!(f, ")")
    }
}

/// Build a [`Label`] from anything convertible into [`Key`]s.
///
/// ```
/// use puzzle_cnf::label;
/// let l = label!("base", 3, 4);
/// assert_eq!(l.to_string(), "(base 3 4)");
/// ```
#[macro_export]
macro_rules! label {
    ($($part:expr),* $(,)?) => {
        $crate::sat::Label::new(vec![$($crate::sat::Key::from($part)),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_macro_and_display() {
        let l = label!("wall", Key::Role("summary"), (2i64, 3i64), 4);
        assert_eq!(l.to_string(), "(wall #summary (2,3) 4)");
        assert_eq!(l.len(), 4);
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(label!("base", 1, 2), label!("base", 1i64, 2usize));
        assert_ne!(label!("base", 1, 2), label!("base", 2, 1));
        assert_ne!(label!("1"), label!(1));
    }

    #[test]
    fn test_unordered_sorts_components() {
        assert_eq!(label!("b", "a").unordered(), label!("a", "b").unordered());
        assert_eq!(label!("b", "a").unordered(), label!("a", "b"));
    }

    #[test]
    fn test_with_and_prefix() {
        let l = label!("stream").with(Key::Role("layer")).with(2);
        assert!(l.starts_with(&[Key::from("stream"), Key::Role("layer")]));
        assert_eq!(l.keys()[2].index(), Some(2));
        assert_eq!(l.keys()[0].name(), Some("stream"));
    }
}
