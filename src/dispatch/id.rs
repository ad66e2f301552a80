//! Names of things

use std::borrow::Borrow;
use std::sync::Arc;

// Not interned, but cloning is a refcount bump and the witnesses that carry
// these across threads need `Send + Sync`.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub struct Id {
    name: Arc<str>,
}

impl Id {
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Names made from numbers can't be written as identifiers, so they never
    /// collide with a user's type variables.
    pub fn is_generated(&self) -> bool {
        self.name.starts_with('\'')
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id { name: Arc::from(s) }
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id { name: Arc::from(s) }
    }
}

impl From<&Id> for Id {
    fn from(id: &Id) -> Self {
        id.clone()
    }
}

impl From<usize> for Id {
    fn from(i: usize) -> Self {
        Id {
            name: Arc::from(format!("'t{i}")),
        }
    }
}

impl Borrow<str> for Id {
    fn borrow(&self) -> &str {
        &self.name
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        &*self.name == other
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        &*self.name == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_are_marked() {
        let fresh = Id::from(3);
        assert_eq!(fresh.as_str(), "'t3");
        assert!(fresh.is_generated());
        assert!(!Id::from("a").is_generated());
    }

    #[test]
    fn lookup_by_str() {
        let mut map = rustc_hash::FxHashMap::default();
        map.insert(Id::from("Eq"), 1);
        assert_eq!(map.get("Eq"), Some(&1));
        assert_eq!(Id::from("Ord"), "Ord");
    }
}
