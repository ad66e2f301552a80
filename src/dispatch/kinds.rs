//! Kinds
//!
//! Only used to keep matching honest: `[]` can't stand in for `Int`.

pub trait HasKind {
    fn kind(&self) -> &Kind;
}

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum Kind {
    Star,
    Function(Box<Kind>, Box<Kind>),
}

impl Kind {
    // Same as the [`Kind::Function`] constructor, but it does the boxing.
    pub fn function(lhs: Kind, rhs: Kind) -> Kind {
        Kind::Function(Box::new(lhs), Box::new(rhs))
    }

    /// The kind of a constructor taking `arity` proper types, e.g.
    /// `* -> * -> *` for pairs.
    pub fn constructor(arity: usize) -> Kind {
        (0..arity).fold(Kind::Star, |k, _| Kind::function(Kind::Star, k))
    }

    /// What's left after applying something of this kind to one argument.
    pub fn result(&self) -> Option<&Kind> {
        match self {
            Kind::Function(_, k) => Some(k),
            Kind::Star => None,
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Star => write!(f, "*"),
            Kind::Function(from, to) => write!(f, "({} -> {})", from, to),
        }
    }
}
