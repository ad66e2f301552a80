//! Predicates
//!
//! `Eq<Int[]>` or `Tuple2<I, T1, T2>`: a contract applied to type arguments.

use super::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate {
    id: Id,
    types: Vec<Type>,
}

impl Predicate {
    pub fn new(id: impl Into<Id>, types: Vec<Type>) -> Predicate {
        Predicate {
            id: id.into(),
            types,
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }

    pub fn arity(&self) -> usize {
        self.types.len()
    }

    pub fn is_ground(&self) -> bool {
        self.types.iter().all(Type::is_ground)
    }

    /// Match `self` (a pattern) against `b`, position by position.
    ///
    /// Positions flagged in `skip` are left out when `b` has a variable
    /// there: those are associated outputs the caller wants filled in.
    pub fn match_predicate(&self, b: &Predicate, skip: &[bool]) -> Option<Vec<Substitution>> {
        if self.id != b.id || self.arity() != b.arity() {
            return None;
        }

        let mut s = Vec::new();

        for (i, (pattern, query)) in self.types.iter().zip(&b.types).enumerate() {
            if skip.get(i).copied().unwrap_or(false) && matches!(query, Type::Variable(_)) {
                continue;
            }

            s = Substitution::merge(&s, &pattern.matches(query)?)?;
        }

        Some(s)
    }

    /// Equality on every position, except associated ones (`skip`) that `b`
    /// leaves as a variable.
    pub fn agrees_with(&self, b: &Predicate, skip: &[bool]) -> bool {
        self.id == b.id
            && self.arity() == b.arity()
            && self
                .types
                .iter()
                .zip(&b.types)
                .enumerate()
                .all(|(i, (t, u))| {
                    t == u || (skip.get(i).copied().unwrap_or(false) && matches!(u, Type::Variable(_)))
                })
    }

    /// Only the positions not flagged as associated.
    pub fn inputs(&self, associated: &[bool]) -> Predicate {
        let types = self
            .types
            .iter()
            .enumerate()
            .filter(|(i, _)| !associated.get(*i).copied().unwrap_or(false))
            .map(|(_, t)| t.clone())
            .collect();

        Predicate::new(self.id.clone(), types)
    }

    /// Whether `self` strictly generalizes `b`: it matches `b` but `b`
    /// does not match it back.
    pub fn more_general_than(&self, b: &Predicate, skip: &[bool]) -> bool {
        self.match_predicate(b, skip).is_some() && b.match_predicate(self, skip).is_none()
    }

    /// Does a predicate of the same contract, already being resolved, show
    /// up inside this one? That's the shape of a requirement that keeps
    /// growing.
    pub fn embeds(&self, earlier: &Predicate) -> bool {
        self.id == earlier.id
            && self.arity() == earlier.arity()
            && self
                .types
                .iter()
                .zip(&earlier.types)
                .all(|(now, then)| now.embeds(then))
            && self.size() > earlier.size()
    }

    fn size(&self) -> usize {
        self.types.iter().map(Type::size).sum()
    }

    pub fn rename(&self, fresh: &mut impl FnMut(&TypeVariable) -> TypeVariable) -> Predicate {
        Predicate::new(
            self.id.clone(),
            self.types.iter().map(|t| t.rename(fresh)).collect(),
        )
    }
}

impl Types for Predicate {
    fn apply(&self, s: &[Substitution]) -> Self {
        Predicate::new(self.id.clone(), self.types.apply(s))
    }

    fn type_variables(&self) -> Vec<TypeVariable> {
        self.types.type_variables()
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}<", self.id)?;
        for (i, t) in self.types.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", t)?;
        }
        write!(f, ">")
    }
}
