//! Substitutions

use super::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Substitution {
    pub(crate) from: TypeVariable,
    pub(crate) to: Type,
}

impl Substitution {
    pub fn new(from: TypeVariable, to: Type) -> Substitution {
        Substitution { from, to }
    }

    pub fn from(&self) -> &TypeVariable {
        &self.from
    }

    pub fn to(&self) -> &Type {
        &self.to
    }

    /// Composition: applying the result is the same as applying `s2` and
    /// then `s1`.
    pub fn at_at(s1: &[Substitution], s2: &[Substitution]) -> Vec<Substitution> {
        let mut substitutions: Vec<Substitution> = s2
            .iter()
            .map(|s| Substitution::new(s.from.clone(), s.to.apply(s1)))
            .collect();

        substitutions.extend(s1.iter().cloned());

        substitutions
    }

    /// Parallel union of two substitutions, which only exists if they agree
    /// on every variable they both bind.
    pub fn merge(s1: &[Substitution], s2: &[Substitution]) -> Option<Vec<Substitution>> {
        let s1_vars: Vec<_> = s1.iter().map(|s| s.from.clone()).collect();
        let s2_vars: Vec<_> = s2.iter().map(|s| s.from.clone()).collect();

        for v in intersection(&s1_vars, &s2_vars) {
            if Type::Variable(v.clone()).apply(s1) != Type::Variable(v).apply(s2) {
                return None;
            }
        }

        Some(union(s1, s2))
    }
}
