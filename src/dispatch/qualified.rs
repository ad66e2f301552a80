use super::*;

#[derive(Debug, Clone, PartialEq)]
pub enum Qualified<T> {
    // This is the `:=>` constructor from the paper: the requirements on the
    // left have to hold for the thing on the right. For an instance it's the
    // `where EqA : Eq<A>` part.
    Then(Vec<Predicate>, T),
}

impl<T: Clone> Qualified<T> {
    pub fn then(pred: &[Predicate], t: T) -> Qualified<T> {
        Qualified::Then(pred.into(), t)
    }

    pub fn premises(&self) -> &[Predicate] {
        let Qualified::Then(ps, _) = self;
        ps
    }

    pub fn consequence(&self) -> &T {
        let Qualified::Then(_, q) = self;
        q
    }
}

impl<T> Types for Qualified<T>
where
    T: Types,
{
    fn apply(&self, s: &[Substitution]) -> Self {
        let Qualified::Then(ps, t) = self;
        Qualified::Then(ps.apply(s), t.apply(s))
    }

    fn type_variables(&self) -> Vec<TypeVariable> {
        let Qualified::Then(ps, t) = self;
        union(&ps.type_variables(), &t.type_variables())
    }
}

impl Qualified<Predicate> {
    /// The same scheme with every variable replaced by a fresh one.
    pub fn rename(&self, fresh: &mut impl FnMut(&TypeVariable) -> TypeVariable) -> Self {
        let Qualified::Then(ps, p) = self;
        Qualified::Then(
            ps.iter().map(|q| q.rename(fresh)).collect(),
            p.rename(fresh),
        )
    }
}

impl std::fmt::Display for Qualified<Predicate> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Qualified::Then(ps, p) = self;
        if ps.is_empty() {
            return write!(f, "{}", p);
        }
        for (i, q) in ps.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", q)?;
        }
        write!(f, " => {}", p)
    }
}
