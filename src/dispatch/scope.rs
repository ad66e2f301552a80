//! Witness Binder
//!
//! A [`Scope`] is the dictionary-passing view of a generic function body.
//! The function declares requirements over its own type parameters
//! (`where EqA : Eq<A>`); the caller resolves them in *its* scope and hands
//! the witnesses over. Inside, asking for `Eq<A>` returns the received
//! witness instead of resolving again, and anything that needs `Eq<A>`
//! further down (`Eq<A[]>`, or a nested generic call) is built from it.

use tracing::debug;

use super::resolve::Given;
use super::*;

#[derive(Debug, Clone)]
pub struct Scope<'r> {
    resolver: &'r Resolver,
    givens: Vec<Given>,
}

impl<'r> Scope<'r> {
    /// The outermost scope, where nothing has been received.
    pub fn root(resolver: &'r Resolver) -> Self {
        Scope {
            resolver,
            givens: Vec::new(),
        }
    }

    pub fn resolver(&self) -> &'r Resolver {
        self.resolver
    }

    /// A witness for `contract<types..>`, where `types` may mention this
    /// scope's type parameters.
    pub fn require(&self, contract: &str, types: Vec<Type>) -> Result<Witness> {
        self.require_predicate(&Predicate::new(contract, types))
    }

    pub fn require_predicate(&self, requirement: &Predicate) -> Result<Witness> {
        self.resolver.resolve_with(&self.givens, requirement, None)
    }

    /// Call into a generic operation with type parameters `params` and
    /// requirements `requirements` (written over `params`), instantiating
    /// the parameters with `args` from this scope. Each requirement is
    /// resolved here; the returned scope holds exactly those witnesses.
    pub fn enter(
        &self,
        params: &[&str],
        requirements: &[Predicate],
        args: &[Type],
    ) -> Result<Scope<'r>> {
        let s = bind_params(params, args)?;

        let givens = requirements
            .iter()
            .map(|formal| {
                Ok(Given {
                    formal: formal.clone(),
                    witness: self.require_predicate(&formal.apply(&s))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(received = givens.len(), "entered generic scope");

        Ok(Scope {
            resolver: self.resolver,
            givens,
        })
    }

    /// Like [`Scope::enter`], but with the witnesses chosen by the caller.
    /// Each one has to answer its instantiated requirement, directly or as
    /// a projection.
    pub fn enter_with(
        &self,
        params: &[&str],
        requirements: &[Predicate],
        args: &[Type],
        witnesses: Vec<Witness>,
    ) -> Result<Scope<'r>> {
        let s = bind_params(params, args)?;

        if requirements.len() != witnesses.len() {
            return Err(Error::ArityMismatch {
                what: "explicit witnesses".into(),
                expected: requirements.len(),
                found: witnesses.len(),
            });
        }

        let givens = requirements
            .iter()
            .zip(witnesses)
            .map(|(formal, witness)| {
                let actual = formal.apply(&s);
                witness
                    .project_to(&actual)
                    .map(|witness| Given {
                        formal: formal.clone(),
                        witness,
                    })
                    .ok_or(Error::NoInstance { requirement: actual })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Scope {
            resolver: self.resolver,
            givens,
        })
    }

    /// The witnesses this scope received, in the order they were declared.
    pub fn received(&self) -> impl Iterator<Item = (&Predicate, &Witness)> {
        self.givens.iter().map(|g| (&g.formal, &g.witness))
    }
}

fn bind_params(params: &[&str], args: &[Type]) -> Result<Vec<Substitution>> {
    if params.len() != args.len() {
        return Err(Error::ArityMismatch {
            what: "generic call".into(),
            expected: params.len(),
            found: args.len(),
        });
    }

    Ok(params
        .iter()
        .zip(args)
        .map(|(p, t)| Substitution::new(TypeVariable::new(*p, Kind::Star), t.clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::builtins::{boolean, int, make_array};
    use crate::dispatch::prelude;

    fn resolver() -> Resolver {
        prelude::standard().unwrap().seal(ResolverConfig::default())
    }

    fn over_a(contract: &str) -> Predicate {
        Predicate::new(contract, vec![Type::var("A")])
    }

    #[test]
    fn received_witnesses_are_forwarded() {
        let r = resolver();
        let root = Scope::root(&r);
        let callee = root.enter(&["A"], &[over_a("Eq")], &[int()]).unwrap();

        let outer = root.require("Eq", vec![int()]).unwrap();
        let inner = callee.require("Eq", vec![Type::var("A")]).unwrap();
        assert!(inner.same_instance(&outer));

        let (formal, _) = callee.received().next().unwrap();
        assert_eq!(formal.to_string(), "Eq<A>");
    }

    #[test]
    fn nested_requirements_use_received_witnesses() {
        let r = resolver();
        let root = Scope::root(&r);
        let callee = root.enter(&["A"], &[over_a("Eq")], &[int()]).unwrap();
        let (_, received) = callee.received().next().unwrap();

        let arrays = callee.require("Eq", vec![make_array(Type::var("A"))]).unwrap();
        assert_eq!(arrays.instance_name(), "EqArray");
        assert!(arrays.requirement(0).unwrap().same_instance(received));
    }

    #[test]
    fn received_subcontract_witnesses_answer_for_ancestors() {
        let r = resolver();
        let callee = Scope::root(&r)
            .enter(&["A"], &[over_a("Ord")], &[boolean()])
            .unwrap();

        let eq = callee.require("Eq", vec![Type::var("A")]).unwrap();
        assert_eq!(eq.predicate().to_string(), "Eq<Bool>");
        assert_eq!(eq.instance_name(), "OrdBool");
    }

    #[test]
    fn parameters_without_witnesses_stay_abstract() {
        let r = resolver();
        let callee = Scope::root(&r)
            .enter(&["A"], &[over_a("Eq")], &[int()])
            .unwrap();

        assert_eq!(
            callee.require("Num", vec![Type::var("A")]).unwrap_err().to_string(),
            "no instance of Num for A"
        );
    }

    #[test]
    fn two_received_witnesses_for_one_requirement_are_ambiguous() {
        let r = resolver();
        let all = r.resolve_named("All", "Monoid", vec![boolean()]).unwrap();
        let any = r.resolve_named("Any", "Monoid", vec![boolean()]).unwrap();

        let callee = Scope::root(&r)
            .enter_with(
                &["A"],
                &[over_a("Monoid"), over_a("Monoid")],
                &[boolean()],
                vec![all, any],
            )
            .unwrap();

        assert!(matches!(
            callee.require("Monoid", vec![Type::var("A")]),
            Err(Error::AmbiguousInstance { ref candidates, .. }) if candidates.len() == 2
        ));
    }

    #[test]
    fn received_subcontract_beats_received_ancestor() {
        let r = resolver();
        let min = r.resolve_named("Min", "Semigroup", vec![boolean()]).unwrap();
        let all = r.resolve_named("All", "Monoid", vec![boolean()]).unwrap();

        let callee = Scope::root(&r)
            .enter_with(
                &["A"],
                &[over_a("Semigroup"), over_a("Monoid")],
                &[boolean()],
                vec![min, all.clone()],
            )
            .unwrap();

        let semigroup = callee.require("Semigroup", vec![Type::var("A")]).unwrap();
        assert!(semigroup.same_instance(&all));
        assert_eq!(
            semigroup.invoke("Append", &[Value::Bool(true), Value::Bool(false)]),
            Ok(Value::Bool(false))
        );
    }

    #[test]
    fn explicit_witnesses_must_fit() {
        let r = resolver();
        let root = Scope::root(&r);
        let eq_int = r.resolve("Eq", vec![int()]).unwrap();

        assert!(matches!(
            root.enter_with(&["A"], &[over_a("Eq")], &[boolean()], vec![eq_int.clone()]),
            Err(Error::NoInstance { .. })
        ));
        assert!(matches!(
            root.enter_with(&["A"], &[over_a("Eq"), over_a("Ord")], &[int()], vec![eq_int.clone()]),
            Err(Error::ArityMismatch { expected: 2, found: 1, .. })
        ));
        assert!(matches!(
            root.enter(&["A", "B"], &[over_a("Eq")], &[int()]),
            Err(Error::ArityMismatch { expected: 2, found: 1, .. })
        ));

        // An Ord witness is accepted where Eq is asked for.
        let ord_int = r.resolve("Ord", vec![int()]).unwrap();
        let callee = root
            .enter_with(&["A"], &[over_a("Eq")], &[int()], vec![ord_int])
            .unwrap();
        let (_, received) = callee.received().next().unwrap();
        assert_eq!(received.predicate().to_string(), "Eq<Int>");
    }
}
