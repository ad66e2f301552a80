//! Witnesses
//!
//! A witness is an instance whose requirements have all been resolved: a
//! closed dictionary, ready to call. It can be looked at through the
//! contract it was resolved for or through any of that contract's
//! ancestors; an `Ord<Int>` witness is also an `Eq<Int>` witness.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::trace;

use super::*;

/// An operation body. It gets the witness it was invoked through, seen as
/// the instance's own contract, so it can call sibling operations and reach
/// the witnesses for the instance's requirements.
pub type OperationBody =
    Arc<dyn Fn(&Witness, &[Value]) -> std::result::Result<Value, InvokeError> + Send + Sync>;

/// Wrap a closure as an [`OperationBody`].
pub fn operation<F>(f: F) -> OperationBody
where
    F: Fn(&Witness, &[Value]) -> std::result::Result<Value, InvokeError> + Send + Sync + 'static,
{
    Arc::new(f)
}

#[derive(Clone)]
pub(crate) struct Method {
    pub(crate) arity: usize,
    pub(crate) body: OperationBody,
}

#[derive(Debug)]
struct View {
    predicate: Predicate,
    operations: Arc<[Id]>,
    associated: Vec<bool>,
}

struct Evidence {
    instance: InstanceId,
    name: Id,
    methods: Arc<FxHashMap<Id, Method>>,
    requirements: Vec<Witness>,
    // The instance's own contract first, then every ancestor.
    views: Vec<View>,
}

#[derive(Clone)]
pub struct Witness {
    evidence: Arc<Evidence>,
    view: usize,
}

impl Witness {
    pub(crate) fn new(
        registry: &CapabilityRegistry,
        entry: &InstanceEntry,
        head: Predicate,
        requirements: Vec<Witness>,
    ) -> Witness {
        let views = registry
            .by_super_class(&head)
            .into_iter()
            .map(|(contract, predicate)| {
                let descriptor = registry.descriptor(contract);
                View {
                    predicate,
                    operations: descriptor.visible_names.clone(),
                    associated: descriptor.associated_mask(),
                }
            })
            .collect();

        Witness {
            evidence: Arc::new(Evidence {
                instance: entry.id(),
                name: entry.name().clone(),
                methods: entry.methods.clone(),
                requirements,
                views,
            }),
            view: 0,
        }
    }

    /// The predicate this witness answers for, associated outputs included.
    pub fn predicate(&self) -> &Predicate {
        &self.evidence.views[self.view].predicate
    }

    /// The fully instantiated head of the selected instance. Differs from
    /// [`Witness::predicate`] when this is a projection.
    pub fn head(&self) -> &Predicate {
        &self.evidence.views[0].predicate
    }

    pub fn instance(&self) -> InstanceId {
        self.evidence.instance
    }

    pub fn instance_name(&self) -> &Id {
        &self.evidence.name
    }

    /// The types the instance decided for the contract's associated
    /// parameters, in order.
    pub fn associated(&self) -> Vec<&Type> {
        let view = &self.evidence.views[self.view];
        view.predicate
            .types()
            .iter()
            .zip(&view.associated)
            .filter_map(|(t, assoc)| assoc.then_some(t))
            .collect()
    }

    pub fn operations(&self) -> &[Id] {
        &self.evidence.views[self.view].operations
    }

    /// Witnesses for the instance's requirements, in declaration order.
    pub fn requirements(&self) -> &[Witness] {
        &self.evidence.requirements
    }

    pub fn requirement(&self, index: usize) -> std::result::Result<&Witness, InvokeError> {
        self.evidence
            .requirements
            .get(index)
            .ok_or_else(|| InvokeError::MissingRequirement {
                instance: self.evidence.name.clone(),
                requirement: format!("#{}", index),
            })
    }

    /// The first requirement witness whose contract is `contract`.
    pub fn requirement_for(&self, contract: &str) -> std::result::Result<&Witness, InvokeError> {
        self.evidence
            .requirements
            .iter()
            .find(|w| w.predicate().id() == contract)
            .ok_or_else(|| InvokeError::MissingRequirement {
                instance: self.evidence.name.clone(),
                requirement: contract.into(),
            })
    }

    /// View this witness as an ancestor contract, e.g. the `Eq` part of an
    /// `Ord` witness. `None` if `contract` isn't this one or an ancestor.
    pub fn project(&self, contract: &str) -> Option<Witness> {
        self.evidence
            .views
            .iter()
            .position(|v| v.predicate.id() == contract)
            .map(|view| self.with_view(view))
    }

    /// Like [`Witness::project`], but for one exact predicate.
    pub fn project_to(&self, p: &Predicate) -> Option<Witness> {
        self.evidence
            .views
            .iter()
            .position(|v| &v.predicate == p)
            .map(|view| self.with_view(view))
    }

    /// Both witnesses are views of the same resolved dictionary.
    pub fn same_instance(&self, other: &Witness) -> bool {
        Arc::ptr_eq(&self.evidence, &other.evidence)
    }

    pub fn invoke(&self, operation: &str, args: &[Value]) -> std::result::Result<Value, InvokeError> {
        let unknown = || InvokeError::UnknownOperation {
            view: self.predicate().clone(),
            operation: operation.into(),
        };

        if !self.operations().iter().any(|op| op == operation) {
            return Err(unknown());
        }

        let method = self.evidence.methods.get(operation).ok_or_else(unknown)?;

        if method.arity != args.len() {
            return Err(InvokeError::Arity {
                operation: operation.into(),
                expected: method.arity,
                found: args.len(),
            });
        }

        trace!(instance = %self.evidence.name, operation, "invoke");

        // Bodies always see the whole dictionary, so a default reached
        // through a projection still finds the instance's overrides.
        (method.body)(&self.with_view(0), args)
    }

    fn with_view(&self, view: usize) -> Witness {
        Witness {
            evidence: self.evidence.clone(),
            view,
        }
    }
}

impl std::fmt::Debug for Witness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Witness")
            .field("instance", &self.evidence.name)
            .field("predicate", &self.predicate().to_string())
            .field("requirements", &self.evidence.requirements)
            .finish()
    }
}

impl std::fmt::Display for Witness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.evidence.name)?;
        if !self.evidence.requirements.is_empty() {
            write!(f, "(")?;
            for (i, w) in self.evidence.requirements.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", w)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::builtins::{boolean, int, make_pair};
    use crate::dispatch::prelude;

    fn resolver() -> Resolver {
        prelude::standard().unwrap().seal(ResolverConfig::default())
    }

    #[test]
    fn projections_narrow_the_visible_operations() {
        let r = resolver();
        let ord = r.resolve("Ord", vec![int()]).unwrap();
        let eq = ord.project("Eq").unwrap();

        assert!(eq.same_instance(&ord));
        assert_eq!(eq.predicate().to_string(), "Eq<Int>");
        assert_eq!(eq.head().to_string(), "Ord<Int>");
        assert!(ord.operations().iter().any(|op| op == "Leq"));
        assert!(!eq.operations().iter().any(|op| op == "Leq"));
        assert!(ord.project("Num").is_none());

        let args = [Value::Int(1), Value::Int(2)];
        assert_eq!(eq.invoke("Equals", &args), Ok(Value::Bool(false)));
        assert!(matches!(
            eq.invoke("Leq", &args),
            Err(InvokeError::UnknownOperation { .. })
        ));
        assert_eq!(ord.invoke("Leq", &args), Ok(Value::Bool(true)));
    }

    #[test]
    fn argument_counts_are_checked() {
        let r = resolver();
        let eq = r.resolve("Eq", vec![boolean()]).unwrap();
        assert_eq!(
            eq.invoke("Equals", &[Value::Bool(true)]),
            Err(InvokeError::Arity {
                operation: "Equals".into(),
                expected: 2,
                found: 1,
            })
        );
        assert!(matches!(
            eq.invoke("Equals", &[Value::Int(1), Value::Bool(true)]),
            Err(InvokeError::TypeMismatch { expected: "bool", .. })
        ));
    }

    #[test]
    fn associated_types_are_decided_by_the_instance() {
        let r = resolver();
        let w = r
            .resolve(
                "Tuple2",
                vec![make_pair(int(), boolean()), Type::var("X"), Type::var("Y")],
            )
            .unwrap();

        assert_eq!(w.instance_name(), "Tuple2Pair");
        assert_eq!(w.associated(), vec![&int(), &boolean()]);
        assert_eq!(w.predicate().to_string(), "Tuple2<(Int, Bool), Int, Bool>");
    }

    #[test]
    fn requirement_witnesses_are_reachable() {
        let r = resolver();
        let show = r.resolve("Show", vec![make_pair(int(), boolean())]).unwrap();

        assert_eq!(show.to_string(), "ShowTuple2(Tuple2Pair, ShowInt, ShowBool)");
        assert_eq!(show.requirements().len(), 3);
        assert_eq!(show.requirement_for("Tuple2").unwrap().instance_name(), "Tuple2Pair");
        assert_eq!(show.requirement(2).unwrap().predicate().to_string(), "Show<Bool>");
        assert!(matches!(
            show.requirement(3),
            Err(InvokeError::MissingRequirement { .. })
        ));
    }
}
