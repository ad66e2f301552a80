//! Instance Table
//!
//! Instances are stored the way the paper stores them, as qualified
//! predicates (`Eq<A> => Eq<A[]>`), together with the dictionary of
//! operation bodies that makes them usable. Defaults are filled in at
//! registration, so every stored dictionary is complete.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use super::witness::Method;
use super::*;

/// Index of a registered instance in its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(pub(crate) usize);

/// What a client hands to [`InstanceTable::register_instance`].
#[derive(Clone)]
pub struct InstanceDecl {
    name: Id,
    types: Vec<Type>,
    requirements: Vec<Predicate>,
    methods: Vec<(Id, OperationBody)>,
}

impl InstanceDecl {
    /// An instance called `name` for the type pattern `types`, one per
    /// contract parameter.
    pub fn new(name: impl Into<Id>, types: Vec<Type>) -> Self {
        InstanceDecl {
            name: name.into(),
            types,
            requirements: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// `where Req : contract<types..>`
    pub fn requires(mut self, contract: impl Into<Id>, types: Vec<Type>) -> Self {
        self.requirements.push(Predicate::new(contract, types));
        self
    }

    pub fn method(mut self, name: impl Into<Id>, body: OperationBody) -> Self {
        self.methods.push((name.into(), body));
        self
    }

    pub fn name(&self) -> &Id {
        &self.name
    }
}

impl std::fmt::Debug for InstanceDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceDecl")
            .field("name", &self.name)
            .field("types", &self.types)
            .field("requirements", &self.requirements)
            .field(
                "methods",
                &self.methods.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .finish()
    }
}

pub struct InstanceEntry {
    id: InstanceId,
    name: Id,
    contract: ContractId,
    scheme: Qualified<Predicate>,
    pub(crate) methods: Arc<FxHashMap<Id, Method>>,
}

impl InstanceEntry {
    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn name(&self) -> &Id {
        &self.name
    }

    pub fn contract(&self) -> ContractId {
        self.contract
    }

    pub fn scheme(&self) -> &Qualified<Predicate> {
        &self.scheme
    }
}

impl std::fmt::Debug for InstanceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceEntry")
            .field("name", &self.name)
            .field("scheme", &self.scheme.to_string())
            .finish()
    }
}

/// An instance that matches a requirement, freshly renamed so its variables
/// can't collide with anything else in the same resolution.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub instance: InstanceId,
    /// The instance's own contract, which may be a subcontract of the one
    /// asked for.
    pub contract: ContractId,
    pub scheme: Qualified<Predicate>,
    /// The instance head seen as the requested contract.
    pub projected: Predicate,
    pub substitution: Vec<Substitution>,
}

#[derive(Debug, Default)]
pub struct InstanceTable {
    entries: Vec<InstanceEntry>,
}

impl InstanceTable {
    pub fn register_instance(
        &mut self,
        registry: &CapabilityRegistry,
        contract: ContractId,
        decl: InstanceDecl,
    ) -> Result<InstanceId> {
        let descriptor = registry.contract(contract)?;

        if decl.types.len() != descriptor.arity() {
            return Err(Error::ArityMismatch {
                what: descriptor.name.clone(),
                expected: descriptor.arity(),
                found: decl.types.len(),
            });
        }

        for requirement in &decl.requirements {
            if registry.find(requirement).is_some() {
                continue;
            }

            let reason = if registry.is_interface(requirement.id(), requirement.arity()) {
                "that is an interface, not a contract"
            } else {
                "no such contract is declared"
            };

            return Err(Error::NonConceptConstraint {
                instance: decl.name.clone(),
                constraint: requirement.clone(),
                reason,
            });
        }

        let mut given: FxHashMap<Id, OperationBody> = FxHashMap::default();
        for (name, body) in decl.methods {
            if descriptor.operation(name.as_str()).is_none() {
                return Err(Error::UnknownOperation {
                    contract: descriptor.name.clone(),
                    operation: name,
                });
            }

            if given.insert(name.clone(), body).is_some() {
                return Err(Error::OperationConflict {
                    contract: descriptor.name.clone(),
                    operation: name,
                    reason: format!("defined more than once by {}", decl.name),
                });
            }
        }

        let missing = |operation: &Id| Error::MissingOperation {
            instance: decl.name.clone(),
            contract: descriptor.name.clone(),
            operation: operation.clone(),
        };

        let mut methods = FxHashMap::default();
        let mut defaulted: FxHashMap<&Id, &[Id]> = FxHashMap::default();
        for sig in descriptor.all_operations() {
            let body = match given.remove(&sig.name) {
                Some(body) => body,
                None => {
                    let default = registry
                        .default_for(contract, &sig.name)
                        .ok_or_else(|| missing(&sig.name))?;
                    defaulted.insert(&sig.name, &default.uses);
                    default.body.clone()
                }
            };

            methods.insert(
                sig.name.clone(),
                Method {
                    arity: sig.arity(),
                    body,
                },
            );
        }

        if let Some(operation) = circular_default(descriptor.all_operations(), &defaulted) {
            return Err(missing(operation));
        }

        let id = InstanceId(self.entries.len());
        let scheme = Qualified::then(
            &decl.requirements,
            Predicate::new(descriptor.name.clone(), decl.types),
        );

        debug!(instance = %decl.name, scheme = %scheme, "registered instance");

        self.entries.push(InstanceEntry {
            id,
            name: decl.name,
            contract,
            scheme,
            methods: Arc::new(methods),
        });

        Ok(id)
    }

    pub fn get(&self, id: InstanceId) -> Option<&InstanceEntry> {
        self.entries.get(id.0)
    }

    // Only for ids this table handed out.
    pub(crate) fn entry(&self, id: InstanceId) -> &InstanceEntry {
        &self.entries[id.0]
    }

    pub fn entries(&self) -> impl Iterator<Item = &InstanceEntry> {
        self.entries.iter()
    }

    pub fn by_name(&self, name: &str) -> impl Iterator<Item = &InstanceEntry> + '_ {
        let name = name.to_owned();
        self.entries.iter().filter(move |e| e.name == *name)
    }

    /// Every instance that could answer `contract<types..>`: instances of
    /// the contract itself and of its subcontracts whose head matches.
    pub fn find_candidates(
        &self,
        registry: &CapabilityRegistry,
        contract: ContractId,
        types: &[Type],
    ) -> Vec<InstanceId> {
        let Ok(descriptor) = registry.contract(contract) else {
            return Vec::new();
        };
        let requirement = Predicate::new(descriptor.name.clone(), types.to_vec());
        let mut ids: Vec<InstanceId> = self
            .candidates(registry, contract, &requirement, &mut 0)
            .into_iter()
            .map(|c| c.instance)
            .collect();
        ids.dedup();
        ids
    }

    pub(crate) fn candidates(
        &self,
        registry: &CapabilityRegistry,
        contract: ContractId,
        requirement: &Predicate,
        fresh: &mut usize,
    ) -> Vec<Candidate> {
        let mask = registry.descriptor(contract).associated_mask();
        let mut buf = Vec::new();

        for entry in &self.entries {
            if entry.contract != contract && !registry.is_subcontract(entry.contract, contract) {
                continue;
            }

            let scheme = instantiate(&entry.scheme, fresh);

            for (reached, projected) in registry.by_super_class(scheme.consequence()) {
                if reached != contract {
                    continue;
                }

                if let Some(substitution) = projected.match_predicate(requirement, &mask) {
                    buf.push(Candidate {
                        instance: entry.id,
                        contract: entry.contract,
                        scheme: scheme.clone(),
                        projected,
                        substitution,
                    });
                }
            }
        }

        buf
    }
}

/// The first defaulted operation whose default, following only other
/// defaulted operations, ends up calling itself again.
fn circular_default<'a>(
    operations: &'a [Signature],
    defaulted: &FxHashMap<&Id, &[Id]>,
) -> Option<&'a Id> {
    operations
        .iter()
        .map(|sig| &sig.name)
        .filter(|name| defaulted.contains_key(name))
        .find(|&start| {
            let mut seen = FxHashSet::default();
            let mut todo: Vec<&Id> = defaulted.get(start).into_iter().flat_map(|uses| uses.iter()).collect();
            while let Some(op) = todo.pop() {
                if op == start {
                    return true;
                }
                if seen.insert(op) {
                    todo.extend(defaulted.get(op).into_iter().flat_map(|uses| uses.iter()));
                }
            }
            false
        })
}

/// Rename every variable of `scheme` to a fresh one.
pub(crate) fn instantiate(scheme: &Qualified<Predicate>, next: &mut usize) -> Qualified<Predicate> {
    let mut seen: FxHashMap<TypeVariable, TypeVariable> = FxHashMap::default();

    scheme.rename(&mut |v: &TypeVariable| {
        seen.entry(v.clone())
            .or_insert_with(|| {
                *next += 1;
                TypeVariable::new(Id::from(*next), v.kind().clone())
            })
            .clone()
    })
}
