//! Capability Registry
//!
//! Holds every declared contract, indexed by name and arity. Supercontracts
//! have to be declared before the contracts that extend them, which rules
//! out cycles in the supercontract graph without checking for them.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use super::*;

#[derive(Default)]
pub struct CapabilityRegistry {
    contracts: Vec<ContractDescriptor>,
    by_name: FxHashMap<(Id, usize), ContractId>,
    interfaces: FxHashSet<(Id, usize)>,
    defaults: FxHashMap<(ContractId, Id), DefaultOperation>,
}

/// A default body, and the operations of its contract it calls.
#[derive(Clone)]
pub(crate) struct DefaultOperation {
    pub(crate) body: OperationBody,
    pub(crate) uses: Vec<Id>,
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("contracts", &self.contracts)
            .field("interfaces", &self.interfaces)
            .field("defaults", &self.defaults.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CapabilityRegistry {
    pub fn declare_contract(&mut self, decl: ContractDecl) -> Result<ContractId> {
        let key = (decl.name.clone(), decl.arity());

        if self.by_name.contains_key(&key) || self.interfaces.contains(&key) {
            return Err(Error::DuplicateContract {
                name: decl.name,
                arity: key.1,
            });
        }

        let mut supers = Vec::with_capacity(decl.supers.len());
        for sup in &decl.supers {
            match self.by_name.get(&(sup.id().clone(), sup.arity())) {
                Some(&id) => supers.push((id, sup.clone())),
                None => {
                    return Err(Error::UnknownSupercontract {
                        contract: decl.name.clone(),
                        supercontract: sup.clone(),
                    })
                }
            }
        }

        let visible = self.visible_operations(&decl, &supers)?;
        let visible_names = visible.iter().map(|s| s.name.clone()).collect();

        let id = ContractId(self.contracts.len());
        debug!(
            contract = %decl.name,
            arity = key.1,
            operations = visible.len(),
            "declared contract"
        );

        self.contracts.push(ContractDescriptor {
            id,
            name: decl.name,
            params: decl.params,
            operations: decl.operations,
            supers,
            visible,
            visible_names,
        });
        self.by_name.insert(key, id);

        Ok(id)
    }

    /// Record a plain interface: something with a name that is *not* a
    /// contract, and so can't be used as a requirement.
    pub fn declare_interface(&mut self, name: impl Into<Id>, arity: usize) -> Result<()> {
        let key = (name.into(), arity);

        if self.by_name.contains_key(&key) || !self.interfaces.insert(key.clone()) {
            return Err(Error::DuplicateContract {
                name: key.0,
                arity,
            });
        }

        Ok(())
    }

    pub fn lookup_contract(&self, name: &str, arity: usize) -> Result<&ContractDescriptor> {
        self.by_name
            .get(&(Id::from(name), arity))
            .map(|id| self.descriptor(*id))
            .ok_or_else(|| Error::NotFound {
                name: name.into(),
                arity,
            })
    }

    pub fn contract(&self, id: ContractId) -> Result<&ContractDescriptor> {
        self.contracts
            .get(id.0)
            .ok_or(Error::UnknownContract { id })
    }

    // Only for ids this registry handed out.
    pub(crate) fn descriptor(&self, id: ContractId) -> &ContractDescriptor {
        &self.contracts[id.0]
    }

    pub fn find(&self, p: &Predicate) -> Option<&ContractDescriptor> {
        self.by_name
            .get(&(p.id().clone(), p.arity()))
            .map(|id| self.descriptor(*id))
    }

    pub fn is_interface(&self, name: &Id, arity: usize) -> bool {
        self.interfaces.contains(&(name.clone(), arity))
    }

    pub fn contracts(&self) -> impl Iterator<Item = &ContractDescriptor> {
        self.contracts.iter()
    }

    /// Give `operation` of `contract` a body written in terms of the
    /// contract's other operations. It receives the witness being invoked,
    /// so it sees whatever the instance overrides.
    ///
    /// `uses` names the operations the body invokes. An instance has to
    /// define enough of them that the defaults it relies on never only call
    /// each other.
    pub fn declare_default(
        &mut self,
        contract: ContractId,
        operation: impl Into<Id>,
        uses: &[&str],
        body: OperationBody,
    ) -> Result<()> {
        let operation = operation.into();
        let descriptor = self.contract(contract)?;

        let unknown = std::iter::once(operation.as_str())
            .chain(uses.iter().copied())
            .find(|name| descriptor.operation(name).is_none());
        if let Some(name) = unknown {
            return Err(Error::UnknownOperation {
                contract: descriptor.name.clone(),
                operation: name.into(),
            });
        }

        debug!(contract = %descriptor.name, %operation, ?uses, "declared default");
        let uses = uses.iter().copied().map(Id::from).collect();
        self.defaults
            .insert((contract, operation), DefaultOperation { body, uses });
        Ok(())
    }

    /// The default for `operation` as seen from `contract`: its own default
    /// if it has one, otherwise the nearest ancestor's.
    pub(crate) fn default_for(&self, contract: ContractId, operation: &Id) -> Option<&DefaultOperation> {
        if let Some(default) = self.defaults.get(&(contract, operation.clone())) {
            return Some(default);
        }

        self.contracts
            .get(contract.0)?
            .supers
            .iter()
            .find_map(|(sup, _)| self.default_for(*sup, operation))
    }

    /// `p` together with everything its supercontracts make true, each with
    /// the contract it belongs to. The paper's `bySuper`.
    pub fn by_super_class(&self, p: &Predicate) -> Vec<(ContractId, Predicate)> {
        let Some(contract) = self.find(p) else {
            return Vec::new();
        };

        let s = contract.instantiate(p.types());
        let mut buf = vec![(contract.id, p.clone())];

        for (_, sup) in &contract.supers {
            for entry in self.by_super_class(&sup.apply(&s)) {
                if !buf.contains(&entry) {
                    buf.push(entry);
                }
            }
        }

        buf
    }

    /// Strict: a contract is not its own subcontract.
    pub fn is_subcontract(&self, sub: ContractId, sup: ContractId) -> bool {
        self.contracts.get(sub.0).is_some_and(|c| {
            c.supers
                .iter()
                .any(|(s, _)| *s == sup || self.is_subcontract(*s, sup))
        })
    }

    fn visible_operations(
        &self,
        decl: &ContractDecl,
        supers: &[(ContractId, Predicate)],
    ) -> Result<Vec<Signature>> {
        let conflict = |operation: &Id, reason: String| Error::OperationConflict {
            contract: decl.name.clone(),
            operation: operation.clone(),
            reason,
        };

        let mut seen = FxHashSet::default();
        for op in &decl.operations {
            if !seen.insert(op.name.clone()) {
                return Err(conflict(&op.name, "declared more than once".into()));
            }
        }

        let overridden = |name: &Id| {
            decl.operations
                .iter()
                .any(|op| &op.name == name && op.overriding)
        };

        let mut inherited: Vec<(Id, Signature)> = Vec::new();
        for (sup, pred) in supers {
            let parent = self.descriptor(*sup);
            let s = parent.instantiate(pred.types());

            for sig in &parent.visible {
                let sig = sig.apply(&s);
                match inherited.iter().find(|(_, other)| other.name == sig.name) {
                    Some((from, other))
                        if !other.compatible_with(&sig) && !overridden(&sig.name) =>
                    {
                        return Err(conflict(
                            &sig.name,
                            format!(
                                "inherited as {} from {} and as {} from {}",
                                other, from, sig, parent.name
                            ),
                        ));
                    }
                    Some(_) => {}
                    None => inherited.push((parent.name.clone(), sig)),
                }
            }
        }

        let mut visible: Vec<Signature> = inherited.into_iter().map(|(_, sig)| sig).collect();

        for op in &decl.operations {
            match visible.iter().position(|sig| sig.name == op.name) {
                Some(i) if visible[i].compatible_with(op) || op.overriding => {
                    visible[i] = op.clone();
                }
                Some(i) => {
                    return Err(conflict(
                        &op.name,
                        format!("{} is incompatible with inherited {}", op, visible[i]),
                    ));
                }
                None if op.overriding => {
                    return Err(conflict(&op.name, "overrides nothing".into()));
                }
                None => visible.push(op.clone()),
            }
        }

        Ok(visible)
    }
}
