//! Contracts
//!
//! A contract ("concept") is the trait-level information from the paper's
//! `Class`: its supercontracts. On top of that it records the operations an
//! instance has to supply, since here instances are dictionaries and not just
//! evidence that a predicate holds.

use std::sync::Arc;

use super::*;

/// Index of a declared contract in its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContractId(pub(crate) usize);

impl std::fmt::Display for ContractId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractParam {
    pub(crate) var: TypeVariable,
    // Associated parameters are outputs: the selected instance decides them.
    pub(crate) associated: bool,
}

impl ContractParam {
    pub fn var(&self) -> &TypeVariable {
        &self.var
    }

    pub fn is_associated(&self) -> bool {
        self.associated
    }
}

/// An operation signature, written over the contract's own parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub(crate) name: Id,
    pub(crate) params: Vec<Type>,
    pub(crate) result: Type,
    pub(crate) overriding: bool,
}

impl Signature {
    pub fn new(name: impl Into<Id>, params: Vec<Type>, result: Type) -> Self {
        Signature {
            name: name.into(),
            params,
            result,
            overriding: false,
        }
    }

    /// Mark this as an explicit override of an inherited operation, which
    /// is then allowed to change its signature.
    pub fn overriding(mut self) -> Self {
        self.overriding = true;
        self
    }

    pub fn name(&self) -> &Id {
        &self.name
    }

    pub fn params(&self) -> &[Type] {
        &self.params
    }

    pub fn result(&self) -> &Type {
        &self.result
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Same name, parameters and result.
    pub fn compatible_with(&self, other: &Signature) -> bool {
        self.name == other.name && self.params == other.params && self.result == other.result
    }
}

impl Types for Signature {
    fn apply(&self, s: &[Substitution]) -> Self {
        Signature {
            name: self.name.clone(),
            params: self.params.apply(s),
            result: self.result.apply(s),
            overriding: self.overriding,
        }
    }

    fn type_variables(&self) -> Vec<TypeVariable> {
        union(&self.params.type_variables(), &self.result.type_variables())
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, ") -> {}", self.result)
    }
}

/// What a client hands to
/// [`CapabilityRegistry::declare_contract`](super::CapabilityRegistry::declare_contract).
#[derive(Debug, Clone)]
pub struct ContractDecl {
    pub(crate) name: Id,
    pub(crate) params: Vec<ContractParam>,
    pub(crate) operations: Vec<Signature>,
    pub(crate) supers: Vec<Predicate>,
}

impl ContractDecl {
    pub fn new(name: impl Into<Id>) -> Self {
        ContractDecl {
            name: name.into(),
            params: Vec::new(),
            operations: Vec::new(),
            supers: Vec::new(),
        }
    }

    /// Add a type parameter of kind `*`.
    pub fn param(self, name: impl Into<Id>) -> Self {
        self.param_with_kind(name, Kind::Star)
    }

    pub fn param_with_kind(mut self, name: impl Into<Id>, kind: Kind) -> Self {
        self.params.push(ContractParam {
            var: TypeVariable::new(name, kind),
            associated: false,
        });
        self
    }

    /// Add a type parameter decided by the instance rather than the caller.
    pub fn associated(mut self, name: impl Into<Id>) -> Self {
        self.params.push(ContractParam {
            var: TypeVariable::new(name, Kind::Star),
            associated: true,
        });
        self
    }

    pub fn operation(mut self, signature: Signature) -> Self {
        self.operations.push(signature);
        self
    }

    /// `self : Super<types..>`, where `types` mention this contract's
    /// parameters.
    pub fn extends(mut self, name: impl Into<Id>, types: Vec<Type>) -> Self {
        self.supers.push(Predicate::new(name, types));
        self
    }

    pub fn name(&self) -> &Id {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A validated, immutable contract.
#[derive(Debug, Clone)]
pub struct ContractDescriptor {
    pub(crate) id: ContractId,
    pub(crate) name: Id,
    pub(crate) params: Vec<ContractParam>,
    pub(crate) operations: Vec<Signature>,
    pub(crate) supers: Vec<(ContractId, Predicate)>,
    // Own and inherited operations, with overrides applied and inherited
    // signatures rewritten over this contract's parameters.
    pub(crate) visible: Vec<Signature>,
    pub(crate) visible_names: Arc<[Id]>,
}

impl ContractDescriptor {
    pub fn id(&self) -> ContractId {
        self.id
    }

    pub fn name(&self) -> &Id {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn params(&self) -> &[ContractParam] {
        &self.params
    }

    /// Operations declared directly on this contract.
    pub fn operations(&self) -> &[Signature] {
        &self.operations
    }

    /// Every operation an instance has to provide, inherited ones included.
    pub fn all_operations(&self) -> &[Signature] {
        &self.visible
    }

    pub fn operation(&self, name: &str) -> Option<&Signature> {
        self.visible.iter().find(|s| s.name == name)
    }

    pub fn supers(&self) -> impl Iterator<Item = &Predicate> {
        self.supers.iter().map(|(_, p)| p)
    }

    /// The contract applied to its own parameters, e.g. `Ord<A>`.
    pub fn head(&self) -> Predicate {
        Predicate::new(
            self.name.clone(),
            self.params
                .iter()
                .map(|p| Type::Variable(p.var.clone()))
                .collect(),
        )
    }

    /// Which positions are associated outputs.
    pub fn associated_mask(&self) -> Vec<bool> {
        self.params.iter().map(|p| p.associated).collect()
    }

    /// The substitution sending this contract's parameters to `types`.
    pub fn instantiate(&self, types: &[Type]) -> Vec<Substitution> {
        self.params
            .iter()
            .zip(types)
            .map(|(p, t)| Substitution::new(p.var.clone(), t.clone()))
            .collect()
    }
}
