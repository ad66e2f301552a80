//! Concept Environments
//!
//! The paper's class environment, split in two: a [`CapabilityRegistry`]
//! for the contracts and an [`InstanceTable`] for their instances. This is
//! the mutable, single-threaded registration side; [`seal`] hands it over
//! to a [`Resolver`] and nothing can be added after that.
//!
//! [`seal`]: ConceptEnvironment::seal

use super::*;

#[derive(Debug, Default)]
pub struct ConceptEnvironment {
    pub(crate) registry: CapabilityRegistry,
    pub(crate) instances: InstanceTable,
}

impl ConceptEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_contract(&mut self, decl: ContractDecl) -> Result<ContractId> {
        self.registry.declare_contract(decl)
    }

    pub fn declare_interface(&mut self, name: impl Into<Id>, arity: usize) -> Result<()> {
        self.registry.declare_interface(name, arity)
    }

    pub fn declare_default(
        &mut self,
        contract: ContractId,
        operation: impl Into<Id>,
        uses: &[&str],
        body: OperationBody,
    ) -> Result<()> {
        self.registry.declare_default(contract, operation, uses, body)
    }

    pub fn register_instance(
        &mut self,
        contract: ContractId,
        decl: InstanceDecl,
    ) -> Result<InstanceId> {
        self.instances
            .register_instance(&self.registry, contract, decl)
    }

    pub fn lookup_contract(&self, name: &str, arity: usize) -> Result<&ContractDescriptor> {
        self.registry.lookup_contract(name, arity)
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn instances(&self) -> &InstanceTable {
        &self.instances
    }

    /// Close registration.
    pub fn seal(self, config: ResolverConfig) -> Resolver {
        Resolver::new(self, config)
    }
}
