//! The dispatch engine: contracts, instances, resolution and witnesses.

pub mod builtins;
pub mod error;
pub mod prelude;

mod config;
mod contract;
mod environment;
mod id;
mod instances;
mod kinds;
mod predicate;
mod qualified;
mod registry;
mod resolve;
mod scope;
mod substitution;
mod types;
mod value;
mod witness;

pub use error::{Error, InvokeError, Result};

pub use config::ResolverConfig;
pub use contract::{ContractDecl, ContractDescriptor, ContractId, ContractParam, Signature};
pub use environment::ConceptEnvironment;
pub use id::Id;
pub use instances::{Candidate, InstanceDecl, InstanceEntry, InstanceId, InstanceTable};
pub use kinds::{HasKind, Kind};
pub use predicate::Predicate;
pub use qualified::Qualified;
pub use registry::CapabilityRegistry;
pub use resolve::Resolver;
pub use scope::Scope;
pub use substitution::Substitution;
pub use types::{Type, TypeConstructor, TypeVariable, Types};
pub use value::Value;
pub use witness::{operation, OperationBody, Witness};

use crate::util::{intersection, union};
