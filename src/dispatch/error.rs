//! Error types for registration, resolution and invocation

use thiserror::Error;

use super::{ContractId, Id, Predicate, Type};

/// Result type alias for registration and resolution
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while declaring contracts, registering
/// instances, or resolving a witness. All of these are raised before any
/// operation body runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A contract with this name and arity already exists
    #[error("contract {name}/{arity} is already declared")]
    DuplicateContract { name: Id, arity: usize },

    /// A contract extends something that isn't a previously declared contract
    #[error("contract {contract} extends {supercontract}, which is not a declared contract")]
    UnknownSupercontract { contract: Id, supercontract: Predicate },

    /// An operation clashes with one inherited from a supercontract
    #[error("operation {operation} of {contract} conflicts: {reason}")]
    OperationConflict {
        contract: Id,
        operation: Id,
        reason: String,
    },

    /// An instance leaves out an operation that no default can supply,
    /// either because there is none or because the defaults only call each
    /// other
    #[error("instance {instance} of {contract} does not define {operation}, and no default can supply it")]
    MissingOperation {
        instance: Id,
        contract: Id,
        operation: Id,
    },

    /// A body or default for something the contract doesn't have
    #[error("{operation} is not an operation of {contract}")]
    UnknownOperation { contract: Id, operation: Id },

    /// An instance requirement that names something other than a contract
    #[error("instance {instance} requires {constraint}, but {reason}")]
    NonConceptConstraint {
        instance: Id,
        constraint: Predicate,
        reason: &'static str,
    },

    /// Lookup of a contract that was never declared
    #[error("no contract {name}/{arity}")]
    NotFound { name: Id, arity: usize },

    /// A contract id handed out by some other environment
    #[error("contract {id} was not declared in this environment")]
    UnknownContract { id: ContractId },

    /// Type arguments that don't fit the contract
    #[error("{what} takes {expected} type arguments, got {found}")]
    ArityMismatch {
        what: Id,
        expected: usize,
        found: usize,
    },

    /// Nothing matches the requested contract and types
    #[error("no instance of {} for {}", .requirement.id(), show_types(.requirement.types()))]
    NoInstance { requirement: Predicate },

    /// More than one instance survives tie-breaking
    #[error(
        "ambiguous instances of {} for {}: {}",
        .requirement.id(),
        show_types(.requirement.types()),
        show_ids(.candidates)
    )]
    AmbiguousInstance {
        requirement: Predicate,
        candidates: Vec<Id>,
    },

    /// Instance resolution would not terminate
    #[error(
        "resolution of {} for {} diverges after {depth} nested requirements",
        .requirement.id(),
        show_types(.requirement.types())
    )]
    DivergentResolution { requirement: Predicate, depth: usize },

    /// An operation body failed while a helper was running it
    #[error("operation failed: {0}")]
    Invoke(#[from] InvokeError),
}

impl Error {
    /// The contract the failing resolution was for, if this is a resolution
    /// error.
    pub fn requirement(&self) -> Option<&Predicate> {
        match self {
            Error::NoInstance { requirement }
            | Error::AmbiguousInstance { requirement, .. }
            | Error::DivergentResolution { requirement, .. } => Some(requirement),
            _ => None,
        }
    }
}

/// Failures inside operation bodies at call time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvokeError {
    #[error("{operation} is not visible through {view}")]
    UnknownOperation { view: Predicate, operation: Id },

    #[error("{operation} takes {expected} arguments, got {found}")]
    Arity {
        operation: Id,
        expected: usize,
        found: usize,
    },

    #[error("expected {expected}, got {found}")]
    TypeMismatch { expected: &'static str, found: String },

    #[error("instance {instance} has no requirement {requirement}")]
    MissingRequirement { instance: Id, requirement: String },

    #[error("{0}")]
    Failed(String),
}

fn show_types(types: &[Type]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn show_ids(ids: &[Id]) -> String {
    ids.iter()
        .map(Id::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
