//! Resolution Engine
//!
//! Where the paper's `byInst`/`entail` only answer whether a predicate
//! holds, resolution here also builds the evidence: it picks one instance
//! for a requirement, resolves that instance's own requirements the same
//! way, and closes the lot into a [`Witness`].
//!
//! # Resolution Process
//!
//! 1. Refuse requirements that repeat or grow one already being resolved.
//! 2. Answer from the memo table, or from witnesses received by the scope.
//! 3. Collect matching instances, including subcontract instances.
//! 4. Tie-break: more specific patterns first, then more specific
//!    subcontracts. Anything still tied is ambiguous.
//! 5. Resolve the winner's requirements in order, threading the
//!    substitution so associated outputs of one feed the next.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::*;

/// A witness received from a caller, filed under the predicate the callee
/// wrote for it (`Eq<A>`, with `A` the callee's own parameter).
#[derive(Debug, Clone)]
pub(crate) struct Given {
    pub(crate) formal: Predicate,
    pub(crate) witness: Witness,
}

/// A memoized witness, with every requirement that was resolved beneath it
/// in order and at its depth below it. A hit replays these against the
/// current stack so the answer does not depend on what was cached earlier.
#[derive(Clone)]
struct Memo {
    witness: Witness,
    below: Arc<[(Predicate, usize)]>,
}

/// The sealed, read-only side of a [`ConceptEnvironment`]. Safe to share
/// between threads; the only interior mutability is the memo table, which
/// is insert-only.
pub struct Resolver {
    env: Arc<ConceptEnvironment>,
    config: ResolverConfig,
    cache: RwLock<FxHashMap<Predicate, Memo>>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("config", &self.config)
            .field("cached", &self.cache.read().len())
            .finish()
    }
}

impl Resolver {
    pub(crate) fn new(env: ConceptEnvironment, config: ResolverConfig) -> Self {
        Resolver {
            env: Arc::new(env),
            config,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn environment(&self) -> &ConceptEnvironment {
        &self.env
    }

    /// Resolve `contract<types..>` to a witness.
    pub fn resolve(&self, contract: &str, types: Vec<Type>) -> Result<Witness> {
        self.resolve_predicate(&Predicate::new(contract, types))
    }

    pub fn resolve_predicate(&self, requirement: &Predicate) -> Result<Witness> {
        self.resolve_with(&[], requirement, None)
    }

    /// Resolve using the instance called `instance` for the requirement
    /// itself, where more than one instance legitimately applies. Nested
    /// requirements are resolved as usual.
    pub fn resolve_named(&self, instance: &str, contract: &str, types: Vec<Type>) -> Result<Witness> {
        self.resolve_with(&[], &Predicate::new(contract, types), Some(instance))
    }

    /// Does `requirement` hold, i.e. would resolving it succeed?
    pub fn entails(&self, requirement: &Predicate) -> bool {
        self.resolve_predicate(requirement).is_ok()
    }

    /// Number of memoized witnesses.
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }

    pub(crate) fn resolve_with(
        &self,
        givens: &[Given],
        requirement: &Predicate,
        only: Option<&str>,
    ) -> Result<Witness> {
        let mut search = Search {
            resolver: self,
            givens,
            only,
            stack: Vec::new(),
            visited: Vec::new(),
            fresh: 0,
        };

        let (witness, _) = search.solve(requirement)?;
        Ok(witness)
    }
}

struct Search<'r> {
    resolver: &'r Resolver,
    givens: &'r [Given],
    // Applies to the outermost requirement only.
    only: Option<&'r str>,
    stack: Vec<Predicate>,
    // Every requirement entered so far, with its depth.
    visited: Vec<(Predicate, usize)>,
    fresh: usize,
}

impl Search<'_> {
    /// Resolve one requirement. Also returns bindings for the variables the
    /// requirement left in associated positions.
    fn solve(&mut self, requirement: &Predicate) -> Result<(Witness, Vec<Substitution>)> {
        let resolver = self.resolver;
        let registry = &resolver.env.registry;

        let contract = registry
            .find(requirement)
            .ok_or_else(|| Error::NotFound {
                name: requirement.id().clone(),
                arity: requirement.arity(),
            })?;

        let depth = self.stack.len();
        self.check_divergence(requirement, depth)?;
        let start = self.visited.len();
        self.visited.push((requirement.clone(), depth));

        let only = self.only.take();
        let cacheable = resolver.config.memoize
            && only.is_none()
            && self.givens.is_empty()
            && requirement.is_ground();

        if cacheable {
            let hit = resolver.cache.read().get(requirement).cloned();
            if let Some(memo) = hit {
                trace!(%requirement, "memo hit");
                self.replay(depth, &memo.below)?;
                return Ok((memo.witness, Vec::new()));
            }
        }

        if let Some(found) = self.from_givens(contract, requirement)? {
            return Ok(found);
        }

        let instances = &resolver.env.instances;
        let mut candidates =
            instances.candidates(registry, contract.id(), requirement, &mut self.fresh);
        candidates.dedup_by_key(|c| c.instance);

        if let Some(name) = only {
            candidates.retain(|c| instances.entry(c.instance).name() == name);
        }

        let selected = self.tie_break(contract, requirement, candidates)?;

        trace!(
            %requirement,
            instance = %instances.entry(selected.instance).name(),
            depth,
            "selected instance"
        );

        self.stack.push(requirement.clone());
        let built = self.build(contract, requirement, selected);
        self.stack.pop();
        let (witness, outputs) = built?;

        if cacheable {
            let below = self.visited[start + 1..]
                .iter()
                .map(|(p, d)| (p.clone(), d - depth))
                .collect();
            let memo = resolver
                .cache
                .write()
                .entry(requirement.clone())
                .or_insert(Memo { witness, below })
                .clone();
            return Ok((memo.witness, outputs));
        }

        Ok((witness, outputs))
    }

    fn check_divergence(&self, requirement: &Predicate, depth: usize) -> Result<()> {
        let diverges = depth >= self.resolver.config.max_depth
            || self
                .stack
                .iter()
                .any(|earlier| earlier == requirement || requirement.embeds(earlier));

        if diverges {
            debug!(%requirement, depth, "divergent resolution");
            return Err(Error::DivergentResolution {
                requirement: requirement.clone(),
                depth,
            });
        }

        Ok(())
    }

    /// Walk a memoized subtree again from `depth`, as resolving it afresh
    /// would. Only the divergence checks can come out differently.
    fn replay(&mut self, depth: usize, below: &[(Predicate, usize)]) -> Result<()> {
        for (requirement, offset) in below {
            self.check_divergence(requirement, depth + offset)?;
            self.visited.push((requirement.clone(), depth + offset));
        }
        Ok(())
    }

    /// Look for the requirement among the witnesses the scope received,
    /// directly or through their supercontracts.
    fn from_givens(
        &self,
        contract: &ContractDescriptor,
        requirement: &Predicate,
    ) -> Result<Option<(Witness, Vec<Substitution>)>> {
        let registry = &self.resolver.env.registry;
        let mask = contract.associated_mask();
        let mut found: Vec<(ContractId, Witness, Predicate)> = Vec::new();

        for given in self.givens {
            let formal = registry.by_super_class(&given.formal);
            let actual = registry.by_super_class(given.witness.predicate());
            let Some(&(own, _)) = formal.first() else {
                continue;
            };

            for (i, (reached, pred)) in formal.iter().enumerate() {
                if *reached != contract.id() || !pred.agrees_with(requirement, &mask) {
                    continue;
                }

                let witness = actual
                    .get(i)
                    .and_then(|(_, p)| given.witness.project_to(p))
                    .or_else(|| given.witness.project(pred.id().as_str()));

                if let Some(witness) = witness {
                    if !found.iter().any(|(_, w, _)| w.same_instance(&witness)) {
                        found.push((own, witness, pred.clone()));
                    }
                }
            }
        }

        // A witness received as a subcontract beats one received as its
        // ancestor.
        let survivors: Vec<_> = found
            .iter()
            .filter(|(c, ..)| {
                !found
                    .iter()
                    .any(|(d, ..)| registry.is_subcontract(*d, *c))
            })
            .collect();

        match survivors.as_slice() {
            [] => Ok(None),
            [(_, witness, formal)] => {
                trace!(%requirement, instance = %witness.instance_name(), "forwarded received witness");
                Ok(Some((witness.clone(), outputs(requirement, formal, &mask))))
            }
            many => Err(Error::AmbiguousInstance {
                requirement: requirement.clone(),
                candidates: many.iter().map(|(_, w, _)| w.instance_name().clone()).collect(),
            }),
        }
    }

    fn tie_break(
        &self,
        contract: &ContractDescriptor,
        requirement: &Predicate,
        mut candidates: Vec<Candidate>,
    ) -> Result<Candidate> {
        let registry = &self.resolver.env.registry;
        let instances = &self.resolver.env.instances;

        if candidates.is_empty() {
            debug!(%requirement, "no instance");
            return Err(Error::NoInstance {
                requirement: requirement.clone(),
            });
        }

        let mask = contract.associated_mask();
        let inputs: Vec<Predicate> = candidates
            .iter()
            .map(|c| c.projected.inputs(&mask))
            .collect();

        // A direct match for the exact type beats a catch-all pattern.
        let specific: Vec<usize> = (0..candidates.len())
            .filter(|&i| {
                !inputs
                    .iter()
                    .any(|other| inputs[i].more_general_than(other, &[]))
            })
            .collect();

        // An instance of a subcontract beats one of its ancestor.
        let survivors: Vec<usize> = specific
            .iter()
            .copied()
            .filter(|&i| {
                !specific
                    .iter()
                    .any(|&j| registry.is_subcontract(candidates[j].contract, candidates[i].contract))
            })
            .collect();

        if let [i] = survivors[..] {
            return Ok(candidates.swap_remove(i));
        }

        let names: Vec<Id> = survivors
            .iter()
            .map(|&i| instances.entry(candidates[i].instance).name().clone())
            .collect();
        debug!(%requirement, candidates = ?names, "ambiguous instances");

        Err(Error::AmbiguousInstance {
            requirement: requirement.clone(),
            candidates: names,
        })
    }

    fn build(
        &mut self,
        contract: &ContractDescriptor,
        requirement: &Predicate,
        selected: Candidate,
    ) -> Result<(Witness, Vec<Substitution>)> {
        let resolver = self.resolver;
        let env = &resolver.env;
        let mut s = selected.substitution;
        let mut witnesses = Vec::with_capacity(selected.scheme.premises().len());

        for premise in selected.scheme.premises() {
            let (witness, bound) = self.solve(&premise.apply(&s))?;
            s = Substitution::at_at(&bound, &s);
            witnesses.push(witness);
        }

        let head = selected.scheme.consequence().apply(&s);
        let view = selected.projected.apply(&s);

        let witness = Witness::new(
            &env.registry,
            env.instances.entry(selected.instance),
            head,
            witnesses,
        );
        let witness = witness.project_to(&view).unwrap_or(witness);

        Ok((witness, outputs(requirement, &view, &contract.associated_mask())))
    }
}

/// Bind variables the requirement left in associated positions to what the
/// resolved predicate has there.
fn outputs(requirement: &Predicate, resolved: &Predicate, mask: &[bool]) -> Vec<Substitution> {
    requirement
        .types()
        .iter()
        .zip(resolved.types())
        .zip(mask)
        .filter_map(|((asked, got), &assoc)| match asked {
            Type::Variable(v) if assoc && asked != got => Some(Substitution::new(v.clone(), got.clone())),
            _ => None,
        })
        .collect()
}
