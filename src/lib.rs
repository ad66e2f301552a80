//! Haskell-style type classes ("concepts") encoded as explicit dictionary
//! passing, following the instance machinery of [_Typing Haskell in
//! Haskell_][thih] but producing evidence rather than just checking it.
//!
//! A [`ConceptEnvironment`] collects contracts and instances during a single
//! registration phase. Sealing it yields a [`Resolver`], which turns a
//! requirement such as `Eq<Int[]>` into a [`Witness`]: the selected instance
//! with every nested requirement already resolved. Generic code threads
//! witnesses through a [`Scope`] instead of re-resolving them.
//!
//! [thih]:https://web.cecs.pdx.edu/~mpj/thih/thih.pdf

pub mod dispatch;
mod util;

pub use dispatch::*;
