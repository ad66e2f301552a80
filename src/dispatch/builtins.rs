//! Putting these in a module to namespace them. A name like
//! `builtins::int` is `tInt` in the paper.
//!
//! The types with arrow kinds are functions since the kinds are boxed.

use super::*;

/// Name of the array constructor, `A[]`.
pub const ARRAY: &str = "[]";

/// Name of the pair constructor, `(A, B)`.
pub const PAIR: &str = "(,)";

pub fn unit() -> Type {
    Type::con("()")
}

pub fn boolean() -> Type {
    Type::con("Bool")
}

pub fn int() -> Type {
    Type::con("Int")
}

pub fn double() -> Type {
    Type::con("Double")
}

pub fn string() -> Type {
    Type::con("String")
}

pub fn array() -> Type {
    Type::Constructor(TypeConstructor::new(ARRAY, Kind::constructor(1)))
}

pub fn pair() -> Type {
    Type::Constructor(TypeConstructor::new(PAIR, Kind::constructor(2)))
}

pub fn make_array(t: Type) -> Type {
    array().apply_to(t)
}

pub fn make_pair(a: Type, b: Type) -> Type {
    pair().apply_to(a).apply_to(b)
}
