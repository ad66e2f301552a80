//! The standard prelude
//!
//! The usual numeric and comparison contracts, with instances for the
//! builtin types. [`standard`] returns an unsealed environment, so clients
//! can add their own contracts and instances before sealing it.

use super::builtins::{boolean, double, int, make_array, make_pair, string};
use super::*;

type Outcome = std::result::Result<Value, InvokeError>;

/// Ids of the prelude's contracts, in case a client wants to register more
/// instances for them.
#[derive(Debug, Clone, Copy)]
pub struct Contracts {
    pub eq: ContractId,
    pub ord: ContractId,
    pub num: ContractId,
    pub semigroup: ContractId,
    pub monoid: ContractId,
    pub show: ContractId,
    pub tuple2: ContractId,
}

pub fn standard() -> Result<ConceptEnvironment> {
    let mut env = ConceptEnvironment::new();
    let contracts = declare_contracts(&mut env)?;
    register_instances(&mut env, &contracts)?;
    Ok(env)
}

pub fn declare_contracts(env: &mut ConceptEnvironment) -> Result<Contracts> {
    let a = Type::var("A");
    let op2 = |name: &str, result: Type| Signature::new(name, vec![a.clone(), a.clone()], result);
    let op1 = |name: &str, result: Type| Signature::new(name, vec![a.clone()], result);

    let eq = env.declare_contract(
        ContractDecl::new("Eq")
            .param("A")
            .operation(op2("Equals", boolean()))
            .operation(op2("NotEquals", boolean())),
    )?;
    env.declare_default(
        eq,
        "NotEquals",
        &["Equals"],
        operation(|w, args| Ok(Value::Bool(!w.invoke("Equals", args)?.as_bool()?))),
    )?;

    let ord = env.declare_contract(
        ContractDecl::new("Ord")
            .param("A")
            .extends("Eq", vec![a.clone()])
            .operation(op2("Leq", boolean())),
    )?;

    let num = env.declare_contract(
        ContractDecl::new("Num")
            .param("A")
            .operation(op2("Add", a.clone()))
            .operation(op2("Sub", a.clone()))
            .operation(op2("Mul", a.clone()))
            .operation(op1("Abs", a.clone()))
            .operation(op1("Signum", a.clone()))
            .operation(Signature::new("FromInteger", vec![int()], a.clone())),
    )?;

    let semigroup = env.declare_contract(
        ContractDecl::new("Semigroup")
            .param("A")
            .operation(op2("Append", a.clone())),
    )?;

    let monoid = env.declare_contract(
        ContractDecl::new("Monoid")
            .param("A")
            .extends("Semigroup", vec![a.clone()])
            .operation(Signature::new("Empty", vec![], a.clone())),
    )?;

    let show = env.declare_contract(
        ContractDecl::new("Show")
            .param("A")
            .operation(op1("Show", string())),
    )?;

    let (i, t1, t2) = (Type::var("I"), Type::var("T1"), Type::var("T2"));
    let tuple2 = env.declare_contract(
        ContractDecl::new("Tuple2")
            .param("I")
            .associated("T1")
            .associated("T2")
            .operation(Signature::new("Get1", vec![i.clone()], t1))
            .operation(Signature::new("Get2", vec![i], t2)),
    )?;

    Ok(Contracts {
        eq,
        ord,
        num,
        semigroup,
        monoid,
        show,
        tuple2,
    })
}

pub fn register_instances(env: &mut ConceptEnvironment, c: &Contracts) -> Result<()> {
    let a = Type::var("A");
    let b = Type::var("B");

    // Ord
    env.register_instance(
        c.ord,
        InstanceDecl::new("OrdInt", vec![int()])
            .method("Equals", binary(|_, x, y| Ok(Value::Bool(x.as_int()? == y.as_int()?))))
            .method("Leq", binary(|_, x, y| Ok(Value::Bool(x.as_int()? <= y.as_int()?)))),
    )?;
    env.register_instance(
        c.ord,
        InstanceDecl::new("OrdBool", vec![boolean()])
            .method("Equals", binary(|_, x, y| Ok(Value::Bool(x.as_bool()? == y.as_bool()?))))
            .method("Leq", binary(|_, x, y| Ok(Value::Bool(!x.as_bool()? || y.as_bool()?)))),
    )?;
    env.register_instance(
        c.ord,
        InstanceDecl::new("OrdDouble", vec![double()])
            .method("Equals", binary(|_, x, y| Ok(Value::Bool(x.as_double()? == y.as_double()?))))
            .method("Leq", binary(|_, x, y| Ok(Value::Bool(x.as_double()? <= y.as_double()?)))),
    )?;

    // Eq
    env.register_instance(
        c.eq,
        InstanceDecl::new("EqArray", vec![make_array(a.clone())])
            .requires("Eq", vec![a.clone()])
            .method(
                "Equals",
                binary(|w, x, y| {
                    let equal = match (x.as_array()?, y.as_array()?) {
                        (None, None) => true,
                        (Some(xs), Some(ys)) if xs.len() == ys.len() => {
                            all_equal(w.requirement(0)?, xs.iter().zip(ys))?
                        }
                        _ => false,
                    };
                    Ok(Value::Bool(equal))
                }),
            ),
    )?;
    env.register_instance(
        c.eq,
        InstanceDecl::new("EqPair", vec![make_pair(a.clone(), b.clone())])
            .requires("Eq", vec![a.clone()])
            .requires("Eq", vec![b.clone()])
            .method(
                "Equals",
                binary(|w, x, y| {
                    let (x1, x2) = pair_of(x)?;
                    let (y1, y2) = pair_of(y)?;
                    let equal = all_equal(w.requirement(0)?, [(x1, y1)])?
                        && all_equal(w.requirement(1)?, [(x2, y2)])?;
                    Ok(Value::Bool(equal))
                }),
            ),
    )?;

    // Num
    env.register_instance(
        c.num,
        InstanceDecl::new("NumInt", vec![int()])
            .method("Add", checked("Add", i64::checked_add))
            .method("Sub", checked("Sub", i64::checked_sub))
            .method("Mul", checked("Mul", i64::checked_mul))
            .method(
                "Abs",
                unary(|_, x| {
                    x.as_int()?
                        .checked_abs()
                        .map(Value::Int)
                        .ok_or_else(|| InvokeError::Failed("integer overflow in Abs".into()))
                }),
            )
            .method("Signum", unary(|_, x| Ok(Value::Int(x.as_int()?.signum()))))
            .method("FromInteger", unary(|_, x| Ok(Value::Int(x.as_int()?)))),
    )?;
    env.register_instance(
        c.num,
        InstanceDecl::new("NumDouble", vec![double()])
            .method("Add", binary(|_, x, y| Ok(Value::Double(x.as_double()? + y.as_double()?))))
            .method("Sub", binary(|_, x, y| Ok(Value::Double(x.as_double()? - y.as_double()?))))
            .method("Mul", binary(|_, x, y| Ok(Value::Double(x.as_double()? * y.as_double()?))))
            .method("Abs", unary(|_, x| Ok(Value::Double(x.as_double()?.abs()))))
            .method(
                "Signum",
                unary(|_, x| {
                    let d = x.as_double()?;
                    Ok(Value::Double(if d == 0.0 { 0.0 } else { d.signum() }))
                }),
            )
            .method("FromInteger", unary(|_, x| Ok(Value::Double(x.as_int()? as f64)))),
    )?;

    // Monoids over Bool. Both apply to Monoid<Bool>; pick one by name.
    env.register_instance(
        c.monoid,
        InstanceDecl::new("All", vec![boolean()])
            .method("Append", binary(|_, x, y| Ok(Value::Bool(x.as_bool()? && y.as_bool()?))))
            .method("Empty", operation(|_, _| Ok(Value::Bool(true)))),
    )?;
    env.register_instance(
        c.monoid,
        InstanceDecl::new("Any", vec![boolean()])
            .method("Append", binary(|_, x, y| Ok(Value::Bool(x.as_bool()? || y.as_bool()?))))
            .method("Empty", operation(|_, _| Ok(Value::Bool(false)))),
    )?;

    env.register_instance(
        c.monoid,
        InstanceDecl::new("Sum", vec![a.clone()])
            .requires("Num", vec![a.clone()])
            .method(
                "Append",
                binary(|w, x, y| w.requirement(0)?.invoke("Add", &[x.clone(), y.clone()])),
            )
            .method(
                "Empty",
                operation(|w, _| w.requirement(0)?.invoke("FromInteger", &[Value::Int(0)])),
            ),
    )?;

    env.register_instance(
        c.semigroup,
        InstanceDecl::new("Min", vec![a.clone()])
            .requires("Ord", vec![a.clone()])
            .method(
                "Append",
                binary(|w, x, y| Ok(if leq(w, x, y)? { x.clone() } else { y.clone() })),
            ),
    )?;
    env.register_instance(
        c.semigroup,
        InstanceDecl::new("Max", vec![a.clone()])
            .requires("Ord", vec![a.clone()])
            .method(
                "Append",
                binary(|w, x, y| Ok(if leq(w, x, y)? { y.clone() } else { x.clone() })),
            ),
    )?;

    // Show
    env.register_instance(
        c.show,
        InstanceDecl::new("ShowInt", vec![int()])
            .method("Show", unary(|_, x| Ok(Value::from(x.as_int()?.to_string())))),
    )?;
    env.register_instance(
        c.show,
        InstanceDecl::new("ShowBool", vec![boolean()])
            .method("Show", unary(|_, x| Ok(Value::from(x.as_bool()?.to_string())))),
    )?;
    env.register_instance(
        c.show,
        InstanceDecl::new("ShowDouble", vec![double()])
            .method("Show", unary(|_, x| Ok(Value::from(x.as_double()?.to_string())))),
    )?;
    env.register_instance(
        c.show,
        InstanceDecl::new("ShowString", vec![string()])
            .method("Show", unary(|_, x| Ok(Value::from(format!("{:?}", x.as_str()?))))),
    )?;
    env.register_instance(
        c.show,
        InstanceDecl::new("ShowArray", vec![make_array(a.clone())])
            .requires("Show", vec![a.clone()])
            .method(
                "Show",
                unary(|w, x| {
                    let Some(items) = x.as_array()? else {
                        return Ok(Value::from("null"));
                    };
                    let show = w.requirement(0)?;
                    let shown = items
                        .iter()
                        .map(|item| Ok(show.invoke("Show", &[item.clone()])?.as_str()?.to_owned()))
                        .collect::<std::result::Result<Vec<_>, InvokeError>>()?;
                    Ok(Value::from(format!("[{}]", shown.join(", "))))
                }),
            ),
    )?;

    // Tuples. `Tuple2` decides the component types, so showing a tuple can
    // ask for `Show` of components it never named.
    env.register_instance(
        c.tuple2,
        InstanceDecl::new("Tuple2Pair", vec![make_pair(a.clone(), b.clone()), a, b])
            .method("Get1", unary(|_, x| Ok(pair_of(x)?.0.clone())))
            .method("Get2", unary(|_, x| Ok(pair_of(x)?.1.clone()))),
    )?;

    let (i, t1, t2) = (Type::var("I"), Type::var("T1"), Type::var("T2"));
    env.register_instance(
        c.show,
        InstanceDecl::new("ShowTuple2", vec![i.clone()])
            .requires("Tuple2", vec![i, t1.clone(), t2.clone()])
            .requires("Show", vec![t1])
            .requires("Show", vec![t2])
            .method(
                "Show",
                unary(|w, x| {
                    let tuple = w.requirement(0)?;
                    let first = tuple.invoke("Get1", &[x.clone()])?;
                    let second = tuple.invoke("Get2", &[x.clone()])?;
                    let first = w.requirement(1)?.invoke("Show", &[first])?;
                    let second = w.requirement(2)?.invoke("Show", &[second])?;
                    Ok(Value::from(format!("({}, {})", first.as_str()?, second.as_str()?)))
                }),
            ),
    )?;

    Ok(())
}

/// Fold `values` with a `Monoid<ty>` found from `scope`, the way a generic
/// `mconcat<A> where M : Monoid<A>` would be called from there.
pub fn mconcat(scope: &Scope<'_>, ty: Type, values: &[Value]) -> Result<Value> {
    let a = Type::var("A");
    let callee = scope.enter(&["A"], &[Predicate::new("Monoid", vec![a.clone()])], &[ty])?;
    let monoid = callee.require("Monoid", vec![a])?;
    Ok(mconcat_with(&monoid, values)?)
}

/// Fold `values` with an explicit monoid witness.
pub fn mconcat_with(monoid: &Witness, values: &[Value]) -> std::result::Result<Value, InvokeError> {
    values.iter().try_fold(monoid.invoke("Empty", &[])?, |acc, v| {
        monoid.invoke("Append", &[acc, v.clone()])
    })
}

fn unary<F>(f: F) -> OperationBody
where
    F: Fn(&Witness, &Value) -> Outcome + Send + Sync + 'static,
{
    operation(move |w, args| match args {
        [x] => f(w, x),
        _ => Err(InvokeError::Failed(format!("expected 1 argument, got {}", args.len()))),
    })
}

fn binary<F>(f: F) -> OperationBody
where
    F: Fn(&Witness, &Value, &Value) -> Outcome + Send + Sync + 'static,
{
    operation(move |w, args| match args {
        [x, y] => f(w, x, y),
        _ => Err(InvokeError::Failed(format!("expected 2 arguments, got {}", args.len()))),
    })
}

fn checked(name: &'static str, f: fn(i64, i64) -> Option<i64>) -> OperationBody {
    binary(move |_, x, y| {
        f(x.as_int()?, y.as_int()?)
            .map(Value::Int)
            .ok_or_else(|| InvokeError::Failed(format!("integer overflow in {}", name)))
    })
}

fn all_equal<'v>(
    eq: &Witness,
    pairs: impl IntoIterator<Item = (&'v Value, &'v Value)>,
) -> std::result::Result<bool, InvokeError> {
    for (x, y) in pairs {
        if !eq.invoke("Equals", &[x.clone(), y.clone()])?.as_bool()? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn leq(w: &Witness, x: &Value, y: &Value) -> std::result::Result<bool, InvokeError> {
    w.requirement(0)?
        .invoke("Leq", &[x.clone(), y.clone()])?
        .as_bool()
}

fn pair_of(v: &Value) -> std::result::Result<(&Value, &Value), InvokeError> {
    match v.as_tuple()? {
        [x, y] => Ok((x, y)),
        other => Err(InvokeError::TypeMismatch {
            expected: "pair",
            found: format!("{}-tuple", other.len()),
        }),
    }
}
