use std::sync::Arc;

use concept_dispatch::builtins::{boolean, int, make_array, make_pair, string};
use concept_dispatch::prelude;
use concept_dispatch::{
    operation, ConceptEnvironment, ContractDecl, ContractId, Error, InstanceDecl, OperationBody,
    Predicate, ResolverConfig, Scope, Signature, Type, Value,
};

fn eq_contract(env: &mut ConceptEnvironment) -> ContractId {
    let a = Type::var("A");
    env.declare_contract(
        ContractDecl::new("Eq")
            .param("A")
            .operation(Signature::new("Equals", vec![a.clone(), a], boolean())),
    )
    .unwrap()
}

fn ord_contract(env: &mut ConceptEnvironment) -> ContractId {
    let a = Type::var("A");
    env.declare_contract(
        ContractDecl::new("Ord")
            .param("A")
            .extends("Eq", vec![a.clone()])
            .operation(Signature::new("Leq", vec![a.clone(), a], boolean())),
    )
    .unwrap()
}

fn int_equals() -> OperationBody {
    operation(|_, args| Ok(Value::Bool(args[0].as_int()? == args[1].as_int()?)))
}

fn constant(b: bool) -> OperationBody {
    operation(move |_, _| Ok(Value::Bool(b)))
}

fn ints(items: &[i64]) -> Value {
    Value::Array(items.iter().copied().map(Value::Int).collect())
}

#[test]
fn ord_int_answers_for_eq_and_ord() {
    let mut env = ConceptEnvironment::new();
    eq_contract(&mut env);
    let ord = ord_contract(&mut env);
    env.register_instance(
        ord,
        InstanceDecl::new("OrdInt", vec![int()])
            .method("Equals", int_equals())
            .method(
                "Leq",
                operation(|_, args| Ok(Value::Bool(args[0].as_int()? <= args[1].as_int()?))),
            ),
    )
    .unwrap();
    let r = env.seal(ResolverConfig::default());

    let eq = r.resolve("Eq", vec![int()]).unwrap();
    assert_eq!(eq.instance_name(), "OrdInt");
    assert_eq!(eq.invoke("Equals", &[Value::Int(3), Value::Int(3)]), Ok(Value::Bool(true)));
    assert_eq!(eq.invoke("Equals", &[Value::Int(3), Value::Int(4)]), Ok(Value::Bool(false)));

    let ord = r.resolve("Ord", vec![int()]).unwrap();
    assert_eq!(ord.invoke("Leq", &[Value::Int(3), Value::Int(4)]), Ok(Value::Bool(true)));
    assert!(ord.project("Eq").unwrap().same_instance(&eq));
}

#[test]
fn defaults_see_the_instance_override() {
    let mut env = ConceptEnvironment::new();
    let a = Type::var("A");
    let eq = env
        .declare_contract(
            ContractDecl::new("Eq")
                .param("A")
                .operation(Signature::new("Eq", vec![a.clone(), a.clone()], boolean()))
                .operation(Signature::new("Neq", vec![a.clone(), a], boolean())),
        )
        .unwrap();
    env.declare_default(
        eq,
        "Eq",
        &["Neq"],
        operation(|w, args| Ok(Value::Bool(!w.invoke("Neq", args)?.as_bool()?))),
    )
    .unwrap();
    env.declare_default(
        eq,
        "Neq",
        &["Eq"],
        operation(|w, args| Ok(Value::Bool(!w.invoke("Eq", args)?.as_bool()?))),
    )
    .unwrap();

    match env.register_instance(eq, InstanceDecl::new("EqNone", vec![boolean()])) {
        Err(Error::MissingOperation { instance, operation, .. }) => {
            assert_eq!(instance, "EqNone");
            assert_eq!(operation, "Eq");
        }
        other => panic!("expected a missing operation, got {:?}", other),
    }
    env.register_instance(eq, InstanceDecl::new("EqInt", vec![int()]).method("Eq", int_equals()))
        .unwrap();

    let r = env.seal(ResolverConfig::default());
    let w = r.resolve("Eq", vec![int()]).unwrap();
    assert_eq!(w.invoke("Neq", &[Value::Int(3), Value::Int(3)]), Ok(Value::Bool(false)));
    assert_eq!(w.invoke("Neq", &[Value::Int(3), Value::Int(5)]), Ok(Value::Bool(true)));
}

#[test]
fn growing_mutual_recursion_terminates() {
    let mut env = ConceptEnvironment::new();
    let foo = env.declare_contract(ContractDecl::new("Foo").param("A")).unwrap();
    let bar = env.declare_contract(ContractDecl::new("Bar").param("A")).unwrap();
    let a = Type::var("A");
    env.register_instance(
        foo,
        InstanceDecl::new("FooA", vec![a.clone()]).requires("Bar", vec![make_array(a.clone())]),
    )
    .unwrap();
    env.register_instance(
        bar,
        InstanceDecl::new("BarA", vec![a.clone()]).requires("Foo", vec![make_array(a)]),
    )
    .unwrap();

    let r = env.seal(ResolverConfig::default());
    match r.resolve("Foo", vec![int()]) {
        Err(Error::DivergentResolution { requirement, depth }) => {
            assert_eq!(requirement.to_string(), "Foo<Int[][]>");
            assert_eq!(depth, 2);
        }
        other => panic!("expected divergence, got {:?}", other),
    }
}

#[test]
fn earlier_resolutions_do_not_change_later_answers() {
    let sealed = || {
        prelude::standard()
            .unwrap()
            .seal(ResolverConfig::default().with_max_depth(3))
    };
    let deep = make_array(make_array(make_array(int())));

    let fresh = sealed().resolve("Eq", vec![deep.clone()]);
    match &fresh {
        Err(Error::DivergentResolution { requirement, depth }) => {
            assert_eq!(requirement.to_string(), "Eq<Int>");
            assert_eq!(*depth, 3);
        }
        other => panic!("expected divergence, got {:?}", other),
    }

    let warmed = sealed();
    assert!(warmed.resolve("Eq", vec![make_array(int())]).is_ok());
    assert_eq!(warmed.resolve("Eq", vec![deep]).map(|w| w.to_string()), fresh.map(|w| w.to_string()));
    assert!(warmed.resolve("Eq", vec![make_array(make_array(int()))]).is_ok());
}

#[test]
fn most_specific_instance_wins() {
    let mut env = ConceptEnvironment::new();
    let eq = eq_contract(&mut env);
    let ord = ord_contract(&mut env);
    let noot = env.declare_contract(ContractDecl::new("Noot").param("A")).unwrap();
    let foo = Type::con("Foo");

    env.register_instance(noot, InstanceDecl::new("NootFoo", vec![foo.clone()]))
        .unwrap();
    env.register_instance(noot, InstanceDecl::new("NootA", vec![Type::var("A")]))
        .unwrap();

    env.register_instance(
        eq,
        InstanceDecl::new("EqFoo", vec![foo.clone()]).method("Equals", constant(false)),
    )
    .unwrap();
    env.register_instance(
        ord,
        InstanceDecl::new("OrdFoo", vec![foo.clone()])
            .method("Equals", constant(true))
            .method("Leq", constant(true)),
    )
    .unwrap();

    let r = env.seal(ResolverConfig::default().without_memoization());
    for _ in 0..3 {
        assert_eq!(r.resolve("Noot", vec![foo.clone()]).unwrap().instance_name(), "NootFoo");
    }

    let w = r.resolve("Eq", vec![foo.clone()]).unwrap();
    assert_eq!(w.instance_name(), "OrdFoo");
    assert_eq!(w.invoke("Equals", &[Value::Unit, Value::Unit]), Ok(Value::Bool(true)));
}

#[test]
fn arrays_compare_element_by_element() {
    let mut env = ConceptEnvironment::new();
    let eq = eq_contract(&mut env);
    let a = Type::var("A");
    env.register_instance(eq, InstanceDecl::new("EqInt", vec![int()]).method("Equals", int_equals()))
        .unwrap();
    env.register_instance(
        eq,
        InstanceDecl::new("EqArray", vec![make_array(a.clone())])
            .requires("Eq", vec![a])
            .method(
                "Equals",
                operation(|w, args| {
                    let elem = w.requirement(0)?;
                    let equal = match (args[0].as_array()?, args[1].as_array()?) {
                        (None, None) => true,
                        (Some(xs), Some(ys)) if xs.len() == ys.len() => {
                            let mut all = true;
                            for (x, y) in xs.iter().zip(ys) {
                                all &= elem.invoke("Equals", &[x.clone(), y.clone()])?.as_bool()?;
                            }
                            all
                        }
                        _ => false,
                    };
                    Ok(Value::Bool(equal))
                }),
            ),
    )
    .unwrap();

    let r = env.seal(ResolverConfig::default());
    let w = r.resolve("Eq", vec![make_array(int())]).unwrap();
    let equals = |x: Value, y: Value| w.invoke("Equals", &[x, y]).unwrap();

    assert_eq!(equals(ints(&[1, 2, 3]), ints(&[1, 2, 3])), Value::Bool(true));
    assert_eq!(equals(ints(&[1, 2, 3]), ints(&[1, 5, 3])), Value::Bool(false));
    assert_eq!(equals(ints(&[1, 2, 3]), ints(&[1, 2])), Value::Bool(false));
    assert_eq!(equals(Value::Null, Value::Null), Value::Bool(true));
    assert_eq!(equals(Value::Null, ints(&[1])), Value::Bool(false));

    let nested = r.resolve("Eq", vec![make_array(make_array(int()))]).unwrap();
    assert_eq!(nested.to_string(), "EqArray(EqArray(EqInt))");
}

#[test]
fn resolution_is_deterministic() {
    let fresh = || prelude::standard().unwrap().seal(ResolverConfig::default());
    let ty = make_pair(make_array(int()), boolean());
    let value = Value::Tuple(vec![ints(&[1, 2]), Value::Bool(false)]);

    let shown: Vec<_> = (0..3)
        .map(|_| {
            let r = fresh();
            let w = r.resolve("Show", vec![ty.clone()]).unwrap();
            (w.to_string(), w.invoke("Show", &[value.clone()]).unwrap())
        })
        .collect();

    assert!(shown.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(shown[0].1, Value::from("([1, 2], false)"));
}

#[test]
fn client_types_join_the_prelude() {
    let mut env = prelude::standard().unwrap();
    let show = env.lookup_contract("Show", 1).unwrap().id();
    let point = Type::con("Point");
    env.register_instance(
        show,
        InstanceDecl::new("ShowPoint", vec![point.clone()]).method(
            "Show",
            operation(|_, args| {
                let xy = args[0].as_tuple()?;
                Ok(Value::from(format!("<{}, {}>", xy[0], xy[1])))
            }),
        ),
    )
    .unwrap();
    let r = env.seal(ResolverConfig::default());

    let w = r.resolve("Show", vec![make_array(point)]).unwrap();
    let points = Value::Array(vec![Value::Tuple(vec![Value::Int(1), Value::Int(2)])]);
    assert_eq!(w.invoke("Show", &[points]), Ok(Value::from("[<1, 2>]")));
}

#[test]
fn generic_functions_receive_their_witnesses() {
    let r = prelude::standard().unwrap().seal(ResolverConfig::default());
    let root = Scope::root(&r);

    // fn contains<A>(xs: A[], x: A) where Eq<A>
    let a = Type::var("A");
    let requirements = [Predicate::new("Eq", vec![a.clone()])];
    assert!(matches!(
        root.enter(&["A"], &requirements, &[string()]),
        Err(Error::NoInstance { .. })
    ));

    let callee = root.enter(&["A"], &requirements, &[int()]).unwrap();
    let eq = callee.require("Eq", vec![a]).unwrap();
    let xs = [Value::Int(4), Value::Int(2)];
    let contains = xs
        .iter()
        .any(|x| eq.invoke("Equals", &[x.clone(), Value::Int(2)]) == Ok(Value::Bool(true)));
    assert!(contains);

    let total = prelude::mconcat(&root, int(), &xs).unwrap();
    assert_eq!(total, Value::Int(6));
}

#[test]
fn witnesses_are_shared_across_threads() {
    let r = Arc::new(prelude::standard().unwrap().seal(ResolverConfig::default()));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let r = Arc::clone(&r);
            std::thread::spawn(move || {
                let w = r.resolve("Eq", vec![make_array(int())]).unwrap();
                let v = Value::Array(vec![Value::Int(i)]);
                w.invoke("Equals", &[v.clone(), v]).unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Value::Bool(true));
    }
    assert_eq!(r.cached(), 2);
}
