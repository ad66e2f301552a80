//! Type representation
//!
//! Requirements and instance heads are written over these. Variables in an
//! instance head are pattern variables; variables in a requirement are the
//! caller's own generic parameters and never bind.

use super::*;

pub trait Types {
    fn apply(&self, s: &[Substitution]) -> Self;
    fn type_variables(&self) -> Vec<TypeVariable>;
}

impl<T> Types for Vec<T>
where
    T: Types,
{
    fn apply(&self, s: &[Substitution]) -> Self {
        self.iter().map(|t| t.apply(s)).collect()
    }

    fn type_variables(&self) -> Vec<TypeVariable> {
        self.iter()
            .fold(Vec::new(), |vars, t| union(&vars, &t.type_variables()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Variable(TypeVariable),
    Constructor(TypeConstructor),
    Applied(Box<Type>, Box<Type>),
}

// Ill-formed applications (applying something of kind `*`) report this
// instead of panicking; matching then fails on the kind check.
static STAR: Kind = Kind::Star;

impl Type {
    /// A type variable of kind `*`.
    pub fn var(id: impl Into<Id>) -> Type {
        Type::Variable(TypeVariable::new(id, Kind::Star))
    }

    /// A nullary type constructor such as `Int`.
    pub fn con(id: impl Into<Id>) -> Type {
        Type::Constructor(TypeConstructor::new(id, Kind::Star))
    }

    /// `name<args..>`, with the constructor's kind derived from the number
    /// of arguments.
    pub fn generic(id: impl Into<Id>, args: Vec<Type>) -> Type {
        let head = Type::Constructor(TypeConstructor::new(id, Kind::constructor(args.len())));
        args.into_iter().fold(head, |t, arg| t.apply_to(arg))
    }

    // The same as the [`Type::Applied`] constructor, but it does the boxing
    // for us.
    pub fn apply_to(&self, b: Type) -> Type {
        Type::Applied(Box::new(self.clone()), Box::new(b))
    }

    /// Split `((C a) b)` into `C` and `[a, b]`.
    pub fn spine(&self) -> (&Type, Vec<&Type>) {
        match self {
            Type::Applied(l, r) => {
                let (head, mut args) = l.spine();
                args.push(r);
                (head, args)
            }
            t => (t, Vec::new()),
        }
    }

    pub fn is_ground(&self) -> bool {
        self.type_variables().is_empty()
    }

    /// Number of constructor and variable nodes, used to tell whether a
    /// recursive requirement is growing.
    pub fn size(&self) -> usize {
        match self {
            Type::Applied(l, r) => l.size() + r.size(),
            _ => 1,
        }
    }

    /// Whether `inner` occurs somewhere inside `self` (including `self`).
    pub fn embeds(&self, inner: &Type) -> bool {
        self == inner
            || match self {
                Type::Applied(l, r) => l.embeds(inner) || r.embeds(inner),
                _ => false,
            }
    }

    /// One-way matching: find a substitution `s` for the variables of `self`
    /// such that `self.apply(s) == t2`. Variables in `t2` are rigid.
    pub fn matches(&self, t2: &Type) -> Option<Vec<Substitution>> {
        match (self, t2) {
            (Type::Applied(l, r), Type::Applied(l_, r_)) => {
                let sl = l.matches(l_)?;
                let sr = r.matches(r_)?;

                Substitution::merge(&sl, &sr)
            }
            (Type::Variable(u), t) if u.kind() == t.kind() => Some(u.maps_to(t)),
            (Type::Constructor(tc1), Type::Constructor(tc2)) if tc1 == tc2 => Some(Vec::new()),
            _ => None,
        }
    }

    /// Consistently rename every variable using `fresh`, so that two uses of
    /// the same instance never share variables with each other or with the
    /// caller.
    pub fn rename(&self, fresh: &mut impl FnMut(&TypeVariable) -> TypeVariable) -> Type {
        match self {
            Type::Variable(v) => Type::Variable(fresh(v)),
            Type::Applied(l, r) => l.rename(fresh).apply_to(r.rename(fresh)),
            t => t.clone(),
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (head, args) = self.spine();

        if args.is_empty() {
            return match head {
                Type::Variable(v) => write!(f, "{}", v),
                Type::Constructor(c) => write!(f, "{}", c),
                Type::Applied(..) => unreachable!("spine heads are never applications"),
            };
        }

        match head {
            Type::Constructor(c) if c.id == builtins::ARRAY && args.len() == 1 => {
                write!(f, "{}[]", args[0])
            }
            Type::Constructor(c) if c.id == builtins::PAIR && args.len() == 2 => {
                write!(f, "({}, {})", args[0], args[1])
            }
            _ => {
                write!(f, "{}<", head)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")
            }
        }
    }
}

impl Types for Type {
    fn apply(&self, s: &[Substitution]) -> Self {
        match self {
            Type::Variable(u) => match u.find_type_in(s) {
                Some(t) => t,
                None => self.clone(),
            },
            Type::Applied(l, r) => l.apply(s).apply_to(r.apply(s)),
            _ => self.clone(),
        }
    }

    fn type_variables(&self) -> Vec<TypeVariable> {
        match self {
            Type::Variable(u) => vec![u.clone()],
            Type::Applied(l, r) => union(&l.type_variables(), &r.type_variables()),
            Type::Constructor(_) => vec![],
        }
    }
}

impl HasKind for Type {
    fn kind(&self) -> &Kind {
        match self {
            Type::Variable(v) => v.kind(),
            Type::Constructor(c) => c.kind(),
            Type::Applied(t, _) => t.kind().result().unwrap_or(&STAR),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct TypeVariable {
    id: Id,
    kind: Kind,
}

impl TypeVariable {
    pub fn new(id: impl Into<Id>, kind: Kind) -> Self {
        TypeVariable {
            id: id.into(),
            kind,
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn maps_to(&self, t: &Type) -> Vec<Substitution> {
        vec![Substitution::new(self.clone(), t.clone())]
    }

    pub fn find_type_in(&self, substitutions: &[Substitution]) -> Option<Type> {
        substitutions
            .iter()
            .find(|s| &s.from == self)
            .map(|s| s.to.clone())
    }
}

impl std::fmt::Display for TypeVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl HasKind for TypeVariable {
    fn kind(&self) -> &Kind {
        &self.kind
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct TypeConstructor {
    id: Id,
    kind: Kind,
}

impl TypeConstructor {
    pub fn new(id: impl Into<Id>, kind: Kind) -> Self {
        TypeConstructor {
            id: id.into(),
            kind,
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }
}

impl std::fmt::Display for TypeConstructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl HasKind for TypeConstructor {
    fn kind(&self) -> &Kind {
        &self.kind
    }
}
