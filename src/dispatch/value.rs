//! Values passed to and returned from operation bodies.
//!
//! Witnesses are resolved against [`Type`](super::Type)s, but invoked with runtime
//! values; this is the small dynamic universe the bodies work over.

use super::InvokeError;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unit,
    /// A missing reference, e.g. a null array.
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(String),
    Array(Vec<Value>),
    Tuple(Vec<Value>),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Tuple(_) => "tuple",
        }
    }

    fn mismatch(&self, expected: &'static str) -> InvokeError {
        InvokeError::TypeMismatch {
            expected,
            found: self.kind_name().into(),
        }
    }

    pub fn as_bool(&self) -> Result<bool, InvokeError> {
        match self {
            Value::Bool(b) => Ok(*b),
            v => Err(v.mismatch("bool")),
        }
    }

    pub fn as_int(&self) -> Result<i64, InvokeError> {
        match self {
            Value::Int(i) => Ok(*i),
            v => Err(v.mismatch("int")),
        }
    }

    pub fn as_double(&self) -> Result<f64, InvokeError> {
        match self {
            Value::Double(d) => Ok(*d),
            v => Err(v.mismatch("double")),
        }
    }

    pub fn as_str(&self) -> Result<&str, InvokeError> {
        match self {
            Value::Str(s) => Ok(s),
            v => Err(v.mismatch("string")),
        }
    }

    /// `None` for a null array.
    pub fn as_array(&self) -> Result<Option<&[Value]>, InvokeError> {
        match self {
            Value::Array(items) => Ok(Some(items)),
            Value::Null => Ok(None),
            v => Err(v.mismatch("array")),
        }
    }

    pub fn as_tuple(&self) -> Result<&[Value], InvokeError> {
        match self {
            Value::Tuple(items) => Ok(items),
            v => Err(v.mismatch("tuple")),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{}", d),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Array(items) | Value::Tuple(items) => {
                let (open, close) = match self {
                    Value::Array(_) => ("[", "]"),
                    _ => ("(", ")"),
                };
                write!(f, "{}", open)?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "{}", close)
            }
        }
    }
}
