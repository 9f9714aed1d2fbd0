//! The dynamic value model.
//!
//! Outcomes and reasons can be any value a host program produces, including
//! another deferred value or a foreign object that only looks like one.
//! [`Value`] is the closed set of shapes the engine understands. The order in
//! which the engine inspects a value is fixed: its own [`Deferred`] type
//! first, then [`Thenable`] objects, then everything else as a plain value.

use crate::deferred::{Callback, Deferred};
use crate::error::Error;

use std::fmt;
use std::sync::Arc;

/// A foreign object exposing a callable `then`.
///
/// Implementations are untrusted. They may call either callback any number
/// of times, synchronously or later, or never. They may also fail after
/// having already called back. The engine guards against all of that.
pub trait Thenable: Send + Sync {
    /// Registers continuation callbacks on the foreign object.
    ///
    /// Returning `Err(reason)` means reading or invoking `then` raised
    /// `reason` synchronously.
    fn then(&self, on_fulfilled: Callback, on_rejected: Callback) -> Result<(), Value>;
}

/// Any value that can be an outcome or a failure reason.
#[derive(Clone, Default)]
pub enum Value {
    /// No value; what `()` converts to.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Arc<str>),

    /// An error, usually a rejection reason made by the engine.
    Error(Error),

    /// Another deferred value, adopted when used as a success value.
    Deferred(Deferred),

    /// A foreign object with a `then`, unwrapped when returned from a
    /// handler.
    Thenable(Arc<dyn Thenable>),
}

impl Value {
    /// Wraps a foreign thenable.
    pub fn thenable<T: Thenable + 'static>(thenable: T) -> Self {
        Value::Thenable(Arc::new(thenable))
    }

    /// Returns `true` for [`Value::Undefined`].
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// The number, if this is a [`Value::Number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean, if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The string, if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The error, if this is a [`Value::Error`].
    pub fn as_error(&self) -> Option<&Error> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    /// The deferred value, if this is a [`Value::Deferred`].
    pub fn as_deferred(&self) -> Option<&Deferred> {
        match self {
            Value::Deferred(d) => Some(d),
            _ => None,
        }
    }

    /// Short name of the variant, used in log records.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Error(_) => "error",
            Value::Deferred(_) => "deferred",
            Value::Thenable(_) => "thenable",
        }
    }
}

impl PartialEq for Value {
    /// Plain variants compare structurally, deferred values and thenables
    /// compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Deferred(a), Value::Deferred(b)) => a.ptr_eq(b),
            (Value::Thenable(a), Value::Thenable(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Error(e) => write!(f, "Error({e})"),
            Value::Deferred(d) => write!(f, "{d:?}"),
            Value::Thenable(_) => write!(f, "Thenable"),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Undefined
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

/// Numbers are `f64`, so magnitudes above 2^53 lose precision.
///
/// ```rust
/// use deferral::Value;
///
/// assert_eq!(Value::from(1_i64 << 53), Value::from(9_007_199_254_740_992.0));
/// assert_eq!(Value::from((1_i64 << 53) + 1), Value::from(1_i64 << 53));
/// ```
impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<Error> for Value {
    fn from(e: Error) -> Self {
        Value::Error(e)
    }
}

impl From<Deferred> for Value {
    fn from(d: Deferred) -> Self {
        Value::Deferred(d)
    }
}
