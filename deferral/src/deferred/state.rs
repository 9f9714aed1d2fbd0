use crate::value::Value;

/// Lifecycle of a deferred value.
///
/// The only transitions are `Pending -> Fulfilled` and
/// `Pending -> Rejected`, each taken at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Not settled yet.
    Pending,

    /// Settled with a success value.
    Fulfilled,

    /// Settled with a failure reason.
    Rejected,
}

/// The settled outcome of a deferred value.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Settled with this success value.
    Fulfilled(Value),

    /// Settled with this failure reason.
    Rejected(Value),
}

impl Outcome {
    /// The state this outcome settled into.
    pub fn state(&self) -> State {
        match self {
            Outcome::Fulfilled(_) => State::Fulfilled,
            Outcome::Rejected(_) => State::Rejected,
        }
    }

    /// The success value or failure reason.
    pub fn value(&self) -> &Value {
        match self {
            Outcome::Fulfilled(value) | Outcome::Rejected(value) => value,
        }
    }

    /// Returns `true` for a success value.
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Outcome::Fulfilled(_))
    }

    /// Returns `true` for a failure reason.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    /// `Ok(value)` if fulfilled, `Err(reason)` if rejected.
    pub fn into_result(self) -> Result<Value, Value> {
        match self {
            Outcome::Fulfilled(value) => Ok(value),
            Outcome::Rejected(reason) => Err(reason),
        }
    }
}
