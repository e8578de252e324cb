//! What a promise can be resolved with: a plain value, another promise, or a
//! foreign thenable whose outcome it adopts.
use crate::{Promise, Reject, Resolve};
use std::fmt;

/// The result of probing a resolution value for a chaining capability.
pub enum Resolution<T, E> {
    Value(T),
    Promise(Promise<T, E>),
    Thenable(Box<dyn Thenable<T, E>>),
}

impl<T, E> Resolution<T, E> {
    /// Wrap a closure as a thenable. It is invoked once with a fresh resolver
    /// pair when a promise adopts it.
    pub fn from_fn<F>(then: F) -> Self
    where
        F: FnOnce(Resolve<T, E>, Reject<T, E>) -> Result<(), E> + 'static,
    {
        Resolution::Thenable(Box::new(FnThenable(then)))
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Resolution::Value(_))
    }
}

impl<T: fmt::Debug, E> fmt::Debug for Resolution<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Resolution::Promise(_) => f.write_str("Promise(..)"),
            Resolution::Thenable(_) => f.write_str("Thenable(..)"),
        }
    }
}

/// A value exposing a chaining capability that a promise can adopt.
///
/// `then` receives resolvers sharing a once-only guard: whichever is called first
/// wins and every later call is ignored. Returning `Err` before either resolver
/// fired rejects the adopting promise.
pub trait Thenable<T, E> {
    fn then(self: Box<Self>, resolve: Resolve<T, E>, reject: Reject<T, E>) -> Result<(), E>;
}

struct FnThenable<F>(F);

impl<T, E, F> Thenable<T, E> for FnThenable<F>
where
    F: FnOnce(Resolve<T, E>, Reject<T, E>) -> Result<(), E>,
{
    fn then(self: Box<Self>, resolve: Resolve<T, E>, reject: Reject<T, E>) -> Result<(), E> {
        (self.0)(resolve, reject)
    }
}

/// Probe a value for a chaining capability.
///
/// The probe consumes the value, so it can run at most once per resolution
/// attempt. It may fail: the error rejects the promise being resolved.
pub trait IntoResolution<T, E> {
    fn into_resolution(self) -> Result<Resolution<T, E>, E>;
}

impl<T, E> IntoResolution<T, E> for T {
    fn into_resolution(self) -> Result<Resolution<T, E>, E> {
        Ok(Resolution::Value(self))
    }
}

impl<T, E> IntoResolution<T, E> for Promise<T, E> {
    fn into_resolution(self) -> Result<Resolution<T, E>, E> {
        Ok(Resolution::Promise(self))
    }
}

impl<T, E> IntoResolution<T, E> for Resolution<T, E> {
    fn into_resolution(self) -> Result<Resolution<T, E>, E> {
        Ok(self)
    }
}
