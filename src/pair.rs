use crate::{Error, IntoResolution, Promise};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// The fulfilling half of a settlement pair.
///
/// Calls are ignored once the promise has settled. The pairs handed to a thenable
/// during adoption also share a once-only guard: the first call on either half
/// takes effect and every later call, on any clone, is ignored, even while the
/// promise is still pending.
///
/// # Examples
///
/// ```
/// use promise_out::{microtask, Promise, State};
///
/// let promise = Promise::<String, String>::new(|resolve, reject| {
///     resolve.resolve(String::from("🍓"));
///     reject.reject(String::from("💥"));
///     Ok(())
/// });
/// microtask::run();
/// assert_eq!(promise.state(), State::Fulfilled(String::from("🍓")));
/// ```
pub struct Resolve<T, E> {
    promise: Promise<T, E>,
    spent: Option<Rc<Cell<bool>>>,
}

/// The rejecting half of a settlement pair. See [`Resolve`].
pub struct Reject<T, E> {
    promise: Promise<T, E>,
    spent: Option<Rc<Cell<bool>>>,
}

/// Both halves of a settlement pair, as returned by
/// [`Promise::with_resolvers`].
pub struct Resolvers<T, E> {
    pub resolve: Resolve<T, E>,
    pub reject: Reject<T, E>,
}

/// The executor's pair: gated only by the promise's own state.
pub(crate) fn open<T, E>(promise: &Promise<T, E>) -> (Resolve<T, E>, Reject<T, E>) {
    (
        Resolve {
            promise: promise.clone(),
            spent: None,
        },
        Reject {
            promise: promise.clone(),
            spent: None,
        },
    )
}

/// A fresh adoption pair for `promise`, with its own once-only guard.
pub(crate) fn pair<T, E>(promise: &Promise<T, E>) -> (Resolve<T, E>, Reject<T, E>) {
    let spent = Some(Rc::new(Cell::new(false)));
    (
        Resolve {
            promise: promise.clone(),
            spent: spent.clone(),
        },
        Reject {
            promise: promise.clone(),
            spent,
        },
    )
}

impl<T, E> Resolve<T, E>
where
    T: Clone + 'static,
    E: Clone + From<Error> + 'static,
{
    /// Resolve with a plain value, a promise or a thenable. Thenables are adopted:
    /// the promise stays pending until they settle.
    pub fn resolve(&self, value: impl IntoResolution<T, E>) {
        if spend(&self.spent) {
            return;
        }
        self.promise.resolve_with(value);
    }
}

impl<T, E> Reject<T, E>
where
    T: Clone + 'static,
    E: Clone + From<Error> + 'static,
{
    /// Reject with `reason`. Reasons are never unwrapped.
    pub fn reject(&self, reason: E) {
        if spend(&self.spent) {
            return;
        }
        self.promise.reject_with(reason);
    }
}

// True when a guarded pair has already fired.
fn spend(spent: &Option<Rc<Cell<bool>>>) -> bool {
    spent.as_ref().map_or(false, |spent| spent.replace(true))
}

fn is_spent<T, E>(promise: &Promise<T, E>, spent: &Option<Rc<Cell<bool>>>) -> bool {
    promise.is_settled() || spent.as_ref().map_or(false, |spent| spent.get())
}

impl<T, E> Resolve<T, E> {
    /// Whether further calls are ignored: the promise has settled, or this is a
    /// guarded pair that has already fired.
    pub fn is_spent(&self) -> bool {
        is_spent(&self.promise, &self.spent)
    }
}

impl<T, E> Reject<T, E> {
    pub fn is_spent(&self) -> bool {
        is_spent(&self.promise, &self.spent)
    }
}

impl<T, E> Clone for Resolve<T, E> {
    fn clone(&self) -> Self {
        Self {
            promise: self.promise.clone(),
            spent: self.spent.clone(),
        }
    }
}

impl<T, E> Clone for Reject<T, E> {
    fn clone(&self) -> Self {
        Self {
            promise: self.promise.clone(),
            spent: self.spent.clone(),
        }
    }
}

impl<T, E> Clone for Resolvers<T, E> {
    fn clone(&self) -> Self {
        Self {
            resolve: self.resolve.clone(),
            reject: self.reject.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Resolve<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolve").field("spent", &self.is_spent()).finish()
    }
}

impl<T, E> fmt::Debug for Reject<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reject").field("spent", &self.is_spent()).finish()
    }
}

impl<T, E> fmt::Debug for Resolvers<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolvers")
            .field("spent", &self.resolve.is_spent())
            .finish()
    }
}
