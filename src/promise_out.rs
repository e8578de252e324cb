use crate::{Error, IntoResolution, Promise, Reject, Resolve, Resolvers};
use std::fmt;

/// A promise that is settled from the outside.
///
/// `PromiseOut` bundles a pending [`Promise`] with its resolvers, for producers
/// that learn the outcome after the consumer is already waiting. Clones share the
/// same promise; once it settles, further calls are ignored.
///
/// # Examples
///
/// ```
/// use promise_out::PromiseOut;
/// use futures::executor::block_on;
///
/// let op = PromiseOut::<String, String>::new();
/// let waiter = op.promise();
/// op.resolve(String::from("🍓"));
/// assert_eq!(block_on(waiter), Ok(String::from("🍓")));
/// ```
pub struct PromiseOut<T, E> {
    promise: Promise<T, E>,
    resolve: Resolve<T, E>,
    reject: Reject<T, E>,
}

impl<T, E> PromiseOut<T, E>
where
    T: Clone + 'static,
    E: Clone + From<Error> + 'static,
{
    pub fn new() -> Self {
        let (promise, Resolvers { resolve, reject }) = Promise::with_resolvers();
        Self {
            promise,
            resolve,
            reject,
        }
    }

    /// A handle on the promise this producer settles.
    pub fn promise(&self) -> Promise<T, E> {
        self.promise.clone()
    }

    pub fn resolve(&self, value: impl IntoResolution<T, E>) {
        self.resolve.resolve(value)
    }

    pub fn reject(&self, reason: E) {
        self.reject.reject(reason)
    }

    /// Whether the promise has settled. While it adopts a thenable it is not yet
    /// finished, and a direct `resolve` or `reject` still takes effect.
    pub fn is_finished(&self) -> bool {
        self.resolve.is_spent()
    }

    pub fn into_parts(self) -> (Promise<T, E>, Resolvers<T, E>) {
        (
            self.promise,
            Resolvers {
                resolve: self.resolve,
                reject: self.reject,
            },
        )
    }
}

impl<T, E> Default for PromiseOut<T, E>
where
    T: Clone + 'static,
    E: Clone + From<Error> + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for PromiseOut<T, E> {
    fn clone(&self) -> Self {
        Self {
            promise: self.promise.clone(),
            resolve: self.resolve.clone(),
            reject: self.reject.clone(),
        }
    }
}

impl<T, E> fmt::Debug for PromiseOut<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromiseOut")
            .field("promise", &self.promise)
            .field("finished", &self.resolve.is_spent())
            .finish()
    }
}

#[test]
fn test_promise_out_resolve_twice() {
    use crate::{microtask, State};
    let op: PromiseOut<String, String> = PromiseOut::default();
    let op1 = op.clone();
    op1.resolve("Hello".to_owned());
    op.resolve("again".to_owned());
    op.reject("nope".to_owned());
    microtask::run();
    assert!(op.is_finished());
    assert_eq!(op.promise().state(), State::Fulfilled("Hello".to_owned()));
}

#[test]
fn test_promise_out_reject_while_adopting() {
    use crate::{microtask, State};
    let upstream = PromiseOut::<i32, String>::new();
    let op = PromiseOut::<i32, String>::new();
    op.resolve(upstream.promise());
    assert!(!op.is_finished());
    op.reject("direct".to_owned());
    assert!(op.is_finished());
    upstream.resolve(1);
    microtask::run();
    assert_eq!(op.promise().state(), State::Rejected("direct".to_owned()));
}

#[test]
fn test_promise_out_into_parts() {
    use futures::executor::block_on;
    let (promise, resolvers) = PromiseOut::<i32, String>::new().into_parts();
    resolvers.reject.reject("💥".into());
    assert_eq!(block_on(promise), Err("💥".to_string()));
}
