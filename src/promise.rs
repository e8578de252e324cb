use crate::pair::{self, Reject, Resolve, Resolvers};
use crate::{microtask, Error, IntoResolution, Resolution};
use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

type Reaction<T, E> = Box<dyn FnOnce(Result<T, E>)>;
type Callback<A, U, E> = Box<dyn FnOnce(A) -> Result<Resolution<U, E>, E>>;

/// A single-resolution, chainable value.
///
/// A `Promise` is a handle: clones observe and settle the same promise. Reactions
/// attached with [`then`](Promise::then) and friends never run inline; they go
/// through the [`microtask`] queue once the promise settles.
///
/// # Examples
///
/// ```
/// use promise_out::{Handler, Promise};
/// use futures::executor::block_on;
///
/// let doubled = Promise::<i32, String>::resolve(21)
///     .then(Handler::new(|x: i32| Ok(x * 2)), Handler::none());
/// assert_eq!(block_on(doubled), Ok(42));
/// ```
pub struct Promise<T, E> {
    inner: Rc<RefCell<Inner<T, E>>>,
}

struct Inner<T, E> {
    status: Status<T, E>,
    wakers: Vec<Waker>,
}

// Reactions only exist while pending; settling moves them out for good.
enum Status<T, E> {
    Pending(Vec<Reaction<T, E>>),
    Fulfilled(T),
    Rejected(E),
}

/// A snapshot of where a promise is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State<T, E> {
    Pending,
    Fulfilled(T),
    Rejected(E),
}

impl<T, E> State<T, E> {
    pub fn is_pending(&self) -> bool {
        matches!(self, State::Pending)
    }

    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(self, State::Fulfilled(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, State::Rejected(_))
    }
}

/// An optional reaction for one branch of [`Promise::then`].
///
/// An absent handler passes the upstream outcome through unchanged.
pub struct Handler<A, U, E> {
    callback: Option<Callback<A, U, E>>,
}

impl<A, U, E> Handler<A, U, E> {
    /// `f` returning `Err` rejects the derived promise. Its `Ok` value is
    /// resolved into the derived promise, adopting it if it is a thenable.
    pub fn new<F, X>(f: F) -> Self
    where
        F: FnOnce(A) -> Result<X, E> + 'static,
        X: IntoResolution<U, E>,
    {
        Self {
            callback: Some(Box::new(move |arg| f(arg)?.into_resolution())),
        }
    }

    pub fn none() -> Self {
        Self { callback: None }
    }

    pub fn is_callable(&self) -> bool {
        self.callback.is_some()
    }
}

impl<A, U, E> Default for Handler<A, U, E> {
    fn default() -> Self {
        Self::none()
    }
}

impl<A, U, E> fmt::Debug for Handler<A, U, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("callable", &self.is_callable())
            .finish()
    }
}

impl<T, E> Promise<T, E> {
    pub(crate) fn pending() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                status: Status::Pending(Vec::new()),
                wakers: Vec::new(),
            })),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.inner.borrow().status, Status::Pending(_))
    }

    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    /// Whether both handles point at the same promise.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone, E: Clone> Promise<T, E> {
    pub fn state(&self) -> State<T, E> {
        match &self.inner.borrow().status {
            Status::Pending(_) => State::Pending,
            Status::Fulfilled(value) => State::Fulfilled(value.clone()),
            Status::Rejected(reason) => State::Rejected(reason.clone()),
        }
    }
}

impl<T, E> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + From<Error> + 'static,
{
    /// Create a promise and run `executor` with its resolvers, synchronously and
    /// exactly once. An `Err` from the executor rejects the promise, unless it
    /// has already settled.
    pub fn new<F>(executor: F) -> Self
    where
        F: FnOnce(Resolve<T, E>, Reject<T, E>) -> Result<(), E>,
    {
        let promise = Self::pending();
        let (resolve, reject) = pair::open(&promise);
        if let Err(reason) = executor(resolve, reject.clone()) {
            reject.reject(reason);
        }
        promise
    }

    /// A pending promise together with the resolvers that settle it.
    ///
    /// ```
    /// use promise_out::{microtask, Promise, State};
    ///
    /// let (promise, resolvers) = Promise::<&str, String>::with_resolvers();
    /// assert_eq!(promise.state(), State::Pending);
    /// resolvers.resolve.resolve("done");
    /// microtask::run();
    /// assert_eq!(promise.state(), State::Fulfilled("done"));
    /// ```
    pub fn with_resolvers() -> (Self, Resolvers<T, E>) {
        let promise = Self::pending();
        let (resolve, reject) = pair::open(&promise);
        (promise, Resolvers { resolve, reject })
    }

    pub(crate) fn resolve_with(&self, value: impl IntoResolution<T, E>) {
        if self.is_settled() {
            return;
        }
        let resolution = match value.into_resolution() {
            Ok(resolution) => resolution,
            Err(reason) => return self.reject_with(reason),
        };
        match resolution {
            Resolution::Value(value) => self.settle(Ok(value)),
            Resolution::Promise(other) if other.ptr_eq(self) => {
                tracing::debug!("promise resolved with itself");
                self.reject_with(Error::SelfResolution.into());
            }
            Resolution::Promise(other) => {
                tracing::trace!("adopting promise");
                let (resolve, reject) = pair::pair(self);
                other.subscribe(move |outcome| match outcome {
                    Ok(value) => resolve.resolve(value),
                    Err(reason) => reject.reject(reason),
                });
            }
            Resolution::Thenable(thenable) => {
                tracing::trace!("adopting thenable");
                let (resolve, reject) = pair::pair(self);
                if let Err(reason) = thenable.then(resolve, reject.clone()) {
                    reject.reject(reason);
                }
            }
        }
    }

    pub(crate) fn reject_with(&self, reason: E) {
        self.settle(Err(reason));
    }

    fn settle(&self, outcome: Result<T, E>) {
        let (reactions, wakers) = {
            let mut inner = self.inner.borrow_mut();
            let reactions = match &mut inner.status {
                Status::Pending(reactions) => std::mem::take(reactions),
                _ => return,
            };
            inner.status = match &outcome {
                Ok(value) => Status::Fulfilled(value.clone()),
                Err(reason) => Status::Rejected(reason.clone()),
            };
            (reactions, std::mem::take(&mut inner.wakers))
        };
        tracing::trace!(
            fulfilled = outcome.is_ok(),
            reactions = reactions.len(),
            "promise settled"
        );
        for reaction in reactions {
            let outcome = outcome.clone();
            microtask::enqueue(move || reaction(outcome));
        }
        for waker in wakers {
            waker.wake();
        }
    }

    /// Run `reaction` with the outcome once settled, always from the microtask
    /// queue and never inline.
    pub(crate) fn subscribe<F>(&self, reaction: F)
    where
        F: FnOnce(Result<T, E>) + 'static,
    {
        let outcome = {
            let mut inner = self.inner.borrow_mut();
            match &mut inner.status {
                Status::Pending(reactions) => {
                    reactions.push(Box::new(reaction));
                    return;
                }
                Status::Fulfilled(value) => Ok(value.clone()),
                Status::Rejected(reason) => Err(reason.clone()),
            }
        };
        microtask::enqueue(move || reaction(outcome));
    }

    fn derive<U, F>(&self, reaction: F) -> Promise<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(Result<T, E>) -> Result<Resolution<U, E>, E> + 'static,
    {
        let downstream = Promise::<U, E>::pending();
        let target = downstream.clone();
        self.subscribe(move |outcome| match reaction(outcome) {
            Ok(resolution) => target.resolve_with(resolution),
            Err(reason) => target.reject_with(reason),
        });
        downstream
    }

    /// Derive a promise settled by whichever handler applies to this promise's
    /// outcome. Absent handlers pass the value or the reason through.
    pub fn then(&self, on_fulfilled: Handler<T, T, E>, on_rejected: Handler<E, T, E>) -> Promise<T, E> {
        self.derive(move |outcome| match outcome {
            Ok(value) => match on_fulfilled.callback {
                Some(callback) => callback(value),
                None => Ok(Resolution::Value(value)),
            },
            Err(reason) => match on_rejected.callback {
                Some(callback) => callback(reason),
                None => Err(reason),
            },
        })
    }

    /// [`then`](Promise::then) with a fulfillment handler that changes the
    /// value type.
    pub fn then_to<U, F, X>(&self, on_fulfilled: F, on_rejected: Handler<E, U, E>) -> Promise<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Result<X, E> + 'static,
        X: IntoResolution<U, E>,
    {
        self.derive(move |outcome| match outcome {
            Ok(value) => on_fulfilled(value)?.into_resolution(),
            Err(reason) => match on_rejected.callback {
                Some(callback) => callback(reason),
                None => Err(reason),
            },
        })
    }

    pub fn and_then<U, F, X>(&self, on_fulfilled: F) -> Promise<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Result<X, E> + 'static,
        X: IntoResolution<U, E>,
    {
        self.then_to(on_fulfilled, Handler::none())
    }

    /// Handle a rejection; fulfilled values pass through.
    pub fn catch<F, X>(&self, on_rejected: F) -> Promise<T, E>
    where
        F: FnOnce(E) -> Result<X, E> + 'static,
        X: IntoResolution<T, E>,
    {
        self.then(Handler::none(), Handler::new(on_rejected))
    }

    /// Run `on_settled` whatever the outcome. The derived promise settles with
    /// what the handler returns; the original value or reason is not restored.
    pub fn finally<F, X>(&self, on_settled: F) -> Promise<T, E>
    where
        F: FnOnce(Result<T, E>) -> Result<X, E> + 'static,
        X: IntoResolution<T, E>,
    {
        self.derive(move |outcome| on_settled(outcome)?.into_resolution())
    }
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.inner.borrow().status {
            Status::Pending(_) => "pending",
            Status::Fulfilled(_) => "fulfilled",
            Status::Rejected(_) => "rejected",
        };
        f.debug_struct("Promise").field("state", &state).finish()
    }
}

/// Awaiting a promise drains the microtask queue first, so anything already
/// scheduled on this thread gets a chance to settle it.
impl<T: Clone, E: Clone> Future for Promise<T, E> {
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.is_pending() {
            microtask::run();
        }
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        match &inner.status {
            Status::Fulfilled(value) => Poll::Ready(Ok(value.clone())),
            Status::Rejected(reason) => Poll::Ready(Err(reason.clone())),
            Status::Pending(_) => {
                if !inner.wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
                    inner.wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}
