//! A Promises/A+ style promise for single-threaded cooperative code.
//!
//! A [`Promise`] settles once, either fulfilled with a `T` or rejected with an `E`.
//! Reactions attached with [`Promise::then`] run later, from the thread's
//! [`microtask`] queue, never inside the call that attached them or the call
//! that settled the promise. Values implementing [`IntoResolution`] as a
//! [`Thenable`] are adopted, whoever implemented them.
//!
//! ```
//! use promise_out::{Handler, Promise};
//! use futures::executor::block_on;
//!
//! let chain = Promise::<i32, String>::resolve(5)
//!     .then(Handler::new(|x: i32| Ok(x * 2)), Handler::none())
//!     .then(Handler::new(|_: i32| Err::<i32, _>("err".to_string())), Handler::none())
//!     .then_to::<String, _, _>(
//!         |x: i32| Ok::<String, String>((x + 1).to_string()),
//!         Handler::new(|e: String| Ok::<String, String>(format!("caught:{}", e))),
//!     );
//! assert_eq!(block_on(chain), Ok("caught:err".to_string()));
//! ```
mod combinators;
pub mod microtask;
pub mod pair;
pub mod promise;
pub mod promise_out;
pub mod resolution;

pub use pair::{Reject, Resolve, Resolvers};
pub use promise::{Handler, Promise, State};
pub use promise_out::PromiseOut;
pub use resolution::{IntoResolution, Resolution, Thenable};

/// Errors raised by the crate itself, convertible into a rejection reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A promise was resolved with itself.
    #[error("TypeError: chaining cycle detected for promise")]
    SelfResolution,
    /// [`microtask::run_with_budget`] stopped with work still queued.
    #[error("microtask budget of {budget} exhausted with {remaining} task(s) still queued")]
    BudgetExhausted { budget: usize, remaining: usize },
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
