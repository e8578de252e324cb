//! Constructors that build one promise out of values or other promises.
use crate::{Error, IntoResolution, Promise};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

impl<T, E> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + From<Error> + 'static,
{
    /// A promise resolved with `value`. Promises and thenables are adopted.
    pub fn resolve(value: impl IntoResolution<T, E>) -> Self {
        Self::new(|resolve, _| {
            resolve.resolve(value);
            Ok(())
        })
    }

    pub fn reject(reason: E) -> Self {
        Self::new(|_, reject| {
            reject.reject(reason);
            Ok(())
        })
    }

    /// Fulfils with every value, in input order, once all inputs fulfil. Rejects
    /// with the first rejection. An empty input fulfils with an empty `Vec`.
    ///
    /// ```
    /// use promise_out::Promise;
    /// use futures::executor::block_on;
    ///
    /// let all = Promise::all(vec![
    ///     Promise::<i32, String>::resolve(1),
    ///     Promise::resolve(2),
    ///     Promise::resolve(3),
    /// ]);
    /// assert_eq!(block_on(all), Ok(vec![1, 2, 3]));
    /// ```
    pub fn all<I>(promises: I) -> Promise<Vec<T>, E>
    where
        I: IntoIterator<Item = Promise<T, E>>,
    {
        let promises: Vec<_> = promises.into_iter().collect();
        Promise::new(move |resolve, reject| {
            let total = promises.len();
            if total == 0 {
                resolve.resolve(Vec::<T>::new());
                return Ok(());
            }
            let slots: Rc<RefCell<Vec<Option<T>>>> = Rc::new(RefCell::new(vec![None; total]));
            let remaining = Rc::new(Cell::new(total));
            for (index, promise) in promises.into_iter().enumerate() {
                let slots = slots.clone();
                let remaining = remaining.clone();
                let resolve = resolve.clone();
                let reject = reject.clone();
                promise.subscribe(move |outcome| match outcome {
                    Ok(value) => {
                        slots.borrow_mut()[index] = Some(value);
                        remaining.set(remaining.get() - 1);
                        if remaining.get() == 0 {
                            let values: Vec<T> = slots.borrow_mut().drain(..).flatten().collect();
                            resolve.resolve(values);
                        }
                    }
                    Err(reason) => reject.reject(reason),
                });
            }
            Ok(())
        })
    }

    /// Settles like whichever input settles first. Later settlements are
    /// ignored. An empty input never settles.
    pub fn race<I>(promises: I) -> Self
    where
        I: IntoIterator<Item = Promise<T, E>>,
    {
        Self::new(|resolve, reject| {
            for promise in promises {
                let resolve = resolve.clone();
                let reject = reject.clone();
                promise.subscribe(move |outcome| match outcome {
                    Ok(value) => resolve.resolve(value),
                    Err(reason) => reject.reject(reason),
                });
            }
            Ok(())
        })
    }

    /// Fulfils with every outcome, in input order, once all inputs settle.
    /// Never rejects.
    pub fn all_settled<I>(promises: I) -> Promise<Vec<Result<T, E>>, E>
    where
        I: IntoIterator<Item = Promise<T, E>>,
    {
        let promises: Vec<_> = promises.into_iter().collect();
        Promise::new(move |resolve, _| {
            let total = promises.len();
            if total == 0 {
                resolve.resolve(Vec::<Result<T, E>>::new());
                return Ok(());
            }
            let slots: Rc<RefCell<Vec<Option<Result<T, E>>>>> =
                Rc::new(RefCell::new(vec![None; total]));
            let remaining = Rc::new(Cell::new(total));
            for (index, promise) in promises.into_iter().enumerate() {
                let slots = slots.clone();
                let remaining = remaining.clone();
                let resolve = resolve.clone();
                promise.subscribe(move |outcome| {
                    slots.borrow_mut()[index] = Some(outcome);
                    remaining.set(remaining.get() - 1);
                    if remaining.get() == 0 {
                        let outcomes: Vec<Result<T, E>> = slots.borrow_mut().drain(..).flatten().collect();
                        resolve.resolve(outcomes);
                    }
                });
            }
            Ok(())
        })
    }
}
