//! The microtask queue: one strict FIFO of deferred work per thread.
//!
//! Every reaction of every promise on a thread goes through this queue. Nothing
//! runs until a driver drains it, either [`run`] directly or by polling a
//! [`Promise`](crate::Promise) as a future.
//!
//! ```
//! use promise_out::microtask;
//! use std::{cell::RefCell, rc::Rc};
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let l = log.clone();
//! microtask::enqueue(move || l.borrow_mut().push("deferred"));
//! log.borrow_mut().push("sync");
//! microtask::run();
//! assert_eq!(*log.borrow(), vec!["sync", "deferred"]);
//! ```
use crate::Error;
use std::{cell::RefCell, collections::VecDeque, fmt};

pub type Microtask = Box<dyn FnOnce()>;

#[derive(Default)]
pub struct MicrotaskQueue {
    tasks: VecDeque<Microtask>,
    total_enqueued: u64,
}

impl MicrotaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Microtask) {
        self.tasks.push_back(task);
        self.total_enqueued += 1;
    }

    pub fn pop(&mut self) -> Option<Microtask> {
        self.tasks.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn total_enqueued(&self) -> u64 {
        self.total_enqueued
    }
}

impl fmt::Debug for MicrotaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MicrotaskQueue")
            .field("pending", &self.tasks.len())
            .field("total_enqueued", &self.total_enqueued)
            .finish()
    }
}

thread_local! {
    static QUEUE: RefCell<MicrotaskQueue> = RefCell::new(MicrotaskQueue::new());
}

/// Defer `task` until the current synchronous work has finished and every task
/// queued before it has run.
pub fn enqueue<F>(task: F)
where
    F: FnOnce() + 'static,
{
    QUEUE.with(|queue| queue.borrow_mut().push(Box::new(task)));
}

// The borrow ends before the task runs so tasks can enqueue more tasks.
fn next() -> Option<Microtask> {
    QUEUE.with(|queue| queue.borrow_mut().pop())
}

/// Drain the queue, including anything enqueued while draining. Returns the
/// number of tasks that ran.
///
/// A panicking task aborts the drain; later tasks stay queued and a promise the
/// task would have settled stays pending.
pub fn run() -> usize {
    let mut ran = 0;
    while let Some(task) = next() {
        task();
        ran += 1;
    }
    if ran > 0 {
        tracing::trace!(ran, "microtask queue drained");
    }
    ran
}

/// Like [`run`], but stops after `budget` tasks. Running out of budget with work
/// still queued is an error; the remaining tasks stay queued in order.
pub fn run_with_budget(budget: usize) -> Result<usize, Error> {
    let mut ran = 0;
    while ran < budget {
        match next() {
            Some(task) => {
                task();
                ran += 1;
            }
            None => return Ok(ran),
        }
    }
    let remaining = pending();
    if remaining > 0 {
        tracing::debug!(budget, remaining, "microtask budget exhausted");
        return Err(Error::BudgetExhausted { budget, remaining });
    }
    Ok(ran)
}

/// Tasks currently waiting in this thread's queue.
pub fn pending() -> usize {
    QUEUE.with(|queue| queue.borrow().pending_count())
}

/// Tasks ever enqueued on this thread.
pub fn total_enqueued() -> u64 {
    QUEUE.with(|queue| queue.borrow().total_enqueued())
}
