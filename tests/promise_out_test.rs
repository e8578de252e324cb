#[cfg(test)]
mod tests {
    use futures::executor::{block_on, LocalPool};
    use futures::task::LocalSpawnExt;
    use promise_out::{microtask, PromiseOut};
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn test_promise_out() {
        let promise = PromiseOut::<i32, String>::default();
        let promise_clone = promise.clone();

        microtask::enqueue(move || {
            promise_clone.resolve(42);
        });

        let result = block_on(promise.promise()).unwrap();
        assert_eq!(result, 42);
    }

    #[test]
    fn test_promise_out_reject() {
        let promise = PromiseOut::<i32, String>::new();
        promise.reject("reject!!".into());
        assert_eq!(block_on(promise.promise()), Err("reject!!".to_string()));
    }

    #[test]
    fn test_await_chain_in_async_block() {
        let op = PromiseOut::<String, String>::new();
        let waiter = op
            .promise()
            .and_then::<usize, _, _>(|s: String| Ok::<usize, String>(s.len()));
        op.resolve(String::from("🍓"));
        let len = block_on(async move { waiter.await });
        assert_eq!(len, Ok(4));
    }

    #[test]
    fn test_waker_fires_on_settlement() {
        let mut pool = LocalPool::new();
        let op = PromiseOut::<i32, String>::new();
        let seen: Rc<RefCell<Option<Result<i32, String>>>> = Rc::new(RefCell::new(None));

        let waiter = op.promise();
        let s = seen.clone();
        pool.spawner()
            .spawn_local(async move {
                *s.borrow_mut() = Some(waiter.await);
            })
            .expect("spawn waiter");

        pool.run_until_stalled();
        assert_eq!(*seen.borrow(), None);

        op.resolve(7);
        pool.run_until_stalled();
        assert_eq!(*seen.borrow(), Some(Ok(7)));
    }

    #[test]
    fn test_two_waiters_same_promise() {
        let op = PromiseOut::<String, String>::new();
        let a = op.promise();
        let b = op.promise();
        op.resolve(String::from("🍓"));
        assert_eq!(block_on(a), Ok(String::from("🍓")));
        assert_eq!(block_on(b), Ok(String::from("🍓")));
    }

    #[test]
    fn test_promise_out_adopts_another_promise() {
        let upstream = PromiseOut::<i32, String>::new();
        let op = PromiseOut::<i32, String>::new();
        op.resolve(upstream.promise());
        assert!(!op.is_finished());
        microtask::run();
        assert!(op.promise().is_pending());
        upstream.resolve(5);
        assert_eq!(block_on(op.promise()), Ok(5));
    }
}
