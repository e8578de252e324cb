//! Property-based tests for settlement ordering.
//!
//! `all` must be positional whatever order its inputs settle in, `race` must follow
//! the earliest settlement, and a promise keeps the first outcome it is given.

use proptest::prelude::*;

use promise_out::{microtask, Promise, PromiseOut, State};

fn values_and_order() -> impl Strategy<Value = (Vec<i64>, Vec<usize>)> {
    prop::collection::vec(any::<i64>(), 0..16).prop_flat_map(|values| {
        let order: Vec<usize> = (0..values.len()).collect();
        (Just(values), Just(order).prop_shuffle())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn all_is_positional_for_any_settlement_order((values, order) in values_and_order()) {
        let outs: Vec<PromiseOut<i64, String>> = values.iter().map(|_| PromiseOut::new()).collect();
        let all = Promise::all(outs.iter().map(|out| out.promise()));

        for index in order {
            outs[index].resolve(values[index]);
            microtask::run();
        }
        microtask::run();

        prop_assert_eq!(all.state(), State::Fulfilled(values.clone()));
    }

    #[test]
    fn race_follows_earliest_settlement(order in Just((0..6usize).collect::<Vec<_>>()).prop_shuffle()) {
        let outs: Vec<PromiseOut<usize, String>> = (0..6).map(|_| PromiseOut::new()).collect();
        let race = Promise::race(outs.iter().map(|out| out.promise()));

        for &index in &order {
            outs[index].resolve(index);
        }
        microtask::run();

        prop_assert_eq!(race.state(), State::Fulfilled(order[0]));
    }

    #[test]
    fn first_outcome_wins(
        first in any::<i32>(),
        reject_first in any::<bool>(),
        rest in prop::collection::vec(any::<i32>(), 0..8),
    ) {
        let out = PromiseOut::<i32, String>::new();
        if reject_first {
            out.reject(first.to_string());
        } else {
            out.resolve(first);
        }
        for value in rest {
            out.resolve(value);
            out.reject(value.to_string());
        }
        microtask::run();

        let expected = if reject_first {
            State::Rejected(first.to_string())
        } else {
            State::Fulfilled(first)
        };
        prop_assert_eq!(out.promise().state(), expected);
    }
}
