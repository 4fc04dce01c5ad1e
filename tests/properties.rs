//! Property tests for container operations.

use array_state::{create, Operation, Options};
use proptest::prelude::*;

proptest! {
    #[test]
    fn push_appends_without_aliasing(s in prop::collection::vec(any::<i32>(), 0..32), e in any::<i32>()) {
        let array = create(s.clone(), Options::default());
        let before = array.current();

        array.push(e);

        let mut expected = s.clone();
        expected.push(e);
        prop_assert_eq!(&*array.current(), &expected);
        prop_assert_eq!(&*before, &s);
    }

    #[test]
    fn remove_member_drops_first_occurrence(
        s in prop::collection::vec(0..8i32, 1..32),
        pick in any::<prop::sample::Index>(),
    ) {
        let e = s[pick.index(s.len())];
        let array = create(s.clone(), Options::default());

        prop_assert!(array.remove(&e));

        let mut expected = s.clone();
        let first = s.iter().position(|x| *x == e).unwrap();
        expected.remove(first);
        prop_assert_eq!(&*array.current(), &expected);
    }

    #[test]
    fn remove_non_member_is_noop(s in prop::collection::vec(0..8i32, 0..32), e in 8..16i32) {
        let array = create(s.clone(), Options::default());
        prop_assert!(!array.remove(&e));
        prop_assert_eq!(&*array.current(), &s);
    }

    #[test]
    fn clear_empties(s in prop::collection::vec(any::<u8>(), 0..32)) {
        let array = create(s, Options::default());
        array.clear();
        prop_assert!(array.is_empty());
    }

    #[test]
    fn update_replaces_one_position(
        s in prop::collection::vec(any::<i32>(), 1..32),
        pick in any::<prop::sample::Index>(),
        v in any::<i32>(),
    ) {
        let i = pick.index(s.len());
        let array = create(s.clone(), Options::default());

        array.update(i, v).unwrap();

        let mut expected = s.clone();
        expected[i] = v;
        prop_assert_eq!(&*array.current(), &expected);
    }

    #[test]
    fn filter_keeps_matching_subsequence(s in prop::collection::vec(any::<i32>(), 0..32), m in 1..5i32) {
        let array = create(s.clone(), Options::default());

        array.filter(|x, _, _| x % m == 0);

        let expected: Vec<i32> = s.into_iter().filter(|x| x % m == 0).collect();
        prop_assert_eq!(&*array.current(), &expected);
    }

    #[test]
    fn history_tracks_pre_call_state(ops in prop::collection::vec(0..5u8, 1..16)) {
        let array = create(vec![1, 2, 3], Options::with_history());

        for (n, op) in ops.iter().enumerate() {
            let before = array.current().to_vec();
            let tag = match op {
                0 => { array.push(n as i32); Operation::Push }
                1 => { array.remove(&(n as i32)); Operation::Remove }
                2 => { array.filter(|x, _, _| x % 2 == 1); Operation::Filter }
                3 => { array.clear(); Operation::Clear }
                _ => {
                    if before.is_empty() {
                        array.push(0);
                        Operation::Push
                    } else {
                        array.update(0, -1).unwrap();
                        Operation::Update
                    }
                }
            };

            let history = array.history().unwrap();
            prop_assert_eq!(history.len(), n + 2);
            let last = history.last().unwrap();
            prop_assert_eq!(last.operation, Some(tag));
            prop_assert_eq!(&*last.snapshot, &before);
        }
    }
}
