use proptest::prelude::*;
use std::collections::BTreeSet;
use tree23::Tree23;

#[derive(Debug, Clone)]
enum Operation {
    Add(u16),
    Remove(u16),
    Modify(u16, u16),
}

fn arb_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => (0u16..500).prop_map(Operation::Add),
        2 => (0u16..500).prop_map(Operation::Remove),
        1 => (0u16..500, 0u16..500).prop_map(|(which, update)| Operation::Modify(which, update)),
    ]
}

proptest! {
    #[test]
    fn prop_unique_adds_iterate_sorted(values in prop::collection::btree_set(any::<i32>(), 0..300)) {
        let mut shuffled: Vec<i32> = values.iter().copied().collect();
        shuffled.reverse();
        let pivot = shuffled.len() / 3;
        shuffled.rotate_left(pivot);

        let mut tree = Tree23::new();
        for &value in &shuffled {
            prop_assert!(tree.add(value));
        }
        prop_assert_eq!(tree.len(), values.len());
        prop_assert!(tree.validate().is_ok());
        let ordered: Vec<i32> = tree.iter().copied().collect();
        prop_assert_eq!(ordered, values.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn prop_matches_btreeset(ops in prop::collection::vec(arb_operation(), 1..400)) {
        let mut tree = Tree23::new();
        let mut reference = BTreeSet::new();

        for op in ops {
            match op {
                Operation::Add(v) => prop_assert_eq!(tree.add(v), reference.insert(v)),
                Operation::Remove(v) => prop_assert_eq!(tree.remove(&v), reference.remove(&v)),
                Operation::Modify(which, update) => {
                    let present = reference.remove(&which);
                    if present {
                        reference.insert(update);
                    }
                    prop_assert_eq!(tree.modify(&which, update), present);
                }
            }
            if let Err(e) = tree.validate() {
                return Err(TestCaseError::fail(format!("invariant violated: {}", e)));
            }
            prop_assert_eq!(tree.len(), reference.len());
            prop_assert_eq!(tree.find_min(), reference.first());
            prop_assert_eq!(tree.find_max(), reference.last());
        }
        prop_assert!(tree.iter().eq(reference.iter()));
    }

    #[test]
    fn prop_remove_absent_is_noop(
        values in prop::collection::btree_set(0u32..1000, 0..200),
        probe in 1000u32..2000,
    ) {
        let mut tree: Tree23<u32> = values.iter().copied().collect();
        let before = tree.level_order().into_iter()
            .map(|layer| layer.into_iter().map(|node| node.into_iter().copied().collect::<Vec<_>>()).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        prop_assert!(!tree.remove(&probe));
        prop_assert_eq!(tree.len(), values.len());
        let after = tree.level_order().into_iter()
            .map(|layer| layer.into_iter().map(|node| node.into_iter().copied().collect::<Vec<_>>()).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn prop_clone_is_independent(
        values in prop::collection::vec(0u32..1000, 1..200),
        extra in 1000u32..2000,
    ) {
        let original: Tree23<u32> = values.iter().copied().collect();
        let mut copy = original.clone();
        prop_assert!(copy.validate().is_ok());
        prop_assert!(copy.iter().eq(original.iter()));

        let removed = values[0];
        prop_assert!(copy.remove(&removed));
        prop_assert!(copy.add(extra));
        prop_assert!(original.contains(&removed));
        prop_assert!(!original.contains(&extra));
    }

    #[test]
    fn prop_add_all_safe_is_atomic(
        base in prop::collection::btree_set(0u32..500, 1..100),
        batch in prop::collection::vec(0u32..500, 1..50),
    ) {
        let mut tree: Tree23<u32> = base.iter().copied().collect();
        let mut seen = base.clone();
        let all_new = batch.iter().all(|v| seen.insert(*v));

        prop_assert_eq!(tree.add_all_safe(batch.iter().copied()), all_new);
        prop_assert!(tree.validate().is_ok());
        if all_new {
            prop_assert_eq!(tree.len(), base.len() + batch.len());
        } else {
            prop_assert!(tree.iter().eq(base.iter()));
        }
    }
}
