use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;

const VARS: usize = 3;

fn monomial() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..6, VARS)
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 8)]
    Insert(#[proptest(strategy = "monomial()")] Vec<u8>),
    #[proptest(weight = 2)]
    InsertReduce(#[proptest(strategy = "monomial()")] Vec<u8>),
    #[proptest(weight = 6)]
    FindDivisor(#[proptest(strategy = "monomial()")] Vec<u8>),
    #[proptest(weight = 3)]
    FindAll(#[proptest(strategy = "monomial()")] Vec<u8>),
    #[proptest(weight = 2)]
    RemoveMultiples(#[proptest(strategy = "monomial()")] Vec<u8>),
    #[proptest(weight = 1)]
    Rebuild,
}

fn divides(a: &[u8], b: &[u8]) -> bool {
    a.iter().zip(b).all(|(x, y)| x <= y)
}

fn sorted(mut v: Vec<Vec<u8>>) -> Vec<Vec<u8>> {
    v.sort();
    v
}

/// Runs `ops` against `finder` and a plain `Vec` holding the same entries.
fn check_against_model<F>(finder: &mut F, ops: Vec<Op>) -> Result<Vec<Vec<u8>>, TestCaseError>
where
    F: DivFinder,
    F::Config: DivisorConfig<Entry = Vec<u8>, Monomial = [u8]>,
{
    let mut model: Vec<Vec<u8>> = Vec::new();

    for op in ops {
        match op {
            Op::Insert(m) => {
                finder.insert(m.clone());
                model.push(m);
            }
            Op::InsertReduce(m) => {
                let expected = !model.iter().any(|e| divides(e, &m));
                prop_assert_eq!(finder.insert_reduce(m.clone()), expected);
                if expected {
                    model.retain(|e| !divides(&m, e));
                    model.push(m);
                }
            }
            Op::FindDivisor(q) => match finder.find_divisor(&q) {
                Some(found) => {
                    prop_assert!(divides(found, &q), "{:?} does not divide {:?}", found, q);
                    prop_assert!(model.contains(found));
                }
                None => {
                    prop_assert!(!model.iter().any(|e| divides(e, &q)));
                }
            },
            Op::FindAll(q) => {
                let mut got: Vec<Vec<u8>> = Vec::new();
                finder.find_all_divisors(&q, |e| {
                    got.push(e.clone());
                    std::ops::ControlFlow::Continue(())
                });
                let expected: Vec<Vec<u8>> =
                    model.iter().filter(|e| divides(e, &q)).cloned().collect();
                prop_assert_eq!(sorted(got), sorted(expected));
            }
            Op::RemoveMultiples(q) => {
                let mut removed: Vec<Vec<u8>> = Vec::new();
                let count = finder.remove_multiples_with(&q, |e| removed.push(e));
                let before = model.len();
                model.retain(|e| !divides(&q, e));
                prop_assert_eq!(count, before - model.len());
                prop_assert_eq!(removed.len(), count);
                prop_assert!(removed.iter().all(|e| divides(&q, e)));
                // A second pass has nothing left to remove.
                prop_assert_eq!(finder.remove_multiples(&q), 0);
            }
            Op::Rebuild => finder.rebuild(),
        }
        prop_assert_eq!(finder.len(), model.len());
    }
    Ok(model)
}

fn tree_options(
    leaf_size: usize,
    sort: bool,
    cache: bool,
    rebuild_min: Option<usize>,
) -> KDTreeOptions {
    KDTreeOptions::default()
        .with_leaf_size(leaf_size)
        .with_sort_on_insert(sort)
        .with_divisor_cache(cache)
        .with_rebuild(rebuild_min.map(|min| RebuildPolicy { ratio: 0.5, min }))
}

fn check_tree<const MASK: bool, const TREE_MASK: bool>(
    options: KDTreeOptions,
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let conf: BasicConfig<u8, MASK, TREE_MASK> = BasicConfig::new(VARS);
    let mut tree = KDTree::new(conf, options);
    let model = check_against_model(&mut tree, ops)?;
    tree.check_invariants();

    let entries: Vec<Vec<u8>> = tree.iter().cloned().collect();
    prop_assert_eq!(sorted(entries), sorted(model.clone()));
    let backward: Vec<Vec<u8>> = tree.iter().rev().cloned().collect();
    prop_assert_eq!(backward.len(), model.len());

    // Rebuilding does not change the stored multiset.
    tree.rebuild();
    tree.check_invariants();
    let entries: Vec<Vec<u8>> = tree.iter().cloned().collect();
    prop_assert_eq!(sorted(entries), sorted(model));
    Ok(())
}

fn check_list<const MASK: bool>(sort: bool, ops: Vec<Op>) -> Result<(), TestCaseError> {
    let conf: BasicConfig<u8, MASK> = BasicConfig::new(VARS);
    let options = DivListOptions {
        sort_on_insert: sort,
        rebuild: Some(RebuildPolicy { ratio: 0.5, min: 4 }),
    };
    let mut list = DivList::new(conf, options);
    let model = check_against_model(&mut list, ops)?;
    let entries: Vec<Vec<u8>> = list.iter().cloned().collect();
    prop_assert_eq!(sorted(entries), sorted(model));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_tree_without_masks(
        ops in prop::collection::vec(any::<Op>(), 0..=400),
        leaf_size in 2usize..6,
    ) {
        check_tree::<false, false>(tree_options(leaf_size, false, true, Some(8)), ops)?;
    }

    #[test]
    fn prop_tree_with_masks(
        ops in prop::collection::vec(any::<Op>(), 0..=400),
        leaf_size in 2usize..6,
    ) {
        check_tree::<true, false>(tree_options(leaf_size, true, true, Some(8)), ops)?;
    }

    #[test]
    fn prop_tree_with_tree_masks(
        ops in prop::collection::vec(any::<Op>(), 0..=400),
        leaf_size in 2usize..6,
    ) {
        check_tree::<true, true>(tree_options(leaf_size, false, false, None), ops)?;
    }

    #[test]
    fn prop_tree_sorted_tree_masks(ops in prop::collection::vec(any::<Op>(), 0..=400)) {
        check_tree::<true, true>(tree_options(3, true, true, Some(4)), ops)?;
    }

    #[test]
    fn prop_list(ops in prop::collection::vec(any::<Op>(), 0..=400), sort in any::<bool>()) {
        check_list::<true>(sort, ops.clone())?;
        check_list::<false>(sort, ops)?;
    }

    /// Without the cache, the tree answers with the first divisor in its
    /// own iteration order.
    #[test]
    fn prop_first_divisor_in_iteration_order(
        entries in prop::collection::vec(monomial(), 0..200),
        queries in prop::collection::vec(monomial(), 1..50),
    ) {
        let conf: BasicConfig<u8, true, true> = BasicConfig::new(VARS);
        let tree = KDTree::from_entries(conf, tree_options(4, true, false, None), entries);
        for q in &queries {
            let expected = tree.iter().find(|e| divides(e, q));
            prop_assert_eq!(tree.find_divisor(q), expected);
        }
    }
}

#[test]
fn exhaustive_small_grid() {
    // Every monomial in {0,1,2}^3, inserted one at a time in two orders.
    let mut all = Vec::new();
    for a in 0..3u8 {
        for b in 0..3u8 {
            for c in 0..3u8 {
                all.push(vec![a, b, c]);
            }
        }
    }
    let mut reversed = all.clone();
    reversed.reverse();

    for order in [all.clone(), reversed] {
        let conf: BasicConfig<u8, true, true> = BasicConfig::new(VARS);
        let mut tree = KDTree::new(conf, tree_options(2, false, true, Some(5)));
        for m in order {
            tree.insert(m);
            tree.check_invariants();
        }
        for q in &all {
            let count = all.iter().filter(|e| divides(e, q)).count();
            assert_eq!(tree.divisors(q).len(), count, "{q:?}");
            assert!(tree.find_divisor(q).is_some());
        }
        for q in &all {
            tree.remove_multiples(q);
            tree.check_invariants();
            assert!(tree.iter().all(|e| !divides(q, e)));
        }
        assert!(tree.is_empty());
    }
}
