use crate::tree::{AvlTree, NodeId};

use proptest::prelude::*;
use std::collections::BTreeMap;

/// Walks the whole tree and checks order, cached heights, balance and count.
pub(crate) fn validate_tree<V>(t: &AvlTree<V>) {
    // Returns the subtree height.
    fn check<V>(
        t: &AvlTree<V>,
        id: NodeId,
        lo: Option<&str>,
        hi: Option<&str>,
        seen: &mut usize,
    ) -> u8 {
        if id.is_nil() {
            return 0;
        }
        *seen += 1;

        let node = &t.nodes[id];
        let key = node.key.as_str();
        if let Some(lo) = lo {
            assert!(lo < key, "key {key:?} must be greater than ancestor {lo:?}");
        }
        if let Some(hi) = hi {
            assert!(key < hi, "key {key:?} must be less than ancestor {hi:?}");
        }

        let lh = check(t, node.left, lo, Some(key), seen);
        let rh = check(t, node.right, Some(key), hi, seen);
        assert!(
            (i16::from(lh) - i16::from(rh)).abs() <= 1,
            "node {key:?} is unbalanced: left {lh}, right {rh}"
        );
        assert_eq!(
            node.height,
            lh.max(rh) + 1,
            "stored height of {key:?} must match children"
        );
        node.height
    }

    let mut seen = 0usize;
    let height = check(t, t.root, None, None, &mut seen);
    assert_eq!(height as usize, t.height());
    assert_eq!(seen, t.count, "reachable node count must match AvlTree::len");
    assert_eq!(t.nodes.live(), t.count, "live arena slots must match AvlTree::len");
}

#[derive(Clone, Debug)]
enum Op {
    Insert(String, u64),
    Update(String, u64),
    Remove(String),
    Get(String),
    Compact,
    Clear,
}

fn key_strategy() -> impl Strategy<Value = String> + Clone {
    // A narrow alphabet so inserts collide with existing keys often.
    "[a-f]{0,4}"
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        45 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        10 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Update(k, v)),
        25 => key.clone().prop_map(Op::Remove),
        18 => key.clone().prop_map(Op::Get),
        1 => Just(Op::Compact),
        1 => Just(Op::Clear),
    ];
    prop::collection::vec(op, 0..=1000)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy()) {
        let mut t: AvlTree<u64> = AvlTree::new();
        let mut m: BTreeMap<String, u64> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let inserted = t.insert(&key, value).is_ok();
                    let absent = !m.contains_key(&key);
                    prop_assert_eq!(inserted, absent);
                    m.entry(key).or_insert(value);
                }
                Op::Update(key, value) => {
                    let old_t = t.update(&key, value).ok();
                    let old_m = m.get_mut(&key).map(|slot| std::mem::replace(slot, value));
                    prop_assert_eq!(old_t, old_m);
                }
                Op::Remove(key) => {
                    let old_t = t.remove(&key).ok();
                    let old_m = m.remove(&key);
                    prop_assert_eq!(old_t, old_m);
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.get(&key), m.get(&key));
                }
                Op::Compact => {
                    t.compact();
                }
                Op::Clear => {
                    t.clear();
                    m.clear();
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_tree(&t);
        let got: Vec<(String, u64)> = t.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        let expected: Vec<(String, u64)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_height_is_logarithmic(keys in prop::collection::btree_set("[a-z]{1,8}", 1..=512)) {
        // Sorted input is the worst case for an unbalanced BST.
        let mut t: AvlTree<()> = AvlTree::new();
        for key in &keys {
            t.insert(key, ()).unwrap();
        }
        validate_tree(&t);

        let n = keys.len() as f64;
        let bound = (1.4405 * (n + 2.0).log2() - 0.3277).floor() as usize;
        prop_assert!(t.height() <= bound, "height {} exceeds {} for n={}", t.height(), bound, n);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

const SMALL_SET: [&str; 7] = ["a", "b", "c", "aa", "ab", "ba", "bb"];

#[test]
fn exhaustive_insert_order_small_set() {
    for_each_permutation(&SMALL_SET, |perm| {
        let mut t: AvlTree<u64> = AvlTree::new();
        let mut m: BTreeMap<&str, u64> = BTreeMap::new();

        for (i, k) in perm.into_iter().enumerate() {
            let v = i as u64;
            t.insert(k, v).unwrap();
            m.insert(k, v);
            validate_tree(&t);
        }

        let got: Vec<(&str, u64)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(&str, u64)> = m.into_iter().collect();
        assert_eq!(got, expected);
        assert!(t.height() <= 4);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    // Insert in a fixed order, then remove in all permutations.
    let mut base_tree: AvlTree<u64> = AvlTree::new();
    let mut base_map: BTreeMap<&str, u64> = BTreeMap::new();
    for (i, k) in SMALL_SET.iter().enumerate() {
        let v = i as u64;
        base_tree.insert(k, v).unwrap();
        base_map.insert(*k, v);
    }

    for_each_permutation(&SMALL_SET, |perm| {
        let mut t = base_tree.clone();
        let mut m = base_map.clone();

        for k in perm {
            assert_eq!(t.remove(k).ok(), m.remove(k));
            assert_eq!(t.len(), m.len());
            validate_tree(&t);
        }
        assert_eq!(t.len(), 0);
        assert!(t.root.is_nil());
    });
}
