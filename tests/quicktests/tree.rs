use search_tree::{Tree, TreeError};

use std::collections::HashSet;

/// Builds a tree by inserting every key in `xs`, in order.
fn tree_of(xs: &[i8]) -> Tree<i8> {
    let mut tree = Tree::new();
    for x in xs {
        tree.insert(*x);
    }
    tree
}

quickcheck::quickcheck! {
    fn in_order_is_sorted(xs: Vec<i8>) -> bool {
        let tree = tree_of(&xs);
        let keys: Vec<_> = tree.iter().copied().collect();

        let mut sorted = xs;
        sorted.sort_unstable();
        keys == sorted
    }

    fn size_counts_reachable_nodes(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
        let mut tree = tree_of(&xs);
        for delete in &deletes {
            tree.delete(delete);
        }

        tree.check_invariants().is_ok()
            && tree.len() == tree.pre_order().len()
            && tree.len() == tree.iter().count()
    }

    fn children_point_back_at_their_parent(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
        let mut tree = tree_of(&xs);
        for delete in &deletes {
            tree.delete(delete);
        }

        let mut stack: Vec<_> = tree.root().into_iter().collect();
        let mut consistent = tree.root().map_or(true, |root| root.parent().is_none());
        while let Some(node) = stack.pop() {
            for child in [node.left(), node.right()].into_iter().flatten() {
                consistent &= child.parent().map_or(false, |p| std::ptr::eq(p, node));
                stack.push(child);
            }
        }
        consistent
    }

    fn contains(xs: Vec<i8>) -> bool {
        let tree = tree_of(&xs);

        xs.iter().all(|x| tree.contains(x) && tree.search(x).map(|n| n.key()) == Some(x))
    }

    fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
        let tree = tree_of(&xs);
        let added: HashSet<_> = xs.into_iter().collect();
        let nots: HashSet<_> = nots.into_iter().collect();
        let mut nots = nots.difference(&added);

        nots.all(|x| tree.search(x).is_none())
    }

    fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
        let mut tree = tree_of(&xs);

        let mut still_present = xs;
        for delete in &deletes {
            // We may have inserted the same value multiple times - delete one copy at a time.
            let removed = tree.delete(delete).map(|removed| removed.key);
            match still_present.iter().position(|x| x == delete) {
                Some(pos) => {
                    still_present.swap_remove(pos);
                    if removed != Some(*delete) {
                        return false;
                    }
                }
                None if removed.is_some() => return false,
                None => {}
            }
        }

        still_present.iter().all(|x| tree.contains(x))
            && deletes.iter().filter(|x| !still_present.contains(*x)).all(|x| !tree.contains(x))
            && tree.len() == still_present.len()
    }

    fn deleting_a_missing_key_changes_nothing(xs: Vec<i8>, missing: i8) -> bool {
        let xs: Vec<_> = xs.into_iter().filter(|x| *x != missing).collect();
        let mut tree = tree_of(&xs);
        let before: Vec<_> = tree.pre_order().into_iter().copied().collect();

        tree.delete(&missing).is_none()
            && tree.len() == xs.len()
            && tree.pre_order().into_iter().copied().collect::<Vec<_>>() == before
    }

    fn insert_then_delete_round_trips(xs: Vec<i8>, x: i8) -> bool {
        let xs: Vec<_> = xs.into_iter().filter(|key| *key != x).collect();
        let mut tree = tree_of(&xs);
        let before: Vec<_> = tree.pre_order().into_iter().copied().collect();

        tree.insert(x);
        let removed = tree.delete(&x).map(|removed| removed.key);

        removed == Some(x)
            && tree.len() == xs.len()
            && tree.pre_order().into_iter().copied().collect::<Vec<_>>() == before
    }

    fn successor_is_the_next_larger_key(xs: Vec<i8>) -> bool {
        let tree = tree_of(&xs);

        xs.iter().all(|x| {
            let next_larger = xs.iter().filter(|y| *y > x).min();
            match (tree.successor(x), next_larger) {
                (Ok(successor), Some(expected)) => successor == expected,
                (Err(TreeError::NoSuccessor), None) => true,
                _ => false,
            }
        })
    }

    fn minimum_and_maximum(xs: Vec<i8>) -> bool {
        let tree = tree_of(&xs);

        match (xs.iter().min(), xs.iter().max()) {
            (Some(min), Some(max)) => tree.minimum() == Ok(min) && tree.maximum() == Ok(max),
            _ => {
                tree.minimum() == Err(TreeError::EmptyTree)
                    && tree.maximum() == Err(TreeError::EmptyTree)
            }
        }
    }

    fn clone_is_independent(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
        let tree = tree_of(&xs);
        let mut copy = tree.clone();
        for delete in &deletes {
            copy.delete(delete);
        }

        let fresh = tree_of(&xs);
        copy.check_invariants().is_ok()
            && tree.check_invariants().is_ok()
            && tree.len() == xs.len()
            && tree.pre_order() == fresh.pre_order()
    }
}
