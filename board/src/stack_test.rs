use super::*;

fn id(name: &str) -> ElementId {
    name.to_owned()
}

// =============================================================
// Promotion
// =============================================================

#[test]
fn ranks_start_at_zero() {
    let stack = StackOrder::new();
    assert_eq!(stack.rank(&id("a")), 0);
    assert_eq!(stack.max_rank(), 0);
    assert!(stack.is_empty());
}

#[test]
fn promote_assigns_increasing_ranks() {
    let mut stack = StackOrder::new();
    assert_eq!(stack.promote(&id("a")), 1);
    assert_eq!(stack.promote(&id("b")), 2);
    assert_eq!(stack.promote(&id("c")), 3);
    assert_eq!(stack.max_rank(), 3);
}

#[test]
fn promoted_id_ranks_strictly_above_all_others() {
    let mut stack = StackOrder::new();
    let ids = [id("a"), id("b"), id("c"), id("d")];
    for element in &ids {
        stack.promote(element);
    }
    stack.promote(&ids[1]);
    for other in [&ids[0], &ids[2], &ids[3]] {
        assert!(stack.rank(&ids[1]) > stack.rank(other));
    }
}

#[test]
fn re_promoting_the_top_element_still_bumps() {
    let mut stack = StackOrder::new();
    stack.promote(&id("a"));
    stack.promote(&id("a"));
    assert_eq!(stack.rank(&id("a")), 2);
    assert_eq!(stack.len(), 1);
}

// =============================================================
// Normalization
// =============================================================

#[test]
fn normalize_below_ceiling_is_a_noop() {
    let mut stack = StackOrder::new();
    stack.promote(&id("a"));
    assert!(!stack.normalize_if_needed());
    assert_eq!(stack.rank(&id("a")), 1);
}

#[test]
fn normalize_compacts_preserving_relative_order() {
    let mut stack = StackOrder::with_ceiling(6);
    stack.promote(&id("a")); // 1
    stack.promote(&id("b")); // 2
    stack.promote(&id("c")); // 3
    stack.promote(&id("a")); // 4
    stack.promote(&id("c")); // 5
    stack.promote(&id("b")); // 6, at the ceiling
    assert!(stack.normalize_if_needed());
    assert_eq!(stack.rank(&id("a")), 1);
    assert_eq!(stack.rank(&id("c")), 2);
    assert_eq!(stack.rank(&id("b")), 3);
    assert_eq!(stack.max_rank(), 3);
}

#[test]
fn normalize_is_idempotent() {
    let mut stack = StackOrder::with_ceiling(3);
    stack.promote(&id("a")); // 1
    stack.promote(&id("b")); // 2
    stack.promote(&id("a")); // 3, at the ceiling
    assert!(stack.normalize_if_needed());
    // compaction left two ids, contiguous and below the ceiling
    assert!(!stack.normalize_if_needed());
    assert_eq!(stack.rank(&id("b")), 1);
    assert_eq!(stack.rank(&id("a")), 2);
}

#[test]
fn promotion_across_the_ceiling_compacts_first() {
    let mut stack = StackOrder::new();
    let a = id("a");
    let b = id("b");
    stack.promote(&a); // 1
    stack.promote(&b); // 2
    for i in 0..998 {
        if i % 2 == 0 {
            stack.promote(&a);
        } else {
            stack.promote(&b);
        }
    }
    assert_eq!(stack.max_rank(), 1000);
    // crossing the ceiling: ranks compact to {a: 1, b: 2}, then b takes 3
    stack.promote(&b);
    assert_eq!(stack.rank(&a), 1);
    assert_eq!(stack.rank(&b), 3);
    assert_eq!(stack.max_rank(), 3);
}

// =============================================================
// Forget / reset
// =============================================================

#[test]
fn forget_drops_rank_without_compacting() {
    let mut stack = StackOrder::new();
    stack.promote(&id("a"));
    stack.promote(&id("b"));
    stack.forget(&id("a"));
    assert_eq!(stack.rank(&id("a")), 0);
    assert_eq!(stack.rank(&id("b")), 2);
    assert_eq!(stack.max_rank(), 2);
}

#[test]
fn reset_clears_ranks_and_maximum() {
    let mut stack = StackOrder::new();
    stack.promote(&id("a"));
    stack.promote(&id("b"));
    stack.reset();
    assert!(stack.is_empty());
    assert_eq!(stack.max_rank(), 0);
    assert_eq!(stack.promote(&id("c")), 1);
}
