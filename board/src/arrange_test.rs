use super::*;

fn ids(names: &[&str]) -> Vec<ElementId> {
    names.iter().map(|&n| n.to_owned()).collect()
}

#[test]
fn empty_groups_produce_no_placements() {
    assert!(row_layout(&[]).is_empty());
    assert!(row_layout(&[Vec::new()]).is_empty());
}

#[test]
fn single_group_fills_one_row() {
    let placements = row_layout(&[ids(&["a", "b", "c"])]);
    assert_eq!(placements.len(), 3);
    assert_eq!(placements[0], ("a".to_owned(), ElementPatch::position(100.0, 100.0)));
    assert_eq!(placements[1], ("b".to_owned(), ElementPatch::position(350.0, 100.0)));
    assert_eq!(placements[2], ("c".to_owned(), ElementPatch::position(600.0, 100.0)));
}

#[test]
fn each_group_gets_its_own_row() {
    let placements = row_layout(&[ids(&["a"]), ids(&["b"]), ids(&["c"])]);
    assert_eq!(placements[0].1, ElementPatch::position(100.0, 100.0));
    assert_eq!(placements[1].1, ElementPatch::position(100.0, 350.0));
    assert_eq!(placements[2].1, ElementPatch::position(100.0, 600.0));
}

#[test]
fn empty_group_still_advances_the_row() {
    let placements = row_layout(&[Vec::new(), ids(&["a"])]);
    assert_eq!(placements.len(), 1);
    assert_eq!(placements[0].1, ElementPatch::position(100.0, 350.0));
}
