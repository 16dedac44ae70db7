use crate::array::ArrayContainer;

#[test]
fn add_remove_keeps_sorted() {
    let mut a = ArrayContainer::new();
    for v in [5u16, 1, 9, 3, 9, 7] {
        a.add(v);
    }
    assert_eq!(a.values(), &[1, 3, 5, 7, 9]);
    assert!(!a.add(3));
    assert!(a.remove(5));
    assert!(!a.remove(5));
    assert_eq!(a.values(), &[1, 3, 7, 9]);
    a.check_full_invariants();
}

#[test]
fn spans_group_consecutive_values() {
    let a = ArrayContainer::from_sorted_vec(vec![1, 2, 3, 7, 9, 10, 65535]);
    assert_eq!(
        a.spans().collect::<Vec<_>>(),
        vec![1..4, 7..8, 9..11, 65535..65536]
    );
    assert_eq!(a.count_runs(), 4);
    assert_eq!(ArrayContainer::new().spans().next(), None);
}

#[test]
fn rank_select_limit() {
    let a = ArrayContainer::from_sorted_vec(vec![2, 4, 6, 8]);
    assert_eq!(a.rank(1), 0);
    assert_eq!(a.rank(4), 2);
    assert_eq!(a.rank(7), 3);
    assert_eq!(a.select(3), Some(8));
    assert_eq!(a.select(4), None);
    assert_eq!(a.limit(2).values(), &[2, 4]);
    assert_eq!(a.limit(10), a);
}

#[test]
fn conversions_round_trip() {
    let a = ArrayContainer::from_sorted_vec(vec![0, 1, 2, 100, 4000]);
    let run = a.to_run();
    assert_eq!(run.num_runs(), 3);
    assert_eq!(run.to_array(), a);
    assert_eq!(a.to_bitmap().to_array(), a);
    assert_eq!(a.size_in_bytes(), 12);
}
