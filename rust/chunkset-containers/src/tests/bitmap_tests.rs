use crate::bitmap::BitmapContainer;

#[test]
fn add_remove_track_cardinality() {
    let mut b = BitmapContainer::new();
    assert!(b.add(0));
    assert!(b.add(63));
    assert!(b.add(64));
    assert!(b.add(u16::MAX));
    assert!(!b.add(64));
    assert_eq!(b.cardinality(), 4);
    assert!(b.remove(63));
    assert!(!b.remove(63));
    assert_eq!(b.cardinality(), 3);
    assert!(b.contains(u16::MAX));
    b.check_full_invariants();
}

#[test]
fn range_operations() {
    let mut b = BitmapContainer::new();
    b.set_range(10..200);
    assert_eq!(b.cardinality(), 190);
    b.reset_range(50..60);
    assert_eq!(b.cardinality(), 180);
    b.flip_range(0..20);
    assert_eq!(b.cardinality(), 180);
    assert!(b.contains(0));
    assert!(!b.contains(10));
    assert!(b.contains(20));
    b.set_range(65000..65536);
    assert_eq!(b.cardinality(), 180 + 536);
    b.check_full_invariants();
}

#[test]
fn iteration_both_ends() {
    let b = BitmapContainer::from_values([1u16, 64, 65, 1000, 65535].into_iter());
    assert_eq!(b.iter().collect::<Vec<_>>(), vec![1, 64, 65, 1000, 65535]);
    assert_eq!(
        b.iter().rev().collect::<Vec<_>>(),
        vec![65535, 1000, 65, 64, 1]
    );

    let mut it = b.iter();
    assert_eq!(it.next(), Some(1));
    assert_eq!(it.next_back(), Some(65535));
    assert_eq!(it.next(), Some(64));
    assert_eq!(it.next_back(), Some(1000));
    assert_eq!(it.next(), Some(65));
    assert_eq!(it.next(), None);
    assert_eq!(it.next_back(), None);

    assert_eq!(BitmapContainer::new().iter().next(), None);
}

#[test]
fn spans_cross_word_boundaries() {
    let mut b = BitmapContainer::new();
    b.set_range(60..200);
    b.set_range(300..301);
    b.set_range(65472..65536);
    assert_eq!(
        b.spans().collect::<Vec<_>>(),
        vec![60..200, 300..301, 65472..65536]
    );
    assert_eq!(b.count_runs(), 3);
    assert_eq!(
        BitmapContainer::full().spans().collect::<Vec<_>>(),
        vec![0..65536]
    );
}

#[test]
fn rank_select_limit() {
    let b = BitmapContainer::from_spans([5..10, 100..110].into_iter());
    assert_eq!(b.rank(4), 0);
    assert_eq!(b.rank(5), 1);
    assert_eq!(b.rank(99), 5);
    assert_eq!(b.rank(u16::MAX), 15);
    assert_eq!(b.select(0), Some(5));
    assert_eq!(b.select(5), Some(100));
    assert_eq!(b.select(15), None);

    let limited = b.limit(7);
    assert_eq!(limited.cardinality(), 7);
    assert_eq!(limited.iter().collect::<Vec<_>>(), vec![5, 6, 7, 8, 9, 100, 101]);
    limited.check_full_invariants();
    assert_eq!(b.first(), Some(5));
    assert_eq!(b.last(), Some(109));
}
