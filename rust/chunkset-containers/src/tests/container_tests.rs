use crate::{
    array::ArrayContainer,
    bitmap::BitmapContainer,
    container::{Container, ContainerKind},
    policy::ContainerPolicy,
    run_container::RunContainer,
};

fn all_kinds(values: &[u16]) -> [Container; 3] {
    let array = ArrayContainer::from_sorted_vec(values.to_vec());
    [
        Container::Run(array.to_run()),
        Container::Bitmap(array.to_bitmap()),
        Container::Array(array),
    ]
}

#[test]
fn new_container_is_empty_array() {
    let c = Container::new();
    assert_eq!(c.kind(), ContainerKind::Array);
    assert!(c.is_empty());
    assert_eq!(c, Container::default());
}

#[test]
fn array_promotes_to_bitmap_and_back() {
    let mut c = Container::new();
    for v in 0..4096u16 {
        c.add(v * 2);
    }
    assert_eq!(c.kind(), ContainerKind::Array);
    c.add(1);
    assert_eq!(c.kind(), ContainerKind::Bitmap);
    assert_eq!(c.cardinality(), 4097);

    c.remove(1);
    assert_eq!(c.kind(), ContainerKind::Array);
    assert_eq!(c.cardinality(), 4096);
    c.check_full_invariants();
}

#[test]
fn custom_policy_promotion() {
    let policy = ContainerPolicy::new(4, false).unwrap();
    let mut c = Container::new();
    for v in [1, 3, 5, 7] {
        c.add_with_policy(v, &policy);
    }
    assert_eq!(c.kind(), ContainerKind::Array);
    c.add_with_policy(9, &policy);
    assert_eq!(c.kind(), ContainerKind::Bitmap);
    c.remove_with_policy(9, &policy);
    assert_eq!(c.kind(), ContainerKind::Array);
}

#[test]
fn run_container_stays_run_on_add() {
    let mut c = Container::Run(RunContainer::new());
    for v in 0..10000u16 {
        c.add(v);
    }
    assert_eq!(c.kind(), ContainerKind::Run);
    assert_eq!(c.count_runs(), 1);
}

#[test]
fn queries_agree_across_kinds() {
    let values = [0u16, 1, 2, 50, 51, 300, 65535];
    for c in all_kinds(&values) {
        assert_eq!(c.cardinality(), values.len(), "{:?}", c.kind());
        assert_eq!(c.count_runs(), 4);
        assert_eq!(c.first(), Some(0));
        assert_eq!(c.last(), Some(65535));
        assert_eq!(c.iter().collect::<Vec<_>>(), values);
        assert!(c.rev_iter().eq(values.iter().rev().copied()));
        assert_eq!(
            c.spans().collect::<Vec<_>>(),
            vec![0..3, 50..52, 300..301, 65535..65536]
        );
        assert_eq!(c.rank(51), 5);
        assert_eq!(c.select(5).unwrap(), 300);
        assert!(c.select(7).is_err());
        assert_eq!(c.limit(4).iter().collect::<Vec<_>>(), vec![0, 1, 2, 50]);
        assert!(c.contains(300));
        assert!(!c.contains(299));
    }
}

#[test]
fn semantic_and_structural_equality() {
    let [run, bitmap, array] = all_kinds(&[4, 5, 6, 1000]);
    assert!(run.is_equal_to(&bitmap));
    assert!(bitmap.is_equal_to(&array));
    assert!(array.is_equal_to(&run));
    assert_ne!(run, array);
    assert_eq!(run.clone(), run);

    let other = Container::Array(ArrayContainer::from_sorted_vec(vec![4, 5, 1000]));
    assert!(!run.is_equal_to(&other));
}

#[test]
fn run_optimize_picks_smallest() {
    let mut c = Container::Array(ArrayContainer::from_sorted_vec((100..1100).collect()));
    assert_eq!(c.run_optimize(), ContainerKind::Run);
    assert_eq!(c.count_runs(), 1);
    assert_eq!(c.size_in_bytes(), 8);

    let mut c = Container::Run(RunContainer::from_spans((0..50u32).map(|i| i * 4..i * 4 + 1)));
    assert_eq!(c.run_optimize(), ContainerKind::Array);
    assert_eq!(c.cardinality(), 50);

    let mut c = Container::Bitmap(BitmapContainer::from_spans(
        (0..10000u32).map(|i| i * 3..i * 3 + 1),
    ));
    assert_eq!(c.run_optimize(), ContainerKind::Bitmap);

    let mut c = Container::Bitmap(BitmapContainer::full());
    assert_eq!(c.run_optimize(), ContainerKind::Run);
    assert_eq!(c.cardinality(), 65536);
}

#[test]
fn into_kind_conversions_preserve_values() {
    let [run, ..] = all_kinds(&[7, 8, 9, 12]);
    for kind in [ContainerKind::Array, ContainerKind::Bitmap, ContainerKind::Run] {
        let converted = run.clone().into_kind(kind);
        assert_eq!(converted.kind(), kind);
        assert!(converted.is_equal_to(&run));
    }
}

#[test]
fn sizes_by_kind() {
    let [run, bitmap, array] = all_kinds(&[1, 2, 3, 10]);
    assert_eq!(run.size_in_bytes(), 4 + 4 * 2);
    assert_eq!(bitmap.size_in_bytes(), 8192);
    assert_eq!(array.size_in_bytes(), 2 + 2 * 4);
    assert_eq!(run.serialized_size_in_bytes(), 2 + 4 * 2);
    assert_eq!(array.serialized_size_in_bytes(), 4 + 2 * 4);
    assert_eq!(bitmap.serialized_size_in_bytes(), 8192);
}
