use crate::{run::Run, run_store::RunStore};

#[test]
fn growth_policy() {
    assert_eq!(RunStore::next_capacity(0), 4);
    assert_eq!(RunStore::next_capacity(4), 8);
    assert_eq!(RunStore::next_capacity(32), 64);
    assert_eq!(RunStore::next_capacity(64), 96);
    assert_eq!(RunStore::next_capacity(512), 768);
    assert_eq!(RunStore::next_capacity(1024), 1280);
    assert_eq!(RunStore::next_capacity(4096), 5120);
}

#[test]
fn make_room_grows_on_demand() {
    let mut store = RunStore::new();
    assert_eq!(store.capacity(), 0);
    assert_eq!(store.heap_size_bytes(), 0);

    store.push(Run::new(10, 2));
    assert_eq!(store.capacity(), 4);
    assert_eq!(store.heap_size_bytes(), 16);

    for i in 1..5u16 {
        store.push(Run::new(10 + i * 10, 1));
    }
    assert_eq!(store.len(), 5);
    assert_eq!(store.capacity(), 8);
    assert_eq!(store.starts(), &[10, 20, 30, 40, 50]);
    assert_eq!(store.lengths(), &[2, 1, 1, 1, 1]);
}

#[test]
fn make_and_recover_room_shift_both_halves() {
    let mut store = RunStore::from_runs(&[Run::new(0, 1), Run::new(10, 2), Run::new(20, 3)]);
    store.make_room_at(1);
    store.set(1, Run::new(5, 0));
    assert_eq!(store.starts(), &[0, 5, 10, 20]);
    assert_eq!(store.lengths(), &[1, 0, 2, 3]);

    store.recover_room_at(0);
    assert_eq!(store.starts(), &[5, 10, 20]);
    assert_eq!(store.lengths(), &[0, 2, 3]);

    store.recover_room_at(2);
    assert_eq!(
        store.iter().collect::<Vec<_>>(),
        vec![Run::new(5, 0), Run::new(10, 2)]
    );
}

#[test]
fn trim_and_clone_keep_only_live_runs() {
    let mut store = RunStore::with_capacity(16);
    store.push(Run::new(1, 1));
    store.push(Run::new(7, 3));
    assert_eq!(store.capacity(), 16);

    let copy = store.clone();
    assert_eq!(copy.capacity(), 2);
    assert_eq!(copy.starts(), store.starts());
    assert_eq!(copy.lengths(), store.lengths());

    store.trim();
    assert_eq!(store.capacity(), 2);
    assert_eq!(store.heap_size_bytes(), 8);
    assert_eq!(store.get(1), Run::new(7, 3));

    store.clear();
    assert!(store.is_empty());
    assert_eq!(store.capacity(), 2);
}

#[test]
fn length_adjustments() {
    let mut store = RunStore::from_runs(&[Run::new(100, 5)]);
    store.increment_length(0);
    assert_eq!(store.length(0), 6);
    store.decrement_length(0);
    store.decrement_length(0);
    assert_eq!(store.get(0), Run::new(100, 4));
    store.set_start(0, 99);
    assert_eq!(store.start(0), 99);
}

#[test]
fn from_buffer_splits_halves() {
    let store = RunStore::from_buffer(vec![3, 10, 2, 0].into_boxed_slice());
    assert_eq!(store.len(), 2);
    assert_eq!(store.starts(), &[3, 10]);
    assert_eq!(store.lengths(), &[2, 0]);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn recover_room_out_of_bounds() {
    let mut store = RunStore::from_runs(&[Run::new(1, 0)]);
    store.recover_room_at(1);
}
