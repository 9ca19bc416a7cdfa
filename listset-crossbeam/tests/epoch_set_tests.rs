use listset_core::common_tests::set_core_tests::*;
use listset_core::common_tests::set_stress_tests::*;
use listset_core::data_structures::ConcurrentSet;
use listset_crossbeam::{EpochLazySet, EpochLockFreeSet, EpochOptimisticSet};
use rstest::rstest;
use serial_test::serial;

#[rstest]
#[case::optimistic(EpochOptimisticSet::<i64>::default())]
#[case::lazy(EpochLazySet::<i64>::default())]
#[case::lock_free(EpochLockFreeSet::<i64>::default())]
fn test_basic<S: ConcurrentSet<i64>>(#[case] set: S) {
    test_basic_operations(&set);
}

#[rstest]
#[case::optimistic(EpochOptimisticSet::<i64>::default())]
#[case::lazy(EpochLazySet::<i64>::default())]
#[case::lock_free(EpochLockFreeSet::<i64>::default())]
fn test_len<S: ConcurrentSet<i64>>(#[case] set: S) {
    test_len_operations(&set);
}

#[rstest]
#[case::optimistic(EpochOptimisticSet::<i64>::default())]
#[case::lazy(EpochLazySet::<i64>::default())]
#[case::lock_free(EpochLockFreeSet::<i64>::default())]
fn test_symmetry<S: ConcurrentSet<i64> + Default>(#[case] _set: S) {
    test_add_remove_symmetry::<S>();
    test_failure_idempotence::<S>();
}

#[rstest]
#[case::optimistic(EpochOptimisticSet::<i64>::default())]
#[case::lazy(EpochLazySet::<i64>::default())]
#[case::lock_free(EpochLockFreeSet::<i64>::default())]
fn test_same_key_add<S: ConcurrentSet<i64> + Default + Send + Sync + 'static>(#[case] _set: S) {
    test_concurrent_same_key_add::<S>();
}

#[rstest]
#[case::optimistic(EpochOptimisticSet::<i64>::default())]
#[case::lazy(EpochLazySet::<i64>::default())]
#[case::lock_free(EpochLockFreeSet::<i64>::default())]
fn test_concurrent_mixed<S: ConcurrentSet<i64> + Default + Send + Sync + 'static>(
    #[case] _set: S,
) {
    test_concurrent_mixed_operations::<S>();
}

#[rstest]
#[serial(stress_tests)]
#[case::optimistic(EpochOptimisticSet::<i64>::default())]
#[case::lazy(EpochLazySet::<i64>::default())]
#[case::lock_free(EpochLockFreeSet::<i64>::default())]
fn stress_contains_during_modifications<S: ConcurrentSet<i64> + Default + Send + Sync + 'static>(
    #[case] _set: S,
) {
    test_contains_during_modifications::<S>();
}

#[rstest]
#[serial(stress_tests)]
#[case::optimistic(EpochOptimisticSet::<i64>::default())]
#[case::lazy(EpochLazySet::<i64>::default())]
#[case::lock_free(EpochLockFreeSet::<i64>::default())]
fn stress_linearizability<S: ConcurrentSet<i64> + Default + Send + Sync + 'static>(
    #[case] _set: S,
) {
    test_linearizability::<S>();
}

#[rstest]
#[serial(stress_tests)]
#[case::optimistic(EpochOptimisticSet::<i64>::default())]
#[case::lazy(EpochLazySet::<i64>::default())]
#[case::lock_free(EpochLockFreeSet::<i64>::default())]
fn stress_single_key<S: ConcurrentSet<i64> + Default + Send + Sync + 'static>(#[case] _set: S) {
    test_concurrent_remove_same_value::<S>();
    test_extreme_contention_single_key::<S>();
}

/// Long churn on a small key range: with epoch reclamation, retired nodes
/// are freed while the set is still in use.
#[rstest]
#[serial(stress_tests)]
#[case::optimistic(EpochOptimisticSet::<i64>::default())]
#[case::lazy(EpochLazySet::<i64>::default())]
#[case::lock_free(EpochLockFreeSet::<i64>::default())]
fn stress_churn<S: ConcurrentSet<i64> + Default + Send + Sync + 'static>(#[case] _set: S) {
    let plans: Vec<Vec<(SetOp, i64)>> = (0..8i64)
        .map(|t| {
            (0..20_000i64)
                .map(|i| {
                    let op = if (i + t) % 2 == 0 { SetOp::Add } else { SetOp::Remove };
                    (op, (i * 7 + t) % 16)
                })
                .collect::<Vec<_>>()
        })
        .collect();
    test_key_accounting::<S>(plans, 16);
}
