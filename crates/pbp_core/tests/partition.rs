use std::sync::Arc;

use pbp_core::{partition, split_into_chunks, ParallelismPolicy};

#[test]
fn chunks_concatenate_back_to_input() {
    for n in 0..40usize {
        for k in 1..10usize {
            let units: Vec<usize> = (0..n).collect();
            let chunks = split_into_chunks(units.clone(), k);
            assert!(chunks.len() <= k, "n={n} k={k} produced {} chunks", chunks.len());
            assert!(chunks.iter().all(|c| !c.is_empty()), "n={n} k={k} has an empty chunk");
            let flat: Vec<usize> = chunks.into_iter().flatten().collect();
            assert_eq!(flat, units);
        }
    }
}

#[test]
fn chunk_size_is_ceiling_of_units_over_workers() {
    let chunks = split_into_chunks((0..10).collect::<Vec<_>>(), 4);
    let sizes: Vec<_> = chunks.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![3, 3, 3, 1]);
}

#[test]
fn zero_workers_is_treated_as_one() {
    let chunks = split_into_chunks(vec!['a', 'b'], 0);
    assert_eq!(chunks, vec![vec!['a', 'b']]);
}

#[test]
fn few_units_run_on_a_single_worker() {
    let policy = ParallelismPolicy::SINGLE_VIEW;
    assert_eq!(policy.worker_count(3, 8), 1);
    assert_eq!(policy.worker_count(6, 8), 6);
    assert_eq!(policy.worker_count(100, 8), 6);
}

#[test]
fn dual_view_stage_reserves_twice_as_much() {
    let policy = ParallelismPolicy::DUAL_VIEW;
    assert_eq!(policy.reserved(), 4);
    assert_eq!(policy.worker_count(100, 8), 4);
    // Hosts smaller than the reservation still get one worker.
    assert_eq!(policy.worker_count(100, 2), 1);
}

#[test]
fn assignments_share_config_and_number_workers_from_one() {
    let config = Arc::new("run-config".to_string());
    let assignments = partition(
        (0..12).collect::<Vec<u32>>(),
        ParallelismPolicy::SINGLE_VIEW,
        6,
        Arc::clone(&config),
    );

    let ids: Vec<_> = assignments.iter().map(|a| a.worker_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert!(assignments.iter().all(|a| Arc::ptr_eq(&a.config, &config)));
    assert_eq!(assignments[0].units, vec![0, 1, 2]);
}

#[test]
fn no_units_means_no_assignments() {
    let assignments = partition(Vec::<u32>::new(), ParallelismPolicy::SINGLE_VIEW, 8, Arc::new(()));
    assert!(assignments.is_empty());
}
