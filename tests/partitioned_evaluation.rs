use sosu_range::config::ExecutionMode;
use sosu_range::partition::{merge_partials, PartialResult};
use sosu_range::{
    build_sieve, nth_in_range, partition, primes_in_range, PartitionedEvaluator, PrimeSource,
    SieveAlgorithm, SieveError,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn partitions_cover_the_list_in_order() {
    let sieve = build_sieve(1_000, SieveAlgorithm::Eratosthenes).unwrap();
    let primes = sieve.primes();
    for n in [1usize, 2, 3, 7, 16, 168, 200] {
        let parts = partition(PrimeSource::List(&primes), n).unwrap();
        assert_eq!(parts.len(), n);
        let joined: Vec<u64> = parts.iter().flat_map(|p| p.iter()).collect();
        assert_eq!(joined, primes, "list partitions n={n}");
        for (i, p) in parts.iter().enumerate() {
            assert_eq!(p.index(), i);
        }

        let parts = partition(PrimeSource::Sieve(&sieve), n).unwrap();
        let joined: Vec<u64> = parts.iter().flat_map(|p| p.iter()).collect();
        assert_eq!(joined, primes, "sieve partitions n={n}");
    }
}

#[test]
fn zero_partitions_is_rejected() {
    let primes = vec![2u64, 3, 5];
    assert!(matches!(
        partition(PrimeSource::List(&primes), 0),
        Err(SieveError::InvalidPartitionCount(0))
    ));
    assert!(matches!(
        PartitionedEvaluator::new(0, ExecutionMode::Parallel),
        Err(SieveError::InvalidPartitionCount(0))
    ));
}

#[test]
fn merged_filter_equals_direct_range_query() {
    init_logger();
    let sieve = build_sieve(20_000, SieveAlgorithm::Atkin).unwrap();
    let primes = sieve.primes();
    let ranges = [(0u64, 20_000u64), (10, 20), (1_000, 1_500), (19_990, 50_000), (14, 16)];

    for n in 1..=40 {
        for mode in [ExecutionMode::Parallel, ExecutionMode::Sequential] {
            let evaluator = PartitionedEvaluator::new(n, mode).unwrap();
            for &(start, end) in &ranges {
                let direct = primes_in_range(&sieve, start, end).unwrap();
                assert_eq!(evaluator.filter_range(&sieve, start, end).unwrap(), direct);
                assert_eq!(evaluator.filter_range(&primes, start, end).unwrap(), direct);
                assert_eq!(
                    evaluator.count_range(&sieve, start, end).unwrap(),
                    direct.len() as u64
                );
            }
        }
    }
}

#[test]
fn nth_walks_partitions_in_order() {
    let sieve = build_sieve(3_000, SieveAlgorithm::Eratosthenes).unwrap();
    let primes = sieve.primes();
    let (start, end) = (100, 2_900);
    let direct = primes_in_range(&sieve, start, end).unwrap();

    for n in [1usize, 4, 16, 33] {
        let evaluator = PartitionedEvaluator::new(n, ExecutionMode::Parallel).unwrap();
        for k in 1..=direct.len() as u64 {
            let expected = nth_in_range(&sieve, start, end, k).unwrap();
            assert_eq!(evaluator.nth_in_range(&sieve, start, end, k), Ok(expected));
            assert_eq!(evaluator.nth_in_range(&primes, start, end, k), Ok(expected));
        }
        let count = direct.len() as u64;
        assert_eq!(
            evaluator.nth_in_range(&sieve, start, end, count + 1),
            Err(SieveError::InvalidIndex { k: count + 1, count })
        );
        assert_eq!(
            evaluator.nth_in_range(&sieve, start, end, 0),
            Err(SieveError::InvalidIndex { k: 0, count })
        );
    }
}

#[test]
fn evaluator_scenarios() {
    let sieve = build_sieve(30, SieveAlgorithm::Atkin).unwrap();
    let evaluator = PartitionedEvaluator::default();
    assert_eq!(evaluator.partition_count(), 16);
    assert_eq!(evaluator.filter_range(&sieve, 10, 20).unwrap(), vec![11, 13, 17, 19]);
    assert_eq!(evaluator.nth_in_range(&sieve, 1, 30, 5), Ok(11));
    assert_eq!(
        evaluator.filter_range(&sieve, 20, 10),
        Err(SieveError::InvalidRange { start: 20, end: 10 })
    );

    let empty = build_sieve(1, SieveAlgorithm::Atkin).unwrap();
    assert_eq!(
        evaluator.nth_in_range(&empty, 0, 1, 1),
        Err(SieveError::InvalidIndex { k: 1, count: 0 })
    );
}

#[test]
fn merge_ignores_completion_order() {
    let partials = vec![
        PartialResult { partition_index: 2, value: vec![11, 13] },
        PartialResult { partition_index: 0, value: vec![2, 3] },
        PartialResult { partition_index: 3, value: vec![] },
        PartialResult { partition_index: 1, value: vec![5, 7] },
    ];
    assert_eq!(merge_partials(partials), vec![2, 3, 5, 7, 11, 13]);
}

#[test]
fn nth_with_count_reports_range_total_from_one_pass() {
    let sieve = build_sieve(10_000, SieveAlgorithm::Atkin).unwrap();
    let (start, end) = (2_000, 7_500);
    let direct = primes_in_range(&sieve, start, end).unwrap();
    let count = direct.len() as u64;

    for n in [1usize, 5, 16] {
        let evaluator = PartitionedEvaluator::new(n, ExecutionMode::Sequential).unwrap();
        for k in [1, count / 2, count] {
            assert_eq!(
                evaluator.nth_with_count(&sieve, start, end, k),
                Ok((count, direct[(k - 1) as usize]))
            );
        }
        assert_eq!(
            evaluator.nth_with_count(&sieve, start, end, count + 1),
            Err(SieveError::InvalidIndex { k: count + 1, count })
        );
    }
}
