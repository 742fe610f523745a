use sosu_range::verify::{is_probable_prime, verify_sieve_sample};
use sosu_range::algorithm::build_sieve_with_budget;
use sosu_range::{build_sieve, build_sieve_by_name, SieveAlgorithm, SieveError};

/// 2 から n-1 までの割り算で判定する（テスト専用の素朴な判定器）。
fn is_prime_brute(n: u64) -> bool {
    n >= 2 && (2..n).take_while(|d| d * d <= n).all(|d| n % d != 0)
}

#[test]
fn both_algorithms_agree_for_every_small_limit() {
    for limit in 0..=600u64 {
        let era = build_sieve(limit, SieveAlgorithm::Eratosthenes).unwrap();
        let atkin = build_sieve(limit, SieveAlgorithm::Atkin).unwrap();
        assert_eq!(era, atkin, "sieves differ at limit {limit}");
    }
}

#[test]
fn both_algorithms_agree_for_larger_limits() {
    for limit in [1_000u64, 4_095, 4_096, 99_991, 1_000_000, 1_234_567] {
        let era = build_sieve(limit, SieveAlgorithm::Eratosthenes).unwrap();
        let atkin = build_sieve(limit, SieveAlgorithm::Atkin).unwrap();
        assert!(era == atkin, "sieves differ at limit {limit}");
    }
}

#[test]
fn exhaustive_brute_force_oracle_up_to_10000() {
    let limit = 10_000;
    for algorithm in SieveAlgorithm::ALL {
        let sieve = build_sieve(limit, algorithm).unwrap();
        for n in 0..=limit {
            assert_eq!(
                sieve.get(n).unwrap(),
                is_prime_brute(n),
                "{algorithm}: wrong flag for {n}"
            );
        }
    }
}

#[test]
fn sampled_oracle_for_larger_limit() {
    let limit = 5_000_000;
    for algorithm in SieveAlgorithm::ALL {
        let sieve = build_sieve(limit, algorithm).unwrap();
        assert_eq!(verify_sieve_sample(&sieve, 997), None, "{algorithm}");
        for n in (limit - 200)..=limit {
            assert_eq!(sieve.get(n).unwrap(), is_probable_prime(n), "{algorithm}: {n}");
        }
    }
}

#[test]
fn concrete_small_limits() {
    for algorithm in SieveAlgorithm::ALL {
        let primes = |limit| build_sieve(limit, algorithm).unwrap().primes();
        assert_eq!(primes(30), vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert!(primes(0).is_empty());
        assert!(primes(1).is_empty());
        assert_eq!(primes(2), vec![2]);
        assert_eq!(primes(3), vec![2, 3]);
    }
}

#[test]
fn scan_all_is_restartable() {
    let sieve = build_sieve(500, SieveAlgorithm::Atkin).unwrap();
    let first: Vec<u64> = sieve.scan_all().collect();
    let second: Vec<u64> = sieve.scan_all().collect();
    assert_eq!(first, second);
    assert!(first.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn out_of_bounds_access_is_reported() {
    let sieve = build_sieve(10, SieveAlgorithm::Eratosthenes).unwrap();
    assert_eq!(
        sieve.get(11),
        Err(SieveError::OutOfBoundsAccess { index: 11, limit: 10 })
    );
}

#[test]
fn algorithm_names() {
    assert_eq!(build_sieve_by_name(30, "atkin").unwrap().prime_count(), 10);
    assert_eq!(build_sieve_by_name(30, "eratosthenes").unwrap().prime_count(), 10);
    assert_eq!(
        build_sieve_by_name(30, "sundaram"),
        Err(SieveError::UnknownAlgorithm("sundaram".to_string()))
    );
}

#[test]
fn unaddressable_limit_fails_without_allocating() {
    let err = build_sieve(u64::MAX, SieveAlgorithm::Eratosthenes).unwrap_err();
    assert!(matches!(err, SieveError::InsufficientMemory { limit: u64::MAX, .. }));
}

#[test]
fn sieve_over_memory_budget_is_rejected() {
    if sosu_range::memory::get_total_memory() == 0 {
        return;
    }
    let limit = 1u64 << 50;
    match build_sieve_with_budget(limit, SieveAlgorithm::Atkin, 10.0) {
        Err(SieveError::InsufficientMemory {
            limit: l,
            required_bytes,
            allowed_bytes,
        }) => {
            assert_eq!(l, limit);
            assert!(allowed_bytes > 0);
            assert!(required_bytes > allowed_bytes);
            // Atkin は作業用と結果用の 2 本を持つ
            assert!(required_bytes >= 2 * (limit / 8));
        }
        other => panic!("expected InsufficientMemory, got {other:?}"),
    }
}
