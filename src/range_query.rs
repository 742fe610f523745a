//! 判定表に対する範囲クエリ（列挙・個数・k 番目）。
//!
//! `start > end` は `InvalidRange`。範囲が `limit` を超える部分は単に結果に含まれない。

use crate::bit_sieve::BitSieve;
use crate::engine_types::{validate_range, PrimeResult, SieveError};

/// `[start, end]` の素数を昇順に返す遅延イテレータ。
pub fn iter_primes_in_range(
    sieve: &BitSieve,
    start: u64,
    end: u64,
) -> PrimeResult<impl Iterator<Item = u64> + '_> {
    validate_range(start, end)?;
    Ok(sieve.iter_range(start, end))
}

/// `[start, end]` の素数を昇順に並べた PrimeList。
pub fn primes_in_range(sieve: &BitSieve, start: u64, end: u64) -> PrimeResult<Vec<u64>> {
    Ok(iter_primes_in_range(sieve, start, end)?.collect())
}

/// `[start, end]` の素数の個数。
pub fn count_in_range(sieve: &BitSieve, start: u64, end: u64) -> PrimeResult<u64> {
    validate_range(start, end)?;
    Ok(sieve.count_range(start, end))
}

/// `[start, end]` で k 番目（1 始まり）に小さい素数。
///
/// `k == 0` や `k` が範囲内の個数を超える場合は `InvalidIndex`。
pub fn nth_in_range(sieve: &BitSieve, start: u64, end: u64, k: u64) -> PrimeResult<u64> {
    let count = count_in_range(sieve, start, end)?;
    if k == 0 || k > count {
        return Err(SieveError::InvalidIndex { k, count });
    }
    sieve
        .iter_range(start, end)
        .nth((k - 1) as usize)
        .ok_or(SieveError::InvalidIndex { k, count })
}
