//! アトキンの篩。
//!
//! 3 段階で判定表を作る:
//! 1. 二次形式 `4x²+y²`（mod 12 が 1, 5）、`3x²+y²`（mod 12 が 7）、
//!    `3x²−y²`（x > y かつ mod 12 が 11）の解ごとに候補フラグを反転する。
//!    表現の個数が奇数の数だけが候補に残るので、代入ではなく必ず反転（XOR）で更新すること。
//! 2. 5 以上 sqrt(limit) 以下で候補に残った n について、n² の倍数をすべて消す。
//! 3. 2 と 3 は二次形式から出てこないので明示的に立て、5 以上のフラグをそのまま写す。

use bitvec::prelude::*;

use crate::bit_sieve::BitSieve;
use crate::engine_types::{PrimeResult, SieveError};
use crate::sieve_math::{integer_sqrt, sieve_bit_len, sieve_bytes};

fn flip(flags: &mut BitSlice, n: u64) {
    let i = n as usize;
    let cur = flags[i];
    flags.set(i, !cur);
}

/// 段階 1: 二次形式の解の個数の偶奇で候補フラグを作る。
fn mark_quadratic_forms(flags: &mut BitSlice, limit: u64) {
    let sqrt_limit = integer_sqrt(limit);

    for x in 1..=sqrt_limit {
        let xx = x * x;
        for y in 1..=sqrt_limit {
            let yy = y * y;

            let n = 4 * xx + yy;
            if n <= limit && (n % 12 == 1 || n % 12 == 5) {
                flip(flags, n);
            }

            let n = 3 * xx + yy;
            if n <= limit && n % 12 == 7 {
                flip(flags, n);
            }

            if x > y {
                let n = 3 * xx - yy;
                if n <= limit && n % 12 == 11 {
                    flip(flags, n);
                }
            }
        }
    }
}

/// 段階 2: 候補に残った n の平方の倍数を消す。
fn clear_square_multiples(flags: &mut BitSlice, limit: u64) {
    let sqrt_limit = integer_sqrt(limit);
    for n in 5..=sqrt_limit {
        if !flags[n as usize] {
            continue;
        }
        let step = n * n;
        let mut k = step;
        while k <= limit {
            flags.set(k as usize, false);
            k += step;
        }
    }
}

/// アトキンの篩で `[0, limit]` の判定表を作る。
///
/// - `limit < 2` は全ビット 0、`limit` が 2 / 3 のときは明示的に立てた {2} / {2, 3} だけになる。
/// - 結果はエラトステネスの篩と完全に一致する。
pub fn sieve_atkin(limit: u64) -> PrimeResult<BitSieve> {
    let len = sieve_bit_len(limit).ok_or(SieveError::InsufficientMemory {
        limit,
        required_bytes: sieve_bytes(limit).saturating_mul(2),
        allowed_bytes: 0,
    })?;

    let mut flags = bitvec![0; len];
    mark_quadratic_forms(&mut flags, limit);
    clear_square_multiples(&mut flags, limit);

    let mut primes = bitvec![0; len];
    if limit >= 2 {
        primes.set(2, true);
    }
    if limit >= 3 {
        primes.set(3, true);
    }
    if len > 5 {
        primes[5..].copy_from_bitslice(&flags[5..]);
    }

    Ok(BitSieve::from_bits(limit, primes))
}
