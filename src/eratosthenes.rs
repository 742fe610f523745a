use bitvec::prelude::*;

use crate::bit_sieve::BitSieve;
use crate::engine_types::{PrimeResult, SieveError};
use crate::sieve_math::{integer_sqrt, sieve_bit_len, sieve_bytes};

/// エラトステネスの篩で `[0, limit]` の判定表を作る。
///
/// - `[2, limit]` を候補として立て、`2..=floor(sqrt(limit))` の各素数 `i` について
///   `i*i, i*i+i, ...` を消していく。
/// - 合成数 n は必ず sqrt(n) 以下の因数を持つので、ループ終了時点で残ったビットはすべて素数。
/// - `limit` が 0, 1 のときは全ビット 0、2 のときは {2} だけになる。
pub fn sieve_eratosthenes(limit: u64) -> PrimeResult<BitSieve> {
    let len = sieve_bit_len(limit).ok_or(SieveError::InsufficientMemory {
        limit,
        required_bytes: sieve_bytes(limit),
        allowed_bytes: 0,
    })?;

    let mut is_prime = bitvec![1; len];
    is_prime.set(0, false);
    if len > 1 {
        is_prime.set(1, false);
    }

    let lim_sqrt = integer_sqrt(limit) as usize;
    for i in 2..=lim_sqrt {
        if !is_prime[i] {
            continue;
        }
        let mut j = i * i;
        while j < len {
            is_prime.set(j, false);
            j += i;
        }
    }

    Ok(BitSieve::from_bits(limit, is_prime))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_limits() {
        assert!(sieve_eratosthenes(0).unwrap().primes().is_empty());
        assert!(sieve_eratosthenes(1).unwrap().primes().is_empty());
        assert_eq!(sieve_eratosthenes(2).unwrap().primes(), vec![2]);
        assert_eq!(sieve_eratosthenes(3).unwrap().primes(), vec![2, 3]);
        assert_eq!(sieve_eratosthenes(4).unwrap().primes(), vec![2, 3]);
    }

    #[test]
    fn perfect_square_limit_is_crossed_out() {
        let sieve = sieve_eratosthenes(49).unwrap();
        assert_eq!(sieve.get(49), Ok(false));
        assert_eq!(sieve.get(47), Ok(true));
        assert_eq!(sieve.prime_count(), 15);
    }
}
