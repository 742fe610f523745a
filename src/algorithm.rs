use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::atkin::sieve_atkin;
use crate::bit_sieve::BitSieve;
use crate::engine_types::{PrimeResult, SieveError};
use crate::eratosthenes::sieve_eratosthenes;
use crate::memory;

/// 判定表を作る篩アルゴリズム。起動時に一度だけ選ぶ閉じた 2 択。
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SieveAlgorithm {
    /// O(limit·log log limit)。小さな上限ではこちらが速い。
    #[default]
    Eratosthenes,
    /// 二次形式の偶奇 + 平方因子除去。O(limit) だが定数が大きい。
    Atkin,
}

impl SieveAlgorithm {
    pub const ALL: [SieveAlgorithm; 2] = [SieveAlgorithm::Eratosthenes, SieveAlgorithm::Atkin];

    pub fn name(self) -> &'static str {
        match self {
            SieveAlgorithm::Eratosthenes => "eratosthenes",
            SieveAlgorithm::Atkin => "atkin",
        }
    }

    /// メモリ予算の検査をせずに篩を実行する。
    pub fn run(self, limit: u64) -> PrimeResult<BitSieve> {
        match self {
            SieveAlgorithm::Eratosthenes => sieve_eratosthenes(limit),
            SieveAlgorithm::Atkin => sieve_atkin(limit),
        }
    }
}

impl fmt::Display for SieveAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SieveAlgorithm {
    type Err = SieveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eratosthenes" => Ok(SieveAlgorithm::Eratosthenes),
            "atkin" => Ok(SieveAlgorithm::Atkin),
            other => Err(SieveError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// 既定のメモリ使用率（%）。`QueryConfig` を使わない呼び出しで用いる。
pub const DEFAULT_MEMORY_USAGE_PERCENT: f64 = 80.0;

/// `[0, limit]` の判定表を `algorithm` で一度だけ構築する。
pub fn build_sieve(limit: u64, algorithm: SieveAlgorithm) -> PrimeResult<BitSieve> {
    build_sieve_with_budget(limit, algorithm, DEFAULT_MEMORY_USAGE_PERCENT)
}

/// アルゴリズム名（`"eratosthenes"` / `"atkin"`）で選んで構築する。
pub fn build_sieve_by_name(limit: u64, algorithm: &str) -> PrimeResult<BitSieve> {
    build_sieve(limit, algorithm.parse()?)
}

/// メモリ予算を明示して構築する。予算超過時は何も確保せずに `InsufficientMemory` を返す。
pub fn build_sieve_with_budget(
    limit: u64,
    algorithm: SieveAlgorithm,
    memory_usage_percent: f64,
) -> PrimeResult<BitSieve> {
    memory::check_sieve_memory(limit, algorithm, memory_usage_percent)?;

    let start_time = Instant::now();
    let sieve = algorithm.run(limit)?;

    log::info!(
        "Built {} sieve up to {} in {} ms ({} primes)",
        algorithm,
        limit,
        start_time.elapsed().as_millis(),
        sieve.prime_count()
    );
    Ok(sieve)
}
