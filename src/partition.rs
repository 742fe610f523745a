//! 素数列をパーティションに分け、パーティションごとに範囲フィルタ・個数計算を行って結合する。
//!
//! 順序の契約:
//! - パーティションは連続・昇順・互いに素で、パーティション番号順に連結すると元の列に戻る。
//! - 部分結果は必ず `partition_index` を持ち歩き、結合は完了順ではなく番号順で行う。
//!   そのため実行モード（並列 / 逐次）やスレッドの完了順に関係なく出力は常に同じになる。

use rayon::prelude::*;

use crate::bit_sieve::BitSieve;
use crate::config::{ExecutionMode, QueryConfig, NUM_SLICES};
use crate::engine_types::{validate_range, PrimeResult, SieveError};
use crate::sieve_math::split_point;

/// パーティションに分ける元の素数列。
#[derive(Clone, Copy, Debug)]
pub enum PrimeSource<'a> {
    /// 実体化済みの PrimeList（狭義単調増加であること）。
    List(&'a [u64]),
    /// 判定表を直接走査する。大きな上限で列を実体化したくないときに使う。
    Sieve(&'a BitSieve),
}

impl<'a> From<&'a [u64]> for PrimeSource<'a> {
    fn from(primes: &'a [u64]) -> Self {
        PrimeSource::List(primes)
    }
}

impl<'a> From<&'a Vec<u64>> for PrimeSource<'a> {
    fn from(primes: &'a Vec<u64>) -> Self {
        PrimeSource::List(primes.as_slice())
    }
}

impl<'a> From<&'a BitSieve> for PrimeSource<'a> {
    fn from(sieve: &'a BitSieve) -> Self {
        PrimeSource::Sieve(sieve)
    }
}

#[derive(Clone, Copy, Debug)]
enum Slice<'a> {
    Primes(&'a [u64]),
    /// ビット位置の半開区間 `[lo, hi)`
    Bits {
        sieve: &'a BitSieve,
        lo: usize,
        hi: usize,
    },
}

/// 1 ワーカーが受け持つ連続した素数列の断片。
#[derive(Clone, Copy, Debug)]
pub struct Partition<'a> {
    index: usize,
    slice: Slice<'a>,
}

impl<'a> Partition<'a> {
    /// 全体の中での順番（0 始まり）。
    pub fn index(&self) -> usize {
        self.index
    }

    /// この断片に含まれる素数をすべて昇順に返す。
    pub fn iter(&self) -> Box<dyn Iterator<Item = u64> + 'a> {
        match self.slice {
            Slice::Primes(primes) => Box::new(primes.iter().copied()),
            Slice::Bits { sieve, lo, hi } => Box::new(sieve.iter_window(lo, hi)),
        }
    }

    /// この断片のうち `[start, end]` に入る素数を昇順に返す。
    pub fn iter_in_range(&self, start: u64, end: u64) -> Box<dyn Iterator<Item = u64> + 'a> {
        match self.slice {
            Slice::Primes(primes) => Box::new(list_window(primes, start, end).iter().copied()),
            Slice::Bits { sieve, lo, hi } => match bits_window(sieve, lo, hi, start, end) {
                Some((lo, hi)) => Box::new(sieve.iter_window(lo, hi)),
                None => Box::new(std::iter::empty()),
            },
        }
    }

    pub fn filter_range(&self, start: u64, end: u64) -> Vec<u64> {
        self.iter_in_range(start, end).collect()
    }

    pub fn count_in_range(&self, start: u64, end: u64) -> u64 {
        match self.slice {
            Slice::Primes(primes) => list_window(primes, start, end).len() as u64,
            Slice::Bits { sieve, lo, hi } => match bits_window(sieve, lo, hi, start, end) {
                Some((lo, hi)) => sieve.count_window(lo, hi),
                None => 0,
            },
        }
    }

    /// この断片の `[start, end]` 内で `local_k` 番目（1 始まり）の素数。
    pub fn nth_in_range(&self, start: u64, end: u64, local_k: u64) -> Option<u64> {
        if local_k == 0 {
            return None;
        }
        match self.slice {
            Slice::Primes(primes) => list_window(primes, start, end)
                .get((local_k - 1) as usize)
                .copied(),
            Slice::Bits { .. } => self.iter_in_range(start, end).nth((local_k - 1) as usize),
        }
    }
}

/// 昇順リストのうち `[start, end]` に入る部分スライス（2 分探索）。
fn list_window(primes: &[u64], start: u64, end: u64) -> &[u64] {
    let lo = primes.partition_point(|&p| p < start);
    let hi = primes.partition_point(|&p| p <= end);
    if lo >= hi {
        &[]
    } else {
        &primes[lo..hi]
    }
}

/// パーティションのビット区間 `[lo, hi)` と `[start, end]` の共通部分。
fn bits_window(
    sieve: &BitSieve,
    lo: usize,
    hi: usize,
    start: u64,
    end: u64,
) -> Option<(usize, usize)> {
    let (q_lo, q_hi) = sieve.window(start, end)?;
    let lo = lo.max(q_lo);
    let hi = hi.min(q_hi);
    (lo < hi).then_some((lo, hi))
}

/// `source` を `partition_count` 個の連続した断片に分ける。
///
/// 位置 `[i·len/n, (i+1)·len/n)` を i 番目の断片に割り当てる。
/// リストならリストの位置、判定表ならビット位置で分けるので、要素数が少ないと空の断片もできる。
pub fn partition(source: PrimeSource<'_>, partition_count: usize) -> PrimeResult<Vec<Partition<'_>>> {
    if partition_count == 0 {
        return Err(SieveError::InvalidPartitionCount(partition_count));
    }

    let partitions = (0..partition_count)
        .map(|index| {
            let slice = match source {
                PrimeSource::List(primes) => {
                    let lo = split_point(primes.len(), partition_count, index);
                    let hi = split_point(primes.len(), partition_count, index + 1);
                    Slice::Primes(&primes[lo..hi])
                }
                PrimeSource::Sieve(sieve) => Slice::Bits {
                    sieve,
                    lo: split_point(sieve.len(), partition_count, index),
                    hi: split_point(sieve.len(), partition_count, index + 1),
                },
            };
            Partition { index, slice }
        })
        .collect();

    Ok(partitions)
}

/// パーティション番号付きの部分結果。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartialResult<T> {
    pub partition_index: usize,
    pub value: T,
}

/// 部分的に絞り込んだ列を番号順に連結する。入力の並び（完了順）には依存しない。
pub fn merge_partials(mut partials: Vec<PartialResult<Vec<u64>>>) -> Vec<u64> {
    partials.sort_by_key(|r| r.partition_index);
    let total = partials.iter().map(|r| r.value.len()).sum();
    let mut merged = Vec::with_capacity(total);
    for r in partials {
        merged.extend(r.value);
    }
    merged
}

/// 部分個数を番号順に累積し、k 番目（1 始まり）がどの断片の何番目かを返す。
///
/// 合計が k に届かない場合（k == 0 を含む）は `InvalidIndex`。
pub fn locate_nth(counts: &[PartialResult<u64>], k: u64) -> PrimeResult<(usize, u64)> {
    let mut ordered: Vec<&PartialResult<u64>> = counts.iter().collect();
    ordered.sort_by_key(|r| r.partition_index);

    let total: u64 = ordered.iter().map(|r| r.value).sum();
    if k == 0 || k > total {
        return Err(SieveError::InvalidIndex { k, count: total });
    }

    let mut seen = 0u64;
    for r in ordered {
        if seen + r.value >= k {
            return Ok((r.partition_index, k - seen));
        }
        seen += r.value;
    }
    Err(SieveError::InvalidIndex { k, count: total })
}

/// パーティション単位で範囲フィルタ・個数計算を実行し、結果を番号順に結合する。
#[derive(Clone, Debug)]
pub struct PartitionedEvaluator {
    partition_count: usize,
    execution: ExecutionMode,
}

impl Default for PartitionedEvaluator {
    fn default() -> Self {
        Self {
            partition_count: NUM_SLICES,
            execution: ExecutionMode::Parallel,
        }
    }
}

impl PartitionedEvaluator {
    pub fn new(partition_count: usize, execution: ExecutionMode) -> PrimeResult<Self> {
        if partition_count == 0 {
            return Err(SieveError::InvalidPartitionCount(partition_count));
        }
        Ok(Self {
            partition_count,
            execution,
        })
    }

    pub fn from_config(cfg: &QueryConfig) -> PrimeResult<Self> {
        Self::new(cfg.partition_count, cfg.execution)
    }

    pub fn partition_count(&self) -> usize {
        self.partition_count
    }

    pub fn execution(&self) -> ExecutionMode {
        self.execution
    }

    /// 各パーティションに `work` を適用し、番号順に並べた部分結果を返す。
    fn run_partials<'a, T, F>(&self, partitions: &[Partition<'a>], work: F) -> Vec<PartialResult<T>>
    where
        T: Send,
        F: Fn(&Partition<'a>) -> T + Sync + Send,
    {
        let mut results: Vec<PartialResult<T>> = match self.execution {
            ExecutionMode::Parallel => partitions
                .par_iter()
                .map(|p| PartialResult {
                    partition_index: p.index(),
                    value: work(p),
                })
                .collect(),
            ExecutionMode::Sequential => partitions
                .iter()
                .map(|p| PartialResult {
                    partition_index: p.index(),
                    value: work(p),
                })
                .collect(),
        };
        results.sort_by_key(|r| r.partition_index);
        results
    }

    /// `[start, end]` に入る素数を、パーティションごとに絞り込んでから番号順に連結する。
    pub fn filter_range<'a>(
        &self,
        source: impl Into<PrimeSource<'a>>,
        start: u64,
        end: u64,
    ) -> PrimeResult<Vec<u64>> {
        validate_range(start, end)?;
        let partitions = partition(source.into(), self.partition_count)?;
        let partials = self.run_partials(&partitions, |p| p.filter_range(start, end));
        let merged = merge_partials(partials);
        log::debug!(
            "Filtered [{start}, {end}] over {} partitions: {} primes",
            self.partition_count,
            merged.len()
        );
        Ok(merged)
    }

    /// `[start, end]` に入る素数の個数（部分個数の合計）。
    pub fn count_range<'a>(
        &self,
        source: impl Into<PrimeSource<'a>>,
        start: u64,
        end: u64,
    ) -> PrimeResult<u64> {
        validate_range(start, end)?;
        let partitions = partition(source.into(), self.partition_count)?;
        let counts = self.run_partials(&partitions, |p| p.count_in_range(start, end));
        Ok(counts.iter().map(|r| r.value).sum())
    }

    /// `[start, end]` で k 番目（1 始まり）の素数。
    pub fn nth_in_range<'a>(
        &self,
        source: impl Into<PrimeSource<'a>>,
        start: u64,
        end: u64,
        k: u64,
    ) -> PrimeResult<u64> {
        self.nth_with_count(source, start, end, k).map(|(_, prime)| prime)
    }

    /// 範囲内の素数の個数と k 番目（1 始まり）の素数を、1 回の部分個数計算で求める。
    ///
    /// 全体を連結せず、部分個数を番号順に累積して k に届いた断片の中だけを探す。
    pub fn nth_with_count<'a>(
        &self,
        source: impl Into<PrimeSource<'a>>,
        start: u64,
        end: u64,
        k: u64,
    ) -> PrimeResult<(u64, u64)> {
        validate_range(start, end)?;
        let partitions = partition(source.into(), self.partition_count)?;
        let counts = self.run_partials(&partitions, |p| p.count_in_range(start, end));
        for r in &counts {
            log::debug!("partition {}: {} primes in range", r.partition_index, r.value);
        }

        let (index, local_k) = locate_nth(&counts, k)?;
        let total = counts.iter().map(|r| r.value).sum();
        partitions[index]
            .nth_in_range(start, end, local_k)
            .map(|prime| (total, prime))
            .ok_or(SieveError::InvalidIndex { k, count: total })
    }
}
