//! 範囲列挙・k 番目クエリを端から端まで実行する。
//!
//! 上限 `end` までの判定表を一度だけ作り、パーティションに分けて評価し、
//! 結果と `QueryReport` を返す。ファイルへの書き出しや結果の表示は呼び出し側の役目。

use std::time::Instant;

use crate::algorithm::build_sieve_with_budget;
use crate::bit_sieve::BitSieve;
use crate::config::QueryConfig;
use crate::engine_types::{validate_range, PrimeResult};
use crate::output::{PrimeWriter, QueryReport};
use crate::partition::PartitionedEvaluator;

#[derive(Debug, Clone)]
pub struct RangeOutcome {
    pub primes: Vec<u64>,
    pub report: QueryReport,
}

impl RangeOutcome {
    pub fn write_to(&self, writer: &mut impl PrimeWriter) -> std::io::Result<()> {
        writer.write_all_primes(self.primes.iter().copied())
    }
}

#[derive(Debug, Clone)]
pub struct NthOutcome {
    pub prime: u64,
    pub report: QueryReport,
}

fn prepare(cfg: &QueryConfig, start: u64, end: u64) -> PrimeResult<(BitSieve, PartitionedEvaluator)> {
    validate_range(start, end)?;
    cfg.validate()?;
    let evaluator = PartitionedEvaluator::from_config(cfg)?;
    let sieve = build_sieve_with_budget(end, cfg.algorithm, cfg.memory_usage_percent)?;
    Ok((sieve, evaluator))
}

/// `[start, end]` の素数をすべて求める。
pub fn run_range_query(cfg: &QueryConfig, start: u64, end: u64) -> PrimeResult<RangeOutcome> {
    let start_time = Instant::now();
    let (sieve, evaluator) = prepare(cfg, start, end)?;

    let primes = evaluator.filter_range(&sieve, start, end)?;
    let report = QueryReport::new(
        cfg.algorithm,
        (start, end),
        primes.len() as u64,
        None,
        evaluator.partition_count(),
        start_time.elapsed().as_millis() as u64,
    );
    log::info!("{report}");

    Ok(RangeOutcome { primes, report })
}

/// `[start, end]` で k 番目（1 始まり）の素数を求める。
pub fn run_nth_query(cfg: &QueryConfig, start: u64, end: u64, k: u64) -> PrimeResult<NthOutcome> {
    let start_time = Instant::now();
    let (sieve, evaluator) = prepare(cfg, start, end)?;

    let (count, prime) = evaluator.nth_with_count(&sieve, start, end, k)?;
    let report = QueryReport::new(
        cfg.algorithm,
        (start, end),
        count,
        Some((k, prime)),
        evaluator.partition_count(),
        start_time.elapsed().as_millis() as u64,
    );
    log::info!("{report}");

    Ok(NthOutcome { prime, report })
}
