use sysinfo::System;

use crate::algorithm::SieveAlgorithm;
use crate::engine_types::{PrimeResult, SieveError};
use crate::sieve_math::{sieve_bit_len, sieve_bytes};

/// これ未満の見積もりならシステムメモリを問い合わせずに確保してよい。
const SMALL_SIEVE_BYTES: u64 = 64 * 1024 * 1024;

/// システムの物理メモリ総量を取得（バイト単位）
pub fn get_total_memory() -> u64 {
    let mut sys = System::new();
    sys.refresh_memory();
    sys.total_memory()
}

/// 構築中に同時に生きているビット配列の本数。
///
/// Atkin は候補フラグ用の作業配列と最終結果の 2 本を持つ。
pub fn working_bitsets(algorithm: SieveAlgorithm) -> u64 {
    match algorithm {
        SieveAlgorithm::Eratosthenes => 1,
        SieveAlgorithm::Atkin => 2,
    }
}

/// `[0, limit]` の篩を構築するときのピークメモリを推定（バイト単位）
pub fn estimate_sieve_memory(limit: u64, algorithm: SieveAlgorithm) -> u64 {
    sieve_bytes(limit).saturating_mul(working_bitsets(algorithm))
}

#[derive(Debug, Clone)]
pub struct MemoryInfo {
    pub total_memory: u64,
    pub required: u64,
    pub allowed: u64,
}

impl MemoryInfo {
    pub fn format(&self) -> String {
        format!(
            "Memory: system {:.1}GB, sieve {:.1}MB, allowed {:.1}MB",
            self.total_memory as f64 / (1024.0 * 1024.0 * 1024.0),
            self.required as f64 / (1024.0 * 1024.0),
            self.allowed as f64 / (1024.0 * 1024.0),
        )
    }
}

/// 篩のビット配列を確保してよいか判定する。
///
/// - memory_usage_percent: システムメモリの何%まで使用するか (10.0 ~ 90.0 にクランプ)
/// - `usize` で表現できない上限や、予算を超える見積もりは `InsufficientMemory`
/// - 小さな篩（64MiB 未満）は問い合わせを省略して `Ok(None)` を返す
pub fn check_sieve_memory(
    limit: u64,
    algorithm: SieveAlgorithm,
    memory_usage_percent: f64,
) -> PrimeResult<Option<MemoryInfo>> {
    let required = estimate_sieve_memory(limit, algorithm);

    if sieve_bit_len(limit).is_none() {
        return Err(SieveError::InsufficientMemory {
            limit,
            required_bytes: required,
            allowed_bytes: 0,
        });
    }

    if required < SMALL_SIEVE_BYTES {
        return Ok(None);
    }

    let total_memory = get_total_memory();
    if total_memory == 0 {
        log::warn!("System memory is unknown; skipping the budget check for limit {limit}");
        return Ok(None);
    }
    let percent = memory_usage_percent.clamp(10.0, 90.0);
    let allowed = (total_memory as f64 * percent / 100.0) as u64;

    let info = MemoryInfo {
        total_memory,
        required,
        allowed,
    };
    log::info!("{}", info.format());

    if required > allowed {
        return Err(SieveError::InsufficientMemory {
            limit,
            required_bytes: required,
            allowed_bytes: allowed,
        });
    }
    Ok(Some(info))
}
