use std::error::Error;
use std::fmt;

// 篩エンジン・範囲クエリ・パーティション評価で共有するエラー型の定義。
//
// - どのエラーも同期的・局所的で、同じ入力は必ず同じエラーになります（リトライは無意味）。
// - エラー発生時に BitSieve が部分的に書き換わることはありません（構築は一度きり）。

/// コア処理共通の結果型。
pub type PrimeResult<T> = Result<T, SieveError>;

/// 篩の構築やクエリで発生するエラー。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SieveError {
    /// `start > end` の範囲指定。
    InvalidRange { start: u64, end: u64 },
    /// `eratosthenes` / `atkin` 以外のアルゴリズム名。
    UnknownAlgorithm(String),
    /// k 番目の指定が 0、または範囲内の素数の個数を超えている。
    InvalidIndex { k: u64, count: u64 },
    /// `[0, limit]` 外のビット参照（呼び出し側の契約違反）。
    OutOfBoundsAccess { index: u64, limit: u64 },
    /// パーティション数は 1 以上でなければならない。
    InvalidPartitionCount(usize),
    /// ビット配列を確保するとメモリ予算を超える。
    InsufficientMemory {
        limit: u64,
        required_bytes: u64,
        allowed_bytes: u64,
    },
}

impl fmt::Display for SieveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SieveError::InvalidRange { start, end } => {
                write!(f, "Start must be less than or equal to End (start={start}, end={end})")
            }
            SieveError::UnknownAlgorithm(name) => write!(f, "Unknown sieve method: {name}"),
            SieveError::InvalidIndex { k, count } => write!(
                f,
                "Invalid value for nth ({k}). It must be between 1 and the number of primes in the range ({count})"
            ),
            SieveError::OutOfBoundsAccess { index, limit } => {
                write!(f, "Sieve index {index} is outside [0, {limit}]")
            }
            SieveError::InvalidPartitionCount(n) => {
                write!(f, "Partition count must be >= 1, got {n}")
            }
            SieveError::InsufficientMemory {
                limit,
                required_bytes,
                allowed_bytes,
            } => write!(
                f,
                "Sieve up to {limit} needs {required_bytes} bytes, but only {allowed_bytes} bytes are allowed"
            ),
        }
    }
}

impl Error for SieveError {}

/// `start <= end` を検査する。範囲を扱うすべての入口で最初に呼ぶ。
pub fn validate_range(start: u64, end: u64) -> PrimeResult<()> {
    if start > end {
        return Err(SieveError::InvalidRange { start, end });
    }
    Ok(())
}
