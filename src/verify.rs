use std::collections::VecDeque;
use std::io::BufRead;

use crate::bit_sieve::BitSieve;

/// 検証処理の結果型（I/O・パースエラーと不正な列をまとめて扱う）。
pub type VerifyResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    /// 検証した値の個数（行数）。
    pub line_count: u64,
    /// Miller-Rabin によって末尾から実際にチェックした件数。
    pub checked_tail: usize,
    /// 最初の値（空の列なら None）。
    pub min: Option<u64>,
    /// 最後の値（空の列なら None）。
    pub max: Option<u64>,
}

/// 64bit 整数に対する決定的 Miller-Rabin 素数判定。
///
/// 篩の結果を大きな上限で抜き取り検査するときの独立した判定器として使います。
///
/// 参考: https://miller-rabin.appspot.com/ （64bit 用の既知の基数セット）
pub fn is_probable_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for p in [2u64, 3, 5, 7, 11, 13] {
        if n % p == 0 {
            return n == p;
        }
    }

    // n-1 = d * 2^s を求める
    let s = (n - 1).trailing_zeros();
    let d = (n - 1) >> s;

    const BASES: [u64; 7] = [2, 325, 9375, 28178, 450775, 9780504, 1795265022];

    BASES
        .iter()
        .map(|&a| a % n)
        .filter(|&a| a != 0)
        .all(|a| miller_rabin_round(n, d, s, a))
}

fn miller_rabin_round(n: u64, d: u64, s: u32, a: u64) -> bool {
    let mut x = mod_pow(a, d, n);
    if x == 1 || x == n - 1 {
        return true;
    }
    for _ in 1..s {
        x = mod_mul(x, x, n);
        if x == n - 1 {
            return true;
        }
    }
    false
}

fn mod_mul(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

fn mod_pow(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut res = 1u64;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            res = mod_mul(res, base, m);
        }
        base = mod_mul(base, base, m);
        exp >>= 1;
    }
    res
}

/// 1 行 1 素数のテキスト列を検証する。
///
/// - 各行が 10 進整数として読めること、狭義単調増加であることを全行で確認する
/// - 末尾 `sample_tail` 件は Miller-Rabin で素数性も確認する
/// - 空の入力は空の列として受け付ける（範囲内に素数がないクエリの出力）
pub fn verify_prime_text<R: BufRead>(reader: R, sample_tail: usize) -> VerifyResult<VerifyReport> {
    let mut prev: Option<u64> = None;
    let mut line_no: u64 = 0;
    let mut min_val: Option<u64> = None;
    let mut tail: VecDeque<(u64, u64)> = VecDeque::with_capacity(sample_tail.max(1));

    const LOG_INTERVAL: u64 = 1_000_000;

    for line_res in reader.lines() {
        line_no += 1;
        let line = line_res.map_err(|e| format!("I/O error at line {line_no}: {e}"))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(format!("Empty line at {line_no}").into());
        }
        let n: u64 = trimmed
            .parse()
            .map_err(|e| format!("Parse error at line {line_no}: {e}"))?;

        if let Some(p) = prev {
            if n <= p {
                return Err(format!(
                    "Non-increasing sequence at line {line_no}: prev={p}, current={n}",
                )
                .into());
            }
        }

        if min_val.is_none() {
            min_val = Some(n);
        }
        prev = Some(n);

        if sample_tail > 0 {
            if tail.len() == sample_tail {
                tail.pop_front();
            }
            tail.push_back((line_no, n));
        }

        if line_no % LOG_INTERVAL == 0 {
            log::debug!("Verified {line_no} lines (current value: {n})...");
        }
    }

    for (ln, n) in tail.iter() {
        if !is_probable_prime(*n) {
            return Err(format!("Composite detected among tail sample at line {ln}: {n}").into());
        }
    }

    Ok(VerifyReport {
        line_count: line_no,
        checked_tail: tail.len(),
        min: min_val,
        max: prev,
    })
}

/// 判定表を `stride` おきに抜き取り、Miller-Rabin と一致するか調べる。
///
/// 最初に食い違ったインデックスを返す（すべて一致すれば None）。
/// 上限付近の取りこぼしを避けるため `limit` 自身と直前の数個も必ず調べる。
pub fn verify_sieve_sample(sieve: &BitSieve, stride: u64) -> Option<u64> {
    let limit = sieve.limit();
    let stride = stride.max(1);

    let sampled = (0..=limit).step_by(stride as usize);
    let edge = limit.saturating_sub(16)..=limit;

    sampled.chain(edge).find(|&n| match sieve.get(n) {
        Ok(flag) => flag != is_probable_prime(n),
        Err(_) => true,
    })
}
