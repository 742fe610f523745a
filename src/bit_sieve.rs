//! `[0, limit]` の素数判定表（1 整数 1 ビット）。
//!
//! - 書き込めるのは構築時（各篩アルゴリズム）だけで、公開 API は読み取り専用です。
//! - 構築後は `&BitSieve` を複数スレッドから共有して読み出せます。

use bitvec::prelude::*;

use crate::engine_types::{PrimeResult, SieveError};

/// インデックス `i` が素数のとき、かつそのときに限りビット `i` が立つビット配列。
///
/// 不変条件:
/// - 長さは常に `limit + 1`
/// - ビット 0, 1 は常に 0（`limit < 2` なら全ビット 0）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitSieve {
    limit: u64,
    bits: BitVec,
}

impl BitSieve {
    /// 篩アルゴリズムが書き終えたビット配列から構築する。
    pub(crate) fn from_bits(limit: u64, mut bits: BitVec) -> Self {
        debug_assert_eq!(bits.len() as u64, limit + 1);
        for i in 0..bits.len().min(2) {
            bits.set(i, false);
        }
        Self { limit, bits }
    }

    /// 上限値（両端を含む）。
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// 保持しているビット数（`limit + 1`）。
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// `i` が素数かどうか。`i > limit` は契約違反として `OutOfBoundsAccess`。
    pub fn get(&self, i: u64) -> PrimeResult<bool> {
        if i > self.limit {
            return Err(SieveError::OutOfBoundsAccess {
                index: i,
                limit: self.limit,
            });
        }
        Ok(self.bits[i as usize])
    }

    /// すべての素数を昇順に返す遅延イテレータ。何度呼んでも同じ列を最初から返す。
    pub fn scan_all(&self) -> impl Iterator<Item = u64> + '_ {
        self.bits.iter_ones().map(|i| i as u64)
    }

    /// `[0, limit]` に含まれる素数の個数 π(limit)。
    pub fn prime_count(&self) -> u64 {
        self.bits.count_ones() as u64
    }

    /// `scan_all` を実体化した PrimeList。
    pub fn primes(&self) -> Vec<u64> {
        self.scan_all().collect()
    }

    /// `[start, end]` を `[0, limit]` に切り詰めたビット位置の半開区間 `[lo, hi)`。
    ///
    /// 重なりがない場合（`start > limit` など）は `None`。`start <= end` は呼び出し側で検査済みとする。
    pub(crate) fn window(&self, start: u64, end: u64) -> Option<(usize, usize)> {
        if start > end || start > self.limit {
            return None;
        }
        let hi = end.min(self.limit) as usize + 1;
        Some((start as usize, hi))
    }

    /// ビット位置の半開区間 `[lo, hi)` に含まれる素数を昇順に返す。
    pub(crate) fn iter_window(&self, lo: usize, hi: usize) -> impl Iterator<Item = u64> + '_ {
        let hi = hi.min(self.bits.len());
        let lo = lo.min(hi);
        self.bits[lo..hi].iter_ones().map(move |i| (lo + i) as u64)
    }

    /// ビット位置の半開区間 `[lo, hi)` に含まれる素数の個数。
    pub(crate) fn count_window(&self, lo: usize, hi: usize) -> u64 {
        let hi = hi.min(self.bits.len());
        let lo = lo.min(hi);
        self.bits[lo..hi].count_ones() as u64
    }

    /// `[start, end]` の素数を昇順に返す（範囲外は単に含まれない）。
    pub fn iter_range(&self, start: u64, end: u64) -> impl Iterator<Item = u64> + '_ {
        let (lo, hi) = self.window(start, end).unwrap_or((0, 0));
        self.iter_window(lo, hi)
    }

    /// `[start, end]` の素数の個数。列を実体化せずにビットを数える。
    pub fn count_range(&self, start: u64, end: u64) -> u64 {
        match self.window(start, end) {
            Some((lo, hi)) => self.count_window(lo, hi),
            None => 0,
        }
    }
}
