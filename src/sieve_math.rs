/// `n` 以下の最大の整数平方根 floor(sqrt(n)) を 2 分探索で求める。
///
/// 浮動小数点の丸めに依存しないため、完全平方数の境界（例: 49 → 7, 48 → 6）でも正確です。
pub fn integer_sqrt(n: u64) -> u64 {
    let mut low = 0u64;
    // sqrt(u64::MAX) < 2^32 なので上限を絞っておく
    let mut high = n.min(u32::MAX as u64);
    while low <= high {
        let mid = low + ((high - low) >> 1);
        match mid.checked_mul(mid) {
            Some(sq) if sq == n => return mid,
            Some(sq) if sq < n => low = mid + 1,
            _ => high = mid - 1,
        }
    }
    high
}

/// `[0, limit]` を 1 ビット 1 整数で表すのに必要なビット数。
///
/// `usize` で表現できない場合は `None`（その環境ではビット配列を確保できない）。
pub fn sieve_bit_len(limit: u64) -> Option<usize> {
    let len = limit.checked_add(1)?;
    usize::try_from(len).ok()
}

/// `[0, limit]` のビット配列 1 本あたりのバイト数（ワード境界への切り上げ込み）。
pub fn sieve_bytes(limit: u64) -> u64 {
    let bits = limit as u128 + 1;
    let word_bits = usize::BITS as u128;
    let words = bits.div_ceil(word_bits);
    (words * (word_bits / 8)).min(u64::MAX as u128) as u64
}

/// 位置 `i` の値を `len` 個を `parts` 個に分けたときの境界に写す。
///
/// パーティション `i` は `[split_point(i), split_point(i + 1))` を受け持つ。
pub fn split_point(len: usize, parts: usize, i: usize) -> usize {
    ((i as u128 * len as u128) / parts as u128) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_sqrt_handles_squares_and_neighbours() {
        assert_eq!(integer_sqrt(0), 0);
        assert_eq!(integer_sqrt(1), 1);
        assert_eq!(integer_sqrt(2), 1);
        assert_eq!(integer_sqrt(3), 1);
        assert_eq!(integer_sqrt(4), 2);
        assert_eq!(integer_sqrt(48), 6);
        assert_eq!(integer_sqrt(49), 7);
        assert_eq!(integer_sqrt(50), 7);
        assert_eq!(integer_sqrt(u64::MAX), u32::MAX as u64);
    }

    #[test]
    fn split_points_cover_everything() {
        for parts in 1..10 {
            assert_eq!(split_point(25, parts, 0), 0);
            assert_eq!(split_point(25, parts, parts), 25);
        }
        assert_eq!(split_point(3, 16, 5), 0);
        assert_eq!(split_point(3, 16, 6), 1);
    }

    #[test]
    fn sieve_sizes() {
        assert_eq!(sieve_bit_len(0), Some(1));
        assert_eq!(sieve_bit_len(30), Some(31));
        assert_eq!(sieve_bit_len(u64::MAX), None);
        assert_eq!(sieve_bytes(0), (usize::BITS / 8) as u64);
        assert!(sieve_bytes(1_000_000) >= 1_000_001 / 8);
    }
}
