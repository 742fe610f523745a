use std::fmt;
use std::io::{self, BufWriter, Write};

use chrono::Local;
use serde::Serialize;

use crate::algorithm::SieveAlgorithm;

/// クエリ 1 回分のメタデータ。呼び出し側がログやレポートファイルに出すために使う。
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub algorithm: SieveAlgorithm,
    pub range: (u64, u64),
    pub count: u64,
    /// k 番目クエリのときだけ `(k, k 番目の素数)`
    pub nth: Option<(u64, u64)>,
    pub partition_count: usize,
    pub execution_time_ms: u64,
    pub generated_at: String,
    pub tool_version: String,
}

impl QueryReport {
    pub fn new(
        algorithm: SieveAlgorithm,
        range: (u64, u64),
        count: u64,
        nth: Option<(u64, u64)>,
        partition_count: usize,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            algorithm,
            range,
            count,
            nth,
            partition_count,
            execution_time_ms,
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for QueryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (start, end) = self.range;
        write!(
            f,
            "There are {} prime numbers in range {} to {}",
            self.count, start, end
        )?;
        if let Some((k, p)) = self.nth {
            write!(f, ". The {k} prime number is: {p}")?;
        }
        Ok(())
    }
}

/// 素数を 1 つずつ受け取る出力先。
pub trait PrimeWriter {
    fn write_prime(&mut self, p: u64) -> io::Result<()>;
    fn finish(&mut self) -> io::Result<()>;

    /// 昇順の列をまとめて書き込み、最後に `finish` する。
    fn write_all_primes<I>(&mut self, primes: I) -> io::Result<()>
    where
        I: IntoIterator<Item = u64>,
        Self: Sized,
    {
        for p in primes {
            self.write_prime(p)?;
        }
        self.finish()
    }
}

/// 1 行に 1 つの 10 進数で書き出す Writer。ファイル名や置き場所は呼び出し側が決める。
pub struct TextPrimeWriter<W: Write> {
    writer: BufWriter<W>,
    total_count: u64,
}

impl<W: Write> TextPrimeWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: BufWriter::new(inner),
            total_count: 0,
        }
    }

    pub fn with_capacity(buf_size: usize, inner: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(buf_size, inner),
            total_count: 0,
        }
    }

    /// これまでに書き込まれた素数の総数を返します。
    pub fn total_primes_written(&self) -> u64 {
        self.total_count
    }

    /// バッファを書き出して内側の Writer を返す。
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}

impl<W: Write> PrimeWriter for TextPrimeWriter<W> {
    fn write_prime(&mut self, p: u64) -> io::Result<()> {
        writeln!(self.writer, "{p}")?;
        self.total_count += 1;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// 最後の素数と個数だけを保持し、書き出しは一切しない Writer。
#[derive(Debug, Default)]
pub struct LastPrimeWriter {
    last_prime: Option<u64>,
    total_count: u64,
}

impl LastPrimeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_last_prime(&self) -> Option<u64> {
        self.last_prime
    }

    pub fn total_primes_written(&self) -> u64 {
        self.total_count
    }
}

impl PrimeWriter for LastPrimeWriter {
    fn write_prime(&mut self, p: u64) -> io::Result<()> {
        self.last_prime = Some(p);
        self.total_count += 1;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}
