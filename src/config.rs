use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::algorithm::SieveAlgorithm;
use crate::engine_types::{PrimeResult, SieveError};

/// パーティション数の既定値。
pub const NUM_SLICES: usize = 16;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// rayon のスレッドプールでパーティションごとに並列実行
    #[default]
    Parallel,
    /// 呼び出しスレッドで順番に実行（結果は Parallel と同一）
    Sequential,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QueryConfig {
    #[serde(default)]
    pub algorithm: SieveAlgorithm,
    #[serde(default = "default_partition_count")]
    pub partition_count: usize,
    #[serde(default)]
    pub execution: ExecutionMode,
    #[serde(default = "default_memory_usage_percent")]
    pub memory_usage_percent: f64,
}

fn default_partition_count() -> usize {
    NUM_SLICES
}

fn default_memory_usage_percent() -> f64 {
    crate::algorithm::DEFAULT_MEMORY_USAGE_PERCENT
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            algorithm: SieveAlgorithm::default(),
            partition_count: default_partition_count(),
            execution: ExecutionMode::default(),
            memory_usage_percent: default_memory_usage_percent(),
        }
    }
}

impl QueryConfig {
    pub fn validate(&self) -> PrimeResult<()> {
        if self.partition_count == 0 {
            return Err(SieveError::InvalidPartitionCount(self.partition_count));
        }
        Ok(())
    }
}

pub fn load_config<P: AsRef<Path>>(
    path: P,
) -> Result<QueryConfig, Box<dyn std::error::Error + Send + Sync>> {
    let mut file = File::open(path.as_ref())?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    let cfg: QueryConfig = toml::from_str(&contents)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_or_create_config<P: AsRef<Path>>(
    path: P,
) -> Result<QueryConfig, Box<dyn std::error::Error + Send + Sync>> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        let cfg = QueryConfig::default();
        save_config(path, &cfg)?;
        log::info!("Wrote default settings to {}", path.display());
        Ok(cfg)
    }
}

pub fn save_config<P: AsRef<Path>>(
    path: P,
    cfg: &QueryConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let toml_str = toml::to_string_pretty(cfg)?;
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    writer.write_all(toml_str.as_bytes())?;
    writer.flush()?;
    Ok(())
}
