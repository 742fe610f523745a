pub mod engine_types;
pub mod sieve_math;
pub mod bit_sieve;
pub mod eratosthenes;
pub mod atkin;
pub mod algorithm;
pub mod range_query;
pub mod partition;
pub mod config;
pub mod memory;
pub mod verify;
pub mod output;
pub mod query;

pub use algorithm::{build_sieve, build_sieve_by_name, SieveAlgorithm};
pub use bit_sieve::BitSieve;
pub use engine_types::{PrimeResult, SieveError};
pub use partition::{partition, Partition, PartitionedEvaluator, PrimeSource};
pub use range_query::{count_in_range, nth_in_range, primes_in_range};
