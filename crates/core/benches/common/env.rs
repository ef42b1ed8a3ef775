use std::env;

/// Benchmark size tier, `CELLHOOD_BENCH_TIER=full` for the large inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchTier {
    Quick,
    Full,
}

impl BenchTier {
    pub fn from_env() -> Self {
        match env::var("CELLHOOD_BENCH_TIER").as_deref() {
            Ok("full") => Self::Full,
            _ => Self::Quick,
        }
    }
}

/// Generator seed, `CELLHOOD_BENCH_SEED` to reproduce a run.
pub fn bench_seed() -> u64 {
    env::var("CELLHOOD_BENCH_SEED")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0xCE11)
}
