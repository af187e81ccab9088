//! Worker count selection.

use std::num::NonZeroUsize;
use std::str::FromStr;

use crate::error::CoreError;

/// The `--concurrency` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concurrency {
    /// Lint on the calling thread.
    Off,
    /// Half of the available parallelism.
    Auto,
    /// A fixed number of workers.
    Fixed(usize),
}

impl FromStr for Concurrency {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "off" => Ok(Self::Off),
            "auto" => Ok(Self::Auto),
            number => match number.parse::<f64>() {
                Ok(n) if n.is_finite() && n >= 0.0 => Ok(Self::Fixed(n.floor() as usize)),
                _ => Err(CoreError::InvalidConcurrency(value.to_string())),
            },
        }
    }
}

/// The number of workers a run may use. `0` means no workers: the host
/// engine lints sequentially.
pub fn resolve_max_concurrency(concurrency: Option<Concurrency>, available: usize) -> usize {
    match concurrency.unwrap_or(Concurrency::Off) {
        Concurrency::Off => 0,
        Concurrency::Auto => {
            let half = available / 2;
            if half < 2 { 0 } else { half }
        }
        Concurrency::Fixed(n) => n.max(1),
    }
}

/// Workers actually spawned for `file_count` files.
pub fn effective_workers(max_concurrency: usize, file_count: usize) -> usize {
    max_concurrency.min(file_count)
}

/// Hardware parallelism, falling back to 1 when it cannot be determined.
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
