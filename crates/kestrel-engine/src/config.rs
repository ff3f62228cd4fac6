//! Engine configuration and validation.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use kestrel_system::PipelineError;

// ── TimeRatio ──────────────────────────────────────────────────────

/// Rational scale applied to wall-clock time: `multiplier / divisor`.
///
/// `2/1` runs the simulation at double speed, `1/4` in slow motion. Kept
/// as integers so scaling a nanosecond delta is exact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeRatio {
    /// Numerator.
    pub multiplier: u32,
    /// Denominator.
    pub divisor: u32,
}

impl TimeRatio {
    /// Real time.
    pub const ONE: Self = Self {
        multiplier: 1,
        divisor: 1,
    };

    /// Construct a ratio. Validity is checked by [`EngineConfig::validate`].
    pub const fn new(multiplier: u32, divisor: u32) -> Self {
        Self {
            multiplier,
            divisor,
        }
    }

    /// Scale a wall-clock duration into simulation nanoseconds.
    pub fn scale_nanos(self, wall: Duration) -> u128 {
        if self.divisor == 0 {
            return 0;
        }
        wall.as_nanos() * self.multiplier as u128 / self.divisor as u128
    }

    /// Scale a wall-clock duration into simulation seconds.
    pub fn scale_secs(self, wall: Duration) -> f32 {
        (self.scale_nanos(wall) as f64 / 1e9) as f32
    }
}

impl Default for TimeRatio {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for TimeRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.multiplier, self.divisor)
    }
}

// ── DesyncPolicy ───────────────────────────────────────────────────

/// What to do when a finished replay does not reproduce its saved end state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DesyncPolicy {
    /// Log at `error!` and panic. A desync is a determinism bug.
    Trap,
    /// Log at `error!` and surface the mismatch in the advance report.
    Report,
}

impl Default for DesyncPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Trap
        } else {
            Self::Report
        }
    }
}

// ── EngineConfig ───────────────────────────────────────────────────

/// Configuration for [`TickEngine`](crate::TickEngine) and
/// [`Scheduler`](crate::Scheduler).
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Fixed simulation rate. Default: 250 Hz.
    pub tick_rate_hz: u32,
    /// Fork-join helper threads. `None` = auto-detect
    /// (`available_parallelism - 1`, clamped to `[0, 16]`).
    pub worker_count: Option<usize>,
    /// Target items per fork-join bucket. Default: 64.
    pub bucket_hint: usize,
    /// Initial wall-clock to simulation time scale. Default: 1/1.
    pub time_ratio: TimeRatio,
    /// Upper bound on the time multiplier when speeding up. Default: 8.
    pub max_time_multiplier: u32,
    /// Display refresh interval. Ticking for longer than this in one
    /// advance halves the time multiplier. Default: 1/60 s.
    pub refresh_interval: Duration,
    /// Most full ticks one advance may run; older backlog is dropped.
    /// Default: 250.
    pub max_ticks_per_advance: u32,
    /// Response to a replay desync.
    pub desync_policy: DesyncPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 250,
            worker_count: None,
            bucket_hint: 64,
            time_ratio: TimeRatio::ONE,
            max_time_multiplier: 8,
            refresh_interval: Duration::from_nanos(1_000_000_000 / 60),
            max_ticks_per_advance: 250,
            desync_policy: DesyncPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Check every invariant. Called by engine constructors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate_hz == 0 || self.tick_rate_hz > 1_000_000_000 {
            return Err(ConfigError::InvalidTickRate {
                value: self.tick_rate_hz,
            });
        }
        let r = self.time_ratio;
        if r.multiplier == 0 || r.divisor == 0 {
            return Err(ConfigError::InvalidTimeRatio {
                reason: format!("time ratio {r} must have non-zero terms"),
            });
        }
        if self.max_time_multiplier == 0 {
            return Err(ConfigError::InvalidTimeRatio {
                reason: "max_time_multiplier must be at least 1".to_string(),
            });
        }
        if r.multiplier > self.max_time_multiplier {
            return Err(ConfigError::InvalidTimeRatio {
                reason: format!(
                    "multiplier {} exceeds max_time_multiplier {}",
                    r.multiplier, self.max_time_multiplier
                ),
            });
        }
        if self.refresh_interval.is_zero() {
            return Err(ConfigError::InvalidRefreshInterval);
        }
        if self.bucket_hint == 0 {
            return Err(ConfigError::InvalidBucketHint);
        }
        if self.max_ticks_per_advance == 0 {
            return Err(ConfigError::InvalidMaxTicks);
        }
        Ok(())
    }

    /// Resolve the fork-join helper count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[0, 64]`. Zero selects the
    /// sequential fallback.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.min(64),
            None => {
                let cpus = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1);
                cpus.saturating_sub(1).min(16)
            }
        }
    }

    /// Length of one full tick.
    pub fn tick_duration(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.tick_rate_hz.max(1) as u64)
    }

    /// Seconds per full tick, as handed to systems.
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate_hz.max(1) as f32
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while building an engine.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// System pipeline validation failed.
    Pipeline(PipelineError),
    /// `tick_rate_hz` is zero or absurdly large.
    InvalidTickRate {
        /// The invalid value.
        value: u32,
    },
    /// Time ratio or multiplier cap is invalid.
    InvalidTimeRatio {
        /// Description of which invariant was violated.
        reason: String,
    },
    /// `refresh_interval` is zero.
    InvalidRefreshInterval,
    /// `bucket_hint` is zero.
    InvalidBucketHint,
    /// `max_ticks_per_advance` is zero.
    InvalidMaxTicks,
    /// The fork-join thread pool could not be built.
    ThreadPool {
        /// Description from the pool builder.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pipeline(e) => write!(f, "pipeline: {e}"),
            Self::InvalidTickRate { value } => {
                write!(f, "tick_rate_hz must be in 1..=1e9, got {value}")
            }
            Self::InvalidTimeRatio { reason } => write!(f, "invalid time ratio: {reason}"),
            Self::InvalidRefreshInterval => write!(f, "refresh_interval must be non-zero"),
            Self::InvalidBucketHint => write!(f, "bucket_hint must be at least 1"),
            Self::InvalidMaxTicks => write!(f, "max_ticks_per_advance must be at least 1"),
            Self::ThreadPool { reason } => write!(f, "thread pool: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PipelineError> for ConfigError {
    fn from(e: PipelineError) -> Self {
        Self::Pipeline(e)
    }
}
