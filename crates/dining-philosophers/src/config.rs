//! # Table Configuration
//!
//! The only structural parameter is the list of names: its length is the ring size.
//! Everything else (how long a meal or a thought lasts, how long a time unit is) is
//! simulation aesthetics with defaults taken from the classic demo: five diners,
//! 1 to 5 seconds per phase.
//!
//! Configuration can be overridden from the environment:
//!
//! | Variable               | Meaning                                  |
//! |------------------------|------------------------------------------|
//! | `DINING_PHILOSOPHERS`  | comma-separated names, in seat order     |
//! | `DINING_TIME_UNIT_MS`  | length of one time unit in milliseconds  |
//! | `DINING_SEED`          | base seed for deterministic timing       |
//! | `DINING_RUN_UNITS`     | stop after this many units (else Ctrl-C) |

use crate::error::TableError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ring_framework::RingError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

/// The diners of the classic demo, in seat order.
pub const DEFAULT_NAMES: [&str; 5] = ["Pat", "John", "Becky", "Lauren", "Emily"];

/// An inclusive range of time units, sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRange {
    pub min: u32,
    pub max: u32,
}

impl UnitRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// A range that always yields `units`.
    pub const fn fixed(units: u32) -> Self {
        Self::new(units, units)
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> u32 {
        if self.min >= self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

impl Default for UnitRange {
    fn default() -> Self {
        Self::new(1, 5)
    }
}

/// Startup parameters for a [`Table`](crate::table::Table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Names in seat order. Seat `i` sits between resources `i` and `i + 1`.
    pub names: Vec<String>,
    /// How long a meal lasts.
    pub eat: UnitRange,
    /// How long a philosopher thinks between meals.
    pub think: UnitRange,
    /// Wall-clock length of one unit.
    pub time_unit: Duration,
    /// Base seed. Seat `i` uses `seed + i`; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Stop after this many units. `None` runs until Ctrl-C.
    pub run_for: Option<u32>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            names: DEFAULT_NAMES.iter().map(|n| n.to_string()).collect(),
            eat: UnitRange::default(),
            think: UnitRange::default(),
            time_unit: Duration::from_secs(1),
            seed: None,
            run_for: None,
        }
    }
}

impl TableConfig {
    /// Default timing with the given diners.
    pub fn with_names<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Defaults overlaid with the `DINING_*` environment variables.
    pub fn from_env() -> Result<Self, TableError> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup` (an environment-like key/value source).
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TableError> {
        if let Some(names) = lookup("DINING_PHILOSOPHERS") {
            self.names = names.split(',').map(|n| n.trim().to_string()).collect();
        }
        if let Some(ms) = lookup("DINING_TIME_UNIT_MS") {
            self.time_unit = Duration::from_millis(parse("DINING_TIME_UNIT_MS", &ms)?);
        }
        if let Some(seed) = lookup("DINING_SEED") {
            self.seed = Some(parse("DINING_SEED", &seed)?);
        }
        if let Some(units) = lookup("DINING_RUN_UNITS") {
            self.run_for = Some(parse("DINING_RUN_UNITS", &units)?);
        }
        self.validate()?;
        Ok(self)
    }

    /// Rejects configurations the simulation cannot run with.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.names.len() < 2 {
            return Err(RingError::RingTooSmall {
                size: self.names.len(),
            }
            .into());
        }
        let mut seen = HashSet::new();
        for name in &self.names {
            if name.is_empty() {
                return Err(TableError::Config("empty philosopher name".into()));
            }
            if !seen.insert(name.as_str()) {
                return Err(TableError::Config(format!("duplicate philosopher name: {name}")));
            }
        }
        for (phase, range) in [("eat", self.eat), ("think", self.think)] {
            if range.min > range.max {
                return Err(TableError::Config(format!(
                    "{phase} range is inverted: {}..={}",
                    range.min, range.max
                )));
            }
        }
        if self.time_unit.is_zero() {
            return Err(TableError::Config("time unit must be non-zero".into()));
        }
        Ok(())
    }

    /// `n` units as wall-clock time.
    pub fn units(&self, n: u32) -> Duration {
        self.time_unit * n
    }

    /// The random source for `seat`.
    pub fn rng_for(&self, seat: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(seat as u64)),
            None => StdRng::from_entropy(),
        }
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, TableError> {
    value
        .trim()
        .parse()
        .map_err(|_| TableError::Config(format!("{key}: cannot parse {value:?}")))
}
