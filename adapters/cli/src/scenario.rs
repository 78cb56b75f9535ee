use std::{collections::BTreeMap, fs, path::Path as FsPath};

use anyhow::{Context, Result};
use glam::Vec2;
use serde::Deserialize;
use waypoint_defence_core::{Path, DEFAULT_SEED};
use waypoint_defence_rendering::FrameInput;
use waypoint_defence_world::Config;

/// Intervals run when neither the scenario nor the command line says otherwise.
pub(crate) const DEFAULT_INTERVALS: u64 = 2_000;

/// Scripted run loaded from TOML.
///
/// ```toml
/// seed = 7
/// intervals = 500
/// surface_offset = [8.0, 8.0]
///
/// [[path]]
/// x = 30.0
/// y = 0.0
///
/// [[placements]]
/// interval = 0
/// x = 68.0
/// y = 208.0
/// ```
///
/// Placement coordinates are client-space clicks and go through the same
/// surface translation an interactive front end applies.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    #[serde(default = "default_seed")]
    pub(crate) seed: u64,
    #[serde(default = "default_intervals")]
    pub(crate) intervals: u64,
    #[serde(default)]
    pub(crate) path: Option<Path>,
    #[serde(default)]
    pub(crate) surface_offset: [f32; 2],
    #[serde(default)]
    pub(crate) placements: Vec<ScheduledPlacement>,
}

/// Click submitted at the start of an interval.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScheduledPlacement {
    pub(crate) interval: u64,
    pub(crate) x: f32,
    pub(crate) y: f32,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_intervals() -> u64 {
    DEFAULT_INTERVALS
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            intervals: default_intervals(),
            path: None,
            surface_offset: [0.0, 0.0],
            placements: Vec::new(),
        }
    }
}

impl Scenario {
    /// Reads and parses a scenario file.
    pub(crate) fn load(file: &FsPath) -> Result<Self> {
        let contents = fs::read_to_string(file)
            .with_context(|| format!("failed to read scenario {}", file.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid scenario {}", file.display()))
    }

    /// Parses a scenario from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Applies command-line overrides on top of the file values.
    #[must_use]
    pub(crate) fn with_overrides(mut self, seed: Option<u64>, intervals: Option<u64>) -> Self {
        if let Some(seed) = seed {
            self.seed = seed;
        }
        if let Some(intervals) = intervals {
            self.intervals = intervals;
        }
        self
    }

    /// World configuration for this scenario.
    #[must_use]
    pub(crate) fn world_config(&self) -> Config {
        Config::new(self.path.clone().unwrap_or_default())
    }

    /// Groups the placements into one frame of input per interval.
    #[must_use]
    pub(crate) fn input_schedule(&self) -> BTreeMap<u64, FrameInput> {
        let surface_offset = Vec2::from_array(self.surface_offset);
        let mut schedule: BTreeMap<u64, FrameInput> = BTreeMap::new();
        for placement in &self.placements {
            schedule
                .entry(placement.interval)
                .or_insert_with(|| FrameInput {
                    clicks: Vec::new(),
                    surface_offset,
                })
                .clicks
                .push(Vec2::new(placement.x, placement.y));
        }
        schedule
    }
}
