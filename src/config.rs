//! Settings loaded from `<data dir>/settings.json`.
//!
//! Every field has a default, so a missing or partial file is fine. A file
//! that exists but does not parse falls back to defaults with a warning.

use serde::{Deserialize, Serialize};
use serde_json::from_slice;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::controller::Timings;
use crate::data::{AnalysisStep, GeoPoint, MUMBAI_FALLBACK, default_analysis_steps};
use crate::error::{BoundaryError, Result};

pub const SETTINGS_FILE: &str = "settings.json";

/// Upper bound for any configured duration.
pub const MAX_DURATION_MS: u64 = 60 * 60 * 1000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub delay_before_analysis_ms: u64,
    pub step_interval_ms: u64,
    pub settle_delay_ms: u64,
    pub map_zoom_ms: u64,
    pub message_delay_ms: u64,
    /// Pause between resolving the location and starting the pan.
    pub location_settle_ms: u64,
    pub fallback_center: GeoPoint,
    /// Position reported by the location provider; absent means denied.
    pub initial_center: Option<GeoPoint>,
    pub analysis_steps: Vec<AnalysisStep>,
    /// Relative to the data dir.
    pub export_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delay_before_analysis_ms: 2500,
            step_interval_ms: 1800,
            settle_delay_ms: 1500,
            map_zoom_ms: 1800,
            message_delay_ms: 400,
            location_settle_ms: 300,
            fallback_center: MUMBAI_FALLBACK,
            initial_center: None,
            analysis_steps: default_analysis_steps(),
            export_file: PathBuf::from("boundary.geojson"),
        }
    }
}

impl Settings {
    /// Reads `settings.json` from `data_dir`, falling back to defaults.
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let path = data_dir.as_ref().join(SETTINGS_FILE);
        let settings = match fs::read(&path) {
            Ok(bytes) => from_slice::<Settings>(&bytes).unwrap_or_else(|e| {
                log::warn!("ignoring {}: {}", path.display(), e);
                Settings::default()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("no {}, using defaults", path.display());
                Settings::default()
            }
            Err(e) => {
                log::warn!("cannot read {}: {}, using defaults", path.display(), e);
                Settings::default()
            }
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.analysis_steps.is_empty() {
            return Err(BoundaryError::Config("analysis_steps is empty".into()));
        }
        if self.step_interval_ms == 0 {
            return Err(BoundaryError::Config("step_interval_ms must be positive".into()));
        }
        let durations = [
            ("delay_before_analysis_ms", self.delay_before_analysis_ms),
            ("step_interval_ms", self.step_interval_ms),
            ("settle_delay_ms", self.settle_delay_ms),
            ("map_zoom_ms", self.map_zoom_ms),
            ("message_delay_ms", self.message_delay_ms),
            ("location_settle_ms", self.location_settle_ms),
        ];
        if let Some((name, ms)) = durations.iter().find(|(_, ms)| *ms > MAX_DURATION_MS) {
            return Err(BoundaryError::Config(format!(
                "{} = {} exceeds {} ms",
                name, ms, MAX_DURATION_MS
            )));
        }
        let c = self.fallback_center;
        if !(-90.0..=90.0).contains(&c.latitude) || !(-180.0..=180.0).contains(&c.longitude) {
            return Err(BoundaryError::Config(format!("fallback_center out of range: {:?}", c)));
        }
        Ok(())
    }

    pub fn timings(&self) -> Timings {
        Timings {
            delay_before_analysis_ms: self.delay_before_analysis_ms,
            step_interval_ms: self.step_interval_ms,
            settle_delay_ms: self.settle_delay_ms,
        }
    }

    /// How long after the location resolves the tap instructions appear.
    pub fn centering_delay_ms(&self) -> u64 {
        self.map_zoom_ms.saturating_add(self.message_delay_ms)
    }

    pub fn export_path<P: AsRef<Path>>(&self, data_dir: P) -> PathBuf {
        data_dir.as_ref().join(&self.export_file)
    }
}
