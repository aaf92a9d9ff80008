//! Top-level configuration of a SimSims run.

use serde::{Deserialize, Serialize};
use simsims_core::config::EconomyConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Size of the surface places are built on, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
        }
    }
}

/// Everything a run reads from its configuration file. Every field has a
/// default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimsConfig {
    pub surface: Surface,
    /// Directory holding save files.
    pub save_dir: PathBuf,
    /// Ticks per second.
    pub framerate: u32,
    /// How many frames a headless run lasts.
    pub frames: u64,
    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
    pub economy: EconomyConfig,
}

impl Default for SimsConfig {
    fn default() -> Self {
        Self {
            surface: Surface::default(),
            save_dir: PathBuf::from("saves"),
            framerate: 60,
            frames: 600,
            log_filter: "info".to_string(),
            economy: EconomyConfig::default(),
        }
    }
}

impl SimsConfig {
    /// Duration of one frame. A zero framerate means "as fast as possible".
    pub fn frame_duration(&self) -> Duration {
        if self.framerate == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / self.framerate
        }
    }
}
