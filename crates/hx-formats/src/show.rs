//! TOML show files.
//!
//! A show file names the speaker ring, the cue list and any tuning
//! overrides. Parsing is two steps: `serde` maps the text onto `ShowFile`,
//! then `ShowFile::into_show` validates it into runtime types. Any
//! inconsistency is reported here so a session never starts half-configured.

use std::path::{Path, PathBuf};
use std::time::Duration;

use hx_engine::EngineConfig;
use hx_ir::{Cue, GainRouting, RampCurve, Schedule, SpeakerLayout};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::FormatError;

/// Raw show file as written on disk.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShowFile {
    pub title: Option<String>,
    /// Program track, relative to the show file.
    pub program: Option<String>,
    #[serde(default)]
    pub layout: LayoutSection,
    #[serde(default)]
    pub tuning: TuningSection,
    pub schedule: ScheduleSection,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutSection {
    pub speakers: usize,
    pub radius: f32,
    pub height: f32,
    pub start_angle: f32,
    pub movable: bool,
    /// `routing[speaker] = gain node`
    pub routing: Option<Vec<usize>>,
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            speakers: 6,
            radius: 3.0,
            height: 0.0,
            start_angle: 0.0,
            movable: false,
            routing: None,
        }
    }
}

/// Every key is optional; missing keys keep `EngineConfig::default()`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TuningSection {
    pub ramp_ms: Option<u64>,
    pub curve: Option<CurveSpec>,
    pub drag_sensitivity: Option<f32>,
    pub key_rate: Option<f32>,
    pub joystick_rate: Option<f32>,
    pub joystick_dead_zone: Option<f32>,
    pub joystick_decay: Option<f32>,
    pub time_update_ms: Option<u64>,
    pub reference_distance: Option<f32>,
}

/// `curve = "linear"` or `curve = { exponential = 3.0 }`
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveSpec {
    Linear,
    Exponential(f32),
}

/// Either parallel `timestamps`/`presets` arrays, or a `patterns` library
/// referenced by `cues`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleSection {
    pub timestamps: Option<Vec<f64>>,
    pub presets: Option<Vec<Vec<f32>>>,
    pub patterns: Option<Vec<Vec<f32>>>,
    pub cues: Option<Vec<CueEntry>>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CueEntry {
    pub at: f64,
    pub pattern: usize,
}

/// A validated show, ready to build a session from.
#[derive(Clone, Debug)]
pub struct Show {
    pub title: String,
    pub program: Option<PathBuf>,
    pub schedule: Schedule,
    pub layout: SpeakerLayout,
    pub routing: GainRouting,
    pub config: EngineConfig,
}

impl ShowFile {
    /// Validate into runtime types. `base` resolves a relative program path.
    pub fn into_show(self, base: Option<&Path>) -> Result<Show, FormatError> {
        let l = &self.layout;
        let layout = SpeakerLayout::ring(l.speakers, l.radius, l.height, l.start_angle)?
            .with_movable(l.movable);
        let routing = match &l.routing {
            Some(table) => GainRouting::from_table(table, layout.count())?,
            None => GainRouting::identity(layout.count()),
        };
        let schedule = self.schedule.build(layout.count())?;
        let config = self.tuning.apply(EngineConfig::default())?;
        let program = self.program.map(|p| match base {
            Some(dir) => dir.join(p),
            None => PathBuf::from(p),
        });
        Ok(Show {
            title: self.title.unwrap_or_else(|| "untitled".to_string()),
            program,
            schedule,
            layout,
            routing,
            config,
        })
    }
}

impl ScheduleSection {
    fn build(&self, speakers: usize) -> Result<Schedule, FormatError> {
        match (&self.timestamps, &self.presets, &self.patterns, &self.cues) {
            (Some(timestamps), Some(presets), None, None) => {
                Ok(Schedule::new(timestamps, presets, speakers)?)
            }
            (None, None, Some(patterns), Some(cues)) => {
                let cues: Vec<Cue> = cues
                    .iter()
                    .map(|c| Cue {
                        timestamp: c.at,
                        pattern: c.pattern,
                    })
                    .collect();
                Ok(Schedule::from_cues(patterns, &cues, speakers)?)
            }
            _ => Err(FormatError::InvalidShow(
                "[schedule] needs either timestamps + presets or patterns + cues".to_string(),
            )),
        }
    }
}

impl TuningSection {
    fn apply(&self, mut config: EngineConfig) -> Result<EngineConfig, FormatError> {
        if let Some(ms) = self.ramp_ms {
            config.ramp = Duration::from_millis(ms);
        }
        if let Some(curve) = self.curve {
            config.curve = match curve {
                CurveSpec::Linear => RampCurve::Linear,
                CurveSpec::Exponential(k) => RampCurve::Exponential(finite("curve", k)?),
            };
        }
        if let Some(v) = self.drag_sensitivity {
            config.drag_sensitivity = finite("drag_sensitivity", v)?;
        }
        if let Some(v) = self.key_rate {
            config.key_rate = finite("key_rate", v)?;
        }
        if let Some(v) = self.joystick_rate {
            config.joystick_rate = finite("joystick_rate", v)?;
        }
        if let Some(v) = self.joystick_dead_zone {
            config.joystick_dead_zone = unit_interval("joystick_dead_zone", v)?;
        }
        if let Some(v) = self.joystick_decay {
            config.joystick_decay = unit_interval("joystick_decay", v)?;
        }
        if let Some(ms) = self.time_update_ms {
            if ms == 0 {
                return Err(FormatError::InvalidShow(
                    "time_update_ms must be positive".to_string(),
                ));
            }
            config.time_update_interval = Duration::from_millis(ms);
        }
        if let Some(v) = self.reference_distance {
            if !(v.is_finite() && v > 0.0) {
                return Err(FormatError::InvalidShow(
                    "reference_distance must be positive".to_string(),
                ));
            }
            config.reference_distance = v;
        }
        Ok(config)
    }
}

fn finite(key: &str, value: f32) -> Result<f32, FormatError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormatError::InvalidShow(format!("{key} must be finite")))
    }
}

fn unit_interval(key: &str, value: f32) -> Result<f32, FormatError> {
    if (0.0..1.0).contains(&value) {
        Ok(value)
    } else {
        Err(FormatError::InvalidShow(format!("{key} must be in [0, 1)")))
    }
}

/// Parse show text. Relative program paths are left as written.
pub fn parse_show(text: &str) -> Result<Show, FormatError> {
    let file: ShowFile = toml::from_str(text)?;
    file.into_show(None)
}

/// Read and parse a show file from disk.
pub fn load_show(path: &Path) -> Result<Show, FormatError> {
    let text = std::fs::read_to_string(path)?;
    let file: ShowFile = toml::from_str(&text)?;
    let show = file.into_show(path.parent())?;
    info!(
        title = %show.title,
        cues = show.schedule.len(),
        speakers = show.layout.count(),
        "show loaded"
    );
    Ok(show)
}
