// SPDX: CC0-1.0

use crate::{matrix, storage::Storage, Number, Viewport};
use core::fmt;
use log::warn;
use serde::{Deserialize, Serialize};

pub const STORAGE_KEY: &str = "calculatorPreferences";

pub const MAX_DECIMAL_PLACES: usize = 20;
pub const DEFAULT_DECIMAL_PLACES: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Neon,
    Retro,
}

impl Theme {
    pub const fn exhaustive() -> &'static [Theme] {
        &[Self::Dark, Self::Light, Self::Neon, Self::Retro]
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
            Self::Neon => "neon",
            Self::Retro => "retro",
        }
    }
}

impl core::str::FromStr for Theme {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for theme in Self::exhaustive() {
            if s == theme.name() {
                return Ok(*theme);
            }
        }
        Err(())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    #[default]
    Rad,
    Deg,
}

impl AngleUnit {
    pub const fn exhaustive() -> &'static [AngleUnit] {
        &[Self::Rad, Self::Deg]
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Rad => "rad",
            Self::Deg => "deg",
        }
    }
}

impl core::str::FromStr for AngleUnit {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for unit in Self::exhaustive() {
            if s == unit.name() {
                return Ok(*unit);
            }
        }
        Err(())
    }
}

impl fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// stored as one json record under STORAGE_KEY with the legacy camelCase keys
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub theme: Theme,
    pub angle_unit: AngleUnit,
    pub decimal_places: usize,
    pub memory: Number,
    pub matrix_size: usize,
    pub graph_range: Viewport,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            angle_unit: AngleUnit::Rad,
            decimal_places: DEFAULT_DECIMAL_PLACES,
            memory: 0.0,
            matrix_size: matrix::DEFAULT_SIZE,
            graph_range: Viewport::DEFAULT,
        }
    }
}

// loose mirror of the stored record; fields are vetted one by one, so an
// out-of-range value costs only that field, not the whole record
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawPreferences {
    theme: Option<String>,
    angle_unit: Option<String>,
    decimal_places: Option<i64>,
    memory: Option<Number>,
    matrix_size: Option<i64>,
    graph_range: Option<Viewport>,
}

impl Preferences {
    pub fn load(store: &impl Storage) -> Preferences {
        let Some(text) = store.get(STORAGE_KEY) else {
            return Preferences::default();
        };
        match serde_json::from_str::<RawPreferences>(&text) {
            Ok(raw) => Self::from_raw(raw),
            Err(err) => {
                warn!("could not load preferences: {err}");
                Preferences::default()
            }
        }
    }

    fn from_raw(raw: RawPreferences) -> Preferences {
        let mut prefs = Preferences::default();
        if let Some(theme) = raw.theme.and_then(|s| s.parse().ok()) {
            prefs.theme = theme;
        }
        if let Some(unit) = raw.angle_unit.and_then(|s| s.parse().ok()) {
            prefs.angle_unit = unit;
        }
        if let Some(places) = raw.decimal_places {
            if (0..=MAX_DECIMAL_PLACES as i64).contains(&places) {
                prefs.decimal_places = places as usize;
            }
        }
        if let Some(memory) = raw.memory {
            if memory.is_finite() {
                prefs.memory = memory;
            }
        }
        if let Some(size) = raw.matrix_size {
            if (matrix::MIN_SIZE as i64..=matrix::MAX_SIZE as i64).contains(&size) {
                prefs.matrix_size = size as usize;
            }
        }
        if let Some(range) = raw.graph_range {
            if range.is_valid() {
                prefs.graph_range = range;
            }
        }
        prefs
    }

    pub fn save(&self, store: &mut impl Storage) -> bool {
        match serde_json::to_string(self) {
            Ok(text) => store.set(STORAGE_KEY, &text),
            Err(err) => {
                warn!("could not serialize preferences: {err}");
                false
            }
        }
    }
}
