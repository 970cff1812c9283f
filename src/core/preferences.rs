//! Display and editing preferences
//!
//! Each preference is stored under its own key as a plain string. Unknown
//! values fall back to the default and out-of-range sizes are clamped.

use std::ops::RangeInclusive;

use super::error::StorageError;
use super::storage::KeyValueStore;

pub const THEME_KEY: &str = "theme";
pub const FONT_SIZE_KEY: &str = "fontSize";
pub const FONT_FAMILY_KEY: &str = "fontFamily";
pub const AUTO_SAVE_KEY: &str = "autoSave";

pub const FONT_SIZE_RANGE: RangeInclusive<u8> = 12..=24;
pub const DEFAULT_FONT_SIZE: u8 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Self::Light, Self::Dark, Self::System];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Light => "Açık",
            Self::Dark => "Koyu",
            Self::System => "Sistem",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontFamily {
    #[default]
    Inter,
    Serif,
    Monospace,
}

impl FontFamily {
    pub const ALL: [FontFamily; 3] = [Self::Inter, Self::Serif, Self::Monospace];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inter => "Inter",
            Self::Serif => "Serif",
            Self::Monospace => "Monospace",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Inter => "Inter (Varsayılan)",
            Self::Serif => "Serif",
            Self::Monospace => "Monospace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub theme: Theme,
    pub font_size: u8,
    pub font_family: FontFamily,
    pub auto_save: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            font_size: DEFAULT_FONT_SIZE,
            font_family: FontFamily::default(),
            auto_save: false,
        }
    }
}

impl Preferences {
    /// Read preferences, using defaults for anything missing or invalid
    pub fn load(storage: &dyn KeyValueStore) -> Result<Self, StorageError> {
        let defaults = Self::default();

        let theme = storage
            .get(THEME_KEY)?
            .and_then(|v| Theme::parse(v.trim()))
            .unwrap_or(defaults.theme);

        let font_size = storage
            .get(FONT_SIZE_KEY)?
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(clamp_font_size)
            .unwrap_or(defaults.font_size);

        let font_family = storage
            .get(FONT_FAMILY_KEY)?
            .and_then(|v| FontFamily::parse(v.trim()))
            .unwrap_or(defaults.font_family);

        let auto_save = storage
            .get(AUTO_SAVE_KEY)?
            .and_then(|v| v.trim().parse::<bool>().ok())
            .unwrap_or(defaults.auto_save);

        Ok(Self {
            theme,
            font_size,
            font_family,
            auto_save,
        })
    }

    pub fn save(&self, storage: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        storage.set(THEME_KEY, self.theme.as_str())?;
        storage.set(FONT_SIZE_KEY, &self.font_size.to_string())?;
        storage.set(FONT_FAMILY_KEY, self.font_family.as_str())?;
        storage.set(AUTO_SAVE_KEY, &self.auto_save.to_string())?;
        tracing::info!("Saved preferences: {:?}", self);
        Ok(())
    }

    /// Persist only the theme; the settings screen applies it immediately
    pub fn save_theme(&self, storage: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        storage.set(THEME_KEY, self.theme.as_str())
    }
}

fn clamp_font_size(size: i64) -> u8 {
    let (min, max) = (*FONT_SIZE_RANGE.start(), *FONT_SIZE_RANGE.end());
    size.clamp(i64::from(min), i64::from(max)) as u8
}
