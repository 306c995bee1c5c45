use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::program::ColorToken;

/// Fixed palette of sound cues the presentation layer can render.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SoundToken {
    Beep,
    Bell,
    Chime,
    Success,
    Whistle,
    Gong,
    Buzz,
    Cheer,
    Motivation,
    Energy,
}

/// Which sound plays at each step boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSettings {
    pub move_end: SoundToken,
    pub rest_end: SoundToken,
    pub set_end: SoundToken,
    pub exercise_end: SoundToken,
    pub rest_start: SoundToken,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            move_end: SoundToken::Beep,
            rest_end: SoundToken::Bell,
            set_end: SoundToken::Chime,
            exercise_end: SoundToken::Success,
            rest_start: SoundToken::Whistle,
        }
    }
}

/// Default color tokens for new moves and rests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSettings {
    pub move_color: ColorToken,
    pub rest_color: ColorToken,
    pub set_rest_color: ColorToken,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            move_color: ColorToken::Blue,
            rest_color: ColorToken::Green,
            set_rest_color: ColorToken::Orange,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub colors: ColorSettings,
}

pub trait SettingsStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "kondi") {
            pd.config_dir().join("settings.json")
        } else {
            PathBuf::from("kondi_settings.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Settings {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(settings) = serde_json::from_slice::<Settings>(&bytes) {
                return settings;
            }
        }
        Settings::default()
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_documented_palette() {
        let audio = AudioSettings::default();
        assert_eq!(audio.move_end, SoundToken::Beep);
        assert_eq!(audio.rest_end, SoundToken::Bell);
        assert_eq!(audio.set_end, SoundToken::Chime);
        assert_eq!(audio.exercise_end, SoundToken::Success);
        assert_eq!(audio.rest_start, SoundToken::Whistle);
    }

    #[test]
    fn audio_settings_serialize_camel_case() {
        let json = serde_json::to_string(&AudioSettings::default()).unwrap();
        assert!(json.contains("\"moveEnd\":\"beep\""));
        assert!(json.contains("\"restStart\":\"whistle\""));
    }

    #[test]
    fn roundtrip_settings_file() {
        let dir = tempdir().unwrap();
        let store = FileSettingsStore::with_path(dir.path().join("settings.json"));
        let mut settings = Settings::default();
        settings.audio.move_end = SoundToken::Gong;
        settings.colors.rest_color = ColorToken::Purple;
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, b"{not json").unwrap();
        let store = FileSettingsStore::with_path(&path);
        assert_eq!(store.load(), Settings::default());
    }
}
