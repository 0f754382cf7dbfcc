use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    FRAME_DELAY_MS, LEADING_MARGIN, MAX_MESSAGE_LEN, PANEL_HEIGHT, PANEL_WIDTH, SPACE_ADVANCE,
    WIPE_DELAY_MS,
};
use crate::font::GlyphTable;
use crate::panel::PanelGeometry;
use crate::render::Layout;

/// Configuration for Cylinder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub panel: PanelConfig,
    pub font: FontConfig,
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub listener: ListenerConfig,
    #[serde(default)]
    pub driver: DriverConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Light columns
    pub width: u32,
    /// Light rows; must equal the font height
    pub height: u32,
    /// Row 0 of the message is wired at the bottom of the strip
    pub flip_y: bool,
    /// Global brightness applied by the driver (0-255)
    pub brightness: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontConfig {
    /// Pre-rendered font sheet (PNG)
    pub sheet: PathBuf,
    /// Glyph table (TOML); the built-in table is used when unset
    #[serde(default)]
    pub table: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Pause after each frame in milliseconds
    pub delay_ms: u64,
    /// Blank columns before the message
    pub leading_margin: u32,
    /// Advance of the space character
    pub space_advance: u32,
    /// Blank columns after the message
    #[serde(default)]
    pub trailing_margin: u32,
    /// Pause between colour wipe steps in milliseconds
    #[serde(default = "default_wipe_delay")]
    pub wipe_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// Address the message listener binds to
    pub bind: String,
    /// Requests buffered behind the running animation
    pub queue_depth: usize,
    /// Longest message text accepted, in characters
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// WS281x strip on a spidev bus
    Spi,
    /// ANSI preview in the terminal
    Console,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    pub kind: DriverKind,
    /// spidev device node
    pub device: PathBuf,
    /// SPI clock; 3.2 MHz gives the 1.25 us WS2812 bit period
    pub speed_hz: u32,
}

fn default_wipe_delay() -> u64 {
    WIPE_DELAY_MS
}

fn default_max_message_len() -> usize {
    MAX_MESSAGE_LEN
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:7890".to_string(),
            queue_depth: 16,
            max_message_len: MAX_MESSAGE_LEN,
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            kind: DriverKind::Spi,
            device: PathBuf::from("/dev/spidev0.0"),
            speed_hz: 3_200_000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            panel: PanelConfig {
                width: PANEL_WIDTH,
                height: PANEL_HEIGHT,
                flip_y: true,
                brightness: 255,
            },
            font: FontConfig {
                sheet: PathBuf::from("charmap.png"),
                table: None,
            },
            scroll: ScrollConfig {
                delay_ms: FRAME_DELAY_MS,
                leading_margin: LEADING_MARGIN,
                space_advance: SPACE_ADVANCE,
                trailing_margin: 0,
                wipe_delay_ms: WIPE_DELAY_MS,
            },
            listener: ListenerConfig::default(),
            driver: DriverConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, or create default if not exists
    pub fn load(path: Option<PathBuf>) -> anyhow::Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => default_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?;
            log::info!("Loaded configuration from {}", config_path.display());
            Ok(config)
        } else {
            // Create default config
            let config = Config::default();
            config.save(Some(config_path.clone()))?;
            log::info!("Wrote default configuration to {}", config_path.display());
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: Option<PathBuf>) -> anyhow::Result<()> {
        let config_path = match path {
            Some(p) => p,
            None => default_path()?,
        };

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    pub fn geometry(&self) -> PanelGeometry {
        PanelGeometry::new(
            self.panel.width as usize,
            self.panel.height as usize,
            self.panel.flip_y,
        )
    }

    pub fn layout(&self) -> Layout {
        Layout {
            leading_margin: self.scroll.leading_margin,
            space_advance: self.scroll.space_advance,
            trailing_margin: self.scroll.trailing_margin,
        }
    }

    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.scroll.delay_ms)
    }

    pub fn wipe_delay(&self) -> Duration {
        Duration::from_millis(self.scroll.wipe_delay_ms)
    }

    /// The configured glyph table, or the built-in one
    pub fn glyph_table(&self) -> crate::Result<GlyphTable> {
        match &self.font.table {
            Some(path) => GlyphTable::load(path),
            None => Ok(GlyphTable::builtin()),
        }
    }
}

fn default_path() -> anyhow::Result<PathBuf> {
    let mut p = dirs::config_dir().context("No config directory")?;
    p.push("cylinder");
    p.push("config.toml");
    Ok(p)
}

mod dirs {
    use std::path::PathBuf;

    pub fn config_dir() -> Option<PathBuf> {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut path = PathBuf::from(home);
                    path.push(".config");
                    path
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_reference_panel() {
        let config = Config::default();
        let geometry = config.geometry();
        assert_eq!((geometry.width, geometry.height, geometry.flip_y), (20, 5, true));
        assert_eq!(config.layout(), Layout::default());
        assert_eq!(config.frame_delay(), Duration::from_millis(60));
    }

    #[test]
    fn test_load_writes_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load(Some(path.clone())).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let reloaded = Config::load(Some(path)).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_load_every_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r##"
[panel]
width = 30
height = 7
flip_y = false
brightness = 64

[font]
sheet = "/opt/fonts/tall.png"
table = "/opt/fonts/tall.toml"

[scroll]
delay_ms = 25
leading_margin = 0
space_advance = 2

[listener]
bind = "127.0.0.1:9000"
queue_depth = 4

[driver]
kind = "console"
device = "/dev/null"
speed_hz = 1
"##,
        )
        .unwrap();

        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.panel.brightness, 64);
        assert_eq!(config.driver.kind, DriverKind::Console);
        assert_eq!(config.scroll.trailing_margin, 0);
        assert_eq!(config.scroll.wipe_delay_ms, WIPE_DELAY_MS);
        assert_eq!(config.font.table, Some(PathBuf::from("/opt/fonts/tall.toml")));
        assert_eq!(config.geometry().len(), 210);
        assert_eq!(config.listener.max_message_len, MAX_MESSAGE_LEN);
    }

    #[test]
    fn test_load_without_listener_and_driver_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r##"
[panel]
width = 20
height = 5
flip_y = true
brightness = 128

[font]
sheet = "charmap.png"

[scroll]
delay_ms = 60
leading_margin = 40
space_advance = 3
"##,
        )
        .unwrap();

        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.panel.brightness, 128);
        assert_eq!(config.listener, ListenerConfig::default());
        assert_eq!(config.driver, DriverConfig::default());
    }

    #[test]
    fn test_listener_limit_is_configurable() {
        let config: Config = toml::from_str(
            r##"
[panel]
width = 20
height = 5
flip_y = true
brightness = 255

[font]
sheet = "charmap.png"

[scroll]
delay_ms = 60
leading_margin = 40
space_advance = 3

[listener]
bind = "127.0.0.1:7890"
queue_depth = 2
max_message_len = 32
"##,
        )
        .unwrap();
        assert_eq!(config.listener.max_message_len, 32);
        assert_eq!(config.listener.queue_depth, 2);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[panel]\nwidth = \"wide\"").unwrap();

        assert!(Config::load(Some(path)).is_err());
    }

    #[test]
    fn test_glyph_table_defaults_to_builtin() {
        let table = Config::default().glyph_table().unwrap();
        assert_eq!(table, GlyphTable::builtin());
    }
}
