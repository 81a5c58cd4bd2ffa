use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::AssetError;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub render_space: RenderSpaceConfig,
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub assets: AssetConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Frame loop rate
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
    /// Log FPS and tracking confidence once per second
    #[serde(default)]
    pub show_fps: bool,
    /// tracing level filter (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_full_screen")]
    pub full_screen: bool,
    #[serde(default = "default_windowed_width")]
    pub windowed_width: usize,
    #[serde(default = "default_windowed_height")]
    pub windowed_height: usize,
    /// Assumed aspect ratio of the physical display
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: f32,
    /// The display is viewed through a mirror; the skeleton is flipped
    /// horizontally and the prompt is not
    #[serde(default)]
    pub mirrored: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    /// Dwell time of one idle image (seconds)
    #[serde(default = "default_idle_image_timeout")]
    pub idle_image_timeout_s: f32,
    /// Cross-fade length between idle images (seconds)
    #[serde(default = "default_fade_length")]
    pub fade_length_s: f32,
    /// Tracking is reset when no user was seen for this long (seconds)
    #[serde(default = "default_reset_timeout")]
    pub reset_timeout_s: f32,
}

/// Depth-space render surface. Joints are extrapolated outside the capture
/// bounds, so the surface is larger than the capture and points are shifted.
#[derive(Debug, Deserialize, Clone)]
pub struct RenderSpaceConfig {
    #[serde(default = "default_render_width")]
    pub width: u32,
    #[serde(default = "default_render_height")]
    pub height: u32,
    #[serde(default = "default_render_adjust")]
    pub x_adjust: i32,
    #[serde(default = "default_render_adjust")]
    pub y_adjust: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SensorConfig {
    #[serde(default = "default_sensor_enabled")]
    pub enabled: bool,
    /// UDP address the OSC skeleton bridge sends to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// "kinect" (512x424) or anything else (640x480)
    #[serde(default = "default_capture")]
    pub capture: String,
    #[serde(default = "default_tilt_command")]
    pub tilt_command: String,
    #[serde(default = "default_tilt_angle")]
    pub tilt_angle: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssetConfig {
    #[serde(default = "default_bone_dir")]
    pub bone_dir: String,
    #[serde(default = "default_idle_dir")]
    pub idle_dir: String,
    /// Shown over the display while a user is detected but not yet tracked
    #[serde(default)]
    pub prompt_image: Option<String>,
}

fn default_target_fps() -> u32 { 60 }
fn default_log_level() -> String { "info".to_string() }
fn default_full_screen() -> bool { true }
fn default_windowed_width() -> usize { 960 }
fn default_windowed_height() -> usize { 540 }
fn default_aspect_ratio() -> f32 { 16.0 / 9.0 }
fn default_idle_image_timeout() -> f32 { 5.0 }
fn default_fade_length() -> f32 { 1.0 }
fn default_reset_timeout() -> f32 { 3.0 }
fn default_render_width() -> u32 { 840 }
fn default_render_height() -> u32 { 840 }
fn default_render_adjust() -> i32 { 100 }
fn default_sensor_enabled() -> bool { true }
fn default_listen_addr() -> String { "127.0.0.1:9100".to_string() }
fn default_capture() -> String { "kinect".to_string() }
fn default_tilt_command() -> String { "./kinect-tilt".to_string() }
fn default_tilt_angle() -> i32 { 15 }
fn default_bone_dir() -> String { "skeleton-images".to_string() }
fn default_idle_dir() -> String { "images-other".to_string() }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target_fps: default_target_fps(),
            show_fps: false,
            log_level: default_log_level(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            full_screen: default_full_screen(),
            windowed_width: default_windowed_width(),
            windowed_height: default_windowed_height(),
            aspect_ratio: default_aspect_ratio(),
            mirrored: false,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            idle_image_timeout_s: default_idle_image_timeout(),
            fade_length_s: default_fade_length(),
            reset_timeout_s: default_reset_timeout(),
        }
    }
}

impl Default for RenderSpaceConfig {
    fn default() -> Self {
        Self {
            width: default_render_width(),
            height: default_render_height(),
            x_adjust: default_render_adjust(),
            y_adjust: default_render_adjust(),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            enabled: default_sensor_enabled(),
            listen_addr: default_listen_addr(),
            capture: default_capture(),
            tilt_command: default_tilt_command(),
            tilt_angle: default_tilt_angle(),
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            bone_dir: default_bone_dir(),
            idle_dir: default_idle_dir(),
            prompt_image: None,
        }
    }
}

impl SensorConfig {
    /// Depth capture resolution of the configured device
    pub fn capture_size(&self) -> (u32, u32) {
        if self.capture.eq_ignore_ascii_case("kinect") {
            (512, 424)
        } else {
            (640, 480)
        }
    }
}

impl TimingConfig {
    pub fn idle_image_timeout(&self) -> Result<Duration, AssetError> {
        seconds("idle_image_timeout_s", self.idle_image_timeout_s)
    }

    pub fn fade_length(&self) -> Result<Duration, AssetError> {
        seconds("fade_length_s", self.fade_length_s)
    }

    pub fn reset_timeout(&self) -> Result<Duration, AssetError> {
        seconds("reset_timeout_s", self.reset_timeout_s)
    }

    /// Every timing value must be a finite, non-negative duration
    pub fn validate(&self) -> Result<(), AssetError> {
        self.idle_image_timeout()?;
        self.fade_length()?;
        self.reset_timeout()?;
        Ok(())
    }
}

fn seconds(field: &'static str, value: f32) -> Result<Duration, AssetError> {
    Duration::try_from_secs_f32(value).map_err(|_| AssetError::InvalidTiming { field, value })
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.timing.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.app.target_fps, 60);
        assert_eq!(config.timing.idle_image_timeout_s, 5.0);
        assert_eq!(config.timing.fade_length_s, 1.0);
        assert_eq!(config.render_space.width, 840);
        assert_eq!(config.render_space.x_adjust, 100);
        assert_eq!(config.sensor.tilt_angle, 15);
        assert!(config.display.full_screen);
        assert!(!config.display.mirrored);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [display]
            mirrored = true

            [timing]
            fade_length_s = 0.5
            "#,
        )
        .unwrap();
        assert!(config.display.mirrored);
        assert_eq!(config.display.windowed_width, 960);
        assert_eq!(config.timing.fade_length_s, 0.5);
        assert_eq!(config.timing.idle_image_timeout_s, 5.0);
        assert_eq!(config.assets.bone_dir, "skeleton-images");
        assert!(config.assets.prompt_image.is_none());
    }

    #[test]
    fn test_capture_size() {
        let mut sensor = SensorConfig::default();
        assert_eq!(sensor.capture_size(), (512, 424));
        sensor.capture = "xtion".to_string();
        assert_eq!(sensor.capture_size(), (640, 480));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sensor]\nlisten_addr = \"0.0.0.0:7000\"\ntilt_angle = -5").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.sensor.listen_addr, "0.0.0.0:7000");
        assert_eq!(config.sensor.tilt_angle, -5);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(Config::load("/nonexistent/skeleton_mirror.toml").is_err());
    }

    #[test]
    fn test_timing_durations() {
        let timing = TimingConfig::default();
        assert_eq!(timing.idle_image_timeout().unwrap(), Duration::from_secs(5));
        assert_eq!(timing.fade_length().unwrap(), Duration::from_secs(1));
        assert_eq!(timing.reset_timeout().unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn test_unusable_timing_rejected() {
        let mut timing = TimingConfig::default();
        timing.idle_image_timeout_s = f32::INFINITY;
        assert!(matches!(
            timing.validate(),
            Err(AssetError::InvalidTiming { field: "idle_image_timeout_s", .. })
        ));

        let mut timing = TimingConfig::default();
        timing.fade_length_s = -1.0;
        assert!(timing.fade_length().is_err());

        let mut timing = TimingConfig::default();
        timing.reset_timeout_s = f32::NAN;
        assert!(timing.validate().is_err());

        let mut timing = TimingConfig::default();
        timing.reset_timeout_s = 1.0e30;
        assert!(timing.validate().is_err());
    }

    #[test]
    fn test_load_infinite_timeout_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timing]\nidle_image_timeout_s = inf").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("idle_image_timeout_s"));
    }

    #[test]
    fn test_load_malformed_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timing\nfade_length_s = ").unwrap();
        assert!(Config::load(file.path()).is_err());
    }
}
