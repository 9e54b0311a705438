use anyhow::{bail, Context, Result};
use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::motion::SchemaChoice;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub rig: RigConfig,
    #[serde(default)]
    pub smooth: SmoothConfig,
    #[serde(default)]
    pub interpolation: InterpolationConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub osc: OscConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RigConfig {
    /// 推定器の単位出力 → リグ単位の倍率
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// 初回観測時は平滑化せずにターゲットへ合わせる
    #[serde(default = "default_snap_first_sample")]
    pub snap_first_sample: bool,
    /// 頭部モデルの前方軸補正（順にローカル回転）
    #[serde(default = "default_head_correction")]
    pub head_correction: Vec<AxisRotation>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

/// 単軸回転（度）
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AxisRotation {
    pub axis: Axis,
    pub degrees: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmoothConfig {
    /// 位置の追従係数 (0: 動かない, 1: 平滑化なし)
    #[serde(default = "default_smooth_position")]
    pub position: f32,
    /// 回転の追従係数
    #[serde(default = "default_smooth_rotation")]
    pub rotation: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InterpolationConfig {
    /// 1区間あたりの生成フレーム数
    #[serde(default = "default_factor")]
    pub factor: usize,
    #[serde(default)]
    pub schema: SchemaChoice,
    #[serde(default = "default_suffix")]
    pub suffix: String,
    /// 入力ファイルまたはディレクトリ
    #[serde(default = "default_interpolation_input")]
    pub input: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlaybackConfig {
    #[serde(default = "default_playback_file")]
    pub file: String,
    #[serde(default)]
    pub schema: SchemaChoice,
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
    #[serde(default = "default_looping")]
    pub looping: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OscConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_osc_addr")]
    pub addr: String,
}

fn default_scale() -> f32 { 5.0 }
fn default_snap_first_sample() -> bool { false }
fn default_head_correction() -> Vec<AxisRotation> {
    vec![
        AxisRotation { axis: Axis::Y, degrees: -90.0 },
        AxisRotation { axis: Axis::Z, degrees: -90.0 },
    ]
}
fn default_smooth_position() -> f32 { 0.5 }
fn default_smooth_rotation() -> f32 { 0.5 }
fn default_factor() -> usize { 5 }
fn default_suffix() -> String { "_interpolated".to_string() }
fn default_interpolation_input() -> String { "static/motion_data_v2".to_string() }
fn default_playback_file() -> String { "static/motion_data_v2/combo_1.json".to_string() }
fn default_target_fps() -> u32 { 60 }
fn default_looping() -> bool { true }
fn default_osc_addr() -> String { "127.0.0.1:39570".to_string() }

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            snap_first_sample: default_snap_first_sample(),
            head_correction: default_head_correction(),
        }
    }
}

impl Default for SmoothConfig {
    fn default() -> Self {
        Self {
            position: default_smooth_position(),
            rotation: default_smooth_rotation(),
        }
    }
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            factor: default_factor(),
            schema: SchemaChoice::default(),
            suffix: default_suffix(),
            input: default_interpolation_input(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            file: default_playback_file(),
            schema: SchemaChoice::default(),
            target_fps: default_target_fps(),
            looping: default_looping(),
        }
    }
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: default_osc_addr(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 読めなければ警告してデフォルト値
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("config {} not loaded ({:#}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.rig.scale.is_finite() || self.rig.scale <= 0.0 {
            bail!("rig.scale must be a positive finite number, got {}", self.rig.scale);
        }
        for (name, value) in [
            ("smooth.position", self.smooth.position),
            ("smooth.rotation", self.smooth.rotation),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{} must be within [0, 1], got {}", name, value);
            }
        }
        if self.interpolation.factor < 1 {
            bail!("interpolation.factor must be at least 1");
        }
        if self.playback.target_fps == 0 {
            bail!("playback.target_fps must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.rig.scale, 5.0);
        assert!(!config.rig.snap_first_sample);
        assert_eq!(config.rig.head_correction.len(), 2);
        assert_eq!(config.smooth.position, 0.5);
        assert_eq!(config.smooth.rotation, 0.5);
        assert_eq!(config.interpolation.factor, 5);
        assert_eq!(config.interpolation.suffix, "_interpolated");
        assert!(!config.osc.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.rig.scale, 5.0);
        assert_eq!(config.interpolation.schema, SchemaChoice::Auto);
    }

    #[test]
    fn test_parse_sections() {
        let config = Config::parse(
            r#"
            [rig]
            scale = 2.5
            snap_first_sample = true

            [[rig.head_correction]]
            axis = "x"
            degrees = 90.0

            [smooth]
            position = 0.25
            rotation = 1.0

            [interpolation]
            factor = 10
            schema = "keypoints3d"

            [osc]
            enabled = true
            addr = "127.0.0.1:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.rig.scale, 2.5);
        assert!(config.rig.snap_first_sample);
        assert_eq!(
            config.rig.head_correction,
            vec![AxisRotation { axis: Axis::X, degrees: 90.0 }]
        );
        assert_eq!(config.smooth.position, 0.25);
        assert_eq!(config.smooth.rotation, 1.0);
        assert_eq!(config.interpolation.factor, 10);
        assert_eq!(config.interpolation.schema, SchemaChoice::Keypoints3D);
        assert!(config.osc.enabled);
        assert_eq!(config.osc.addr, "127.0.0.1:9000");
        // 未指定のセクションはデフォルト
        assert_eq!(config.playback.target_fps, 60);
    }

    #[test]
    fn test_rejects_out_of_range_smoothing() {
        assert!(Config::parse("[smooth]\nposition = 1.5").is_err());
        assert!(Config::parse("[smooth]\nrotation = -0.1").is_err());
    }

    #[test]
    fn test_rejects_zero_factor() {
        assert!(Config::parse("[interpolation]\nfactor = 0").is_err());
    }

    #[test]
    fn test_rejects_bad_scale_and_axis() {
        assert!(Config::parse("[rig]\nscale = 0.0").is_err());
        assert!(Config::parse("[[rig.head_correction]]\naxis = \"w\"\ndegrees = 1.0").is_err());
        assert!(Config::parse("[[rig.head_correction]]\naxis = \"X\"\ndegrees = 1.0").is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("does/not/exist.toml");
        assert_eq!(config.rig.scale, 5.0);
    }
}
