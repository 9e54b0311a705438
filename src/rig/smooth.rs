use nalgebra::{UnitQuaternion, Vector3};

use crate::config::SmoothConfig;

/// slerp が不定になる角度差の閾値
const SLERP_EPSILON: f32 = 1.0e-6;

/// 一次指数平滑の係数
///
/// 0 ならセグメントは動かず、1 ならターゲットへ即座に追従する。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoothing {
    pub position: f32,
    pub rotation: f32,
}

impl Smoothing {
    /// 係数は [0, 1] にクランプ。NaN は 0 (動かない) として扱う
    pub fn new(position: f32, rotation: f32) -> Self {
        Self {
            position: clamp_coefficient(position),
            rotation: clamp_coefficient(rotation),
        }
    }

    pub fn from_config(config: &SmoothConfig) -> Self {
        Self::new(config.position, config.rotation)
    }

    /// 平滑化なし
    pub fn none() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl Default for Smoothing {
    fn default() -> Self {
        Self::from_config(&SmoothConfig::default())
    }
}

fn clamp_coefficient(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// 位置: 成分ごとのEMA
pub fn smooth_position(current: Vector3<f32>, target: Vector3<f32>, coefficient: f32) -> Vector3<f32> {
    if coefficient <= 0.0 {
        return current;
    }
    if coefficient >= 1.0 {
        return target;
    }
    current + (target - current) * coefficient
}

/// 回転: SLERP
///
/// ほぼ同一の回転では slerp が不定になるため NLERP に落とす。
pub fn smooth_rotation(
    current: UnitQuaternion<f32>,
    target: UnitQuaternion<f32>,
    coefficient: f32,
) -> UnitQuaternion<f32> {
    if coefficient <= 0.0 {
        return current;
    }
    if coefficient >= 1.0 {
        return target;
    }
    current
        .try_slerp(&target, coefficient, SLERP_EPSILON)
        .unwrap_or_else(|| current.nlerp(&target, coefficient))
}
