//! 記録モーションの JSON スキーマ
//!
//! 同じ `RecordedSequence` に対する2種類の保存形式:
//!
//! - `Keypoints3D`: `[[{"keypoints3D": [{"name": "nose", "x": .., "y": .., "z": ..}, ..]}], ..]`
//!   フレームごとに検出結果の配列を持ち、先頭の検出のみ使う。
//! - `Flat`: `[{"nose": {"x": .., "y": .., "z": ..}, ..}, ..]`
//!
//! 保持するのはキーポイント名と座標のみ。`score` などキーポイント・検出単位の
//! 追加フィールドは読み込み時に捨てるため、書き出しには残らない
//! (追加フィールドを残したまま縮小するには `trim::trim_keypoints3d` を使う)。
//! 座標は f32 で保持するので、f64 の入力は書き出し時に f32 精度へ丸まる。

use log::warn;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::pose::{Frame, KeypointName};

use super::sequence::RecordedSequence;
use super::MotionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    Keypoints3D,
    Flat,
}

impl Schema {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keypoints3D => "keypoints3d",
            Self::Flat => "flat",
        }
    }
}

/// 設定で指定するスキーマ。`Auto` は先頭フレームの形で判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaChoice {
    #[default]
    Auto,
    Keypoints3D,
    Flat,
}

/// 読み込み時にスキップした要素の数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// 座標欠け・未知の名前などで捨てたキーポイント
    pub skipped_keypoints: usize,
    /// 検出結果を持たないフレーム
    pub empty_frames: usize,
}

#[derive(Debug, Clone)]
pub struct Decoded {
    pub schema: Schema,
    pub sequence: RecordedSequence,
    pub stats: DecodeStats,
}

/// JSON テキストを読み込む
///
/// 個々のキーポイントの不備はスキップして数える。
/// JSON として読めない、またはトップレベルが配列でない場合はエラー。
pub fn decode(text: &str, choice: SchemaChoice) -> Result<Decoded, MotionError> {
    let root: Value = serde_json::from_str(text)?;
    let Value::Array(items) = root else {
        return Err(MotionError::Malformed("top level is not an array".to_string()));
    };

    let schema = match choice {
        SchemaChoice::Keypoints3D => Schema::Keypoints3D,
        SchemaChoice::Flat => Schema::Flat,
        SchemaChoice::Auto => detect(&items),
    };

    let mut stats = DecodeStats::default();
    let frames = items
        .iter()
        .map(|item| match schema {
            Schema::Keypoints3D => decode_keypoints3d_frame(item, &mut stats),
            Schema::Flat => decode_flat_frame(item, &mut stats),
        })
        .collect();

    if stats.skipped_keypoints > 0 {
        warn!(
            "{} malformed keypoint(s) skipped while decoding {} data",
            stats.skipped_keypoints,
            schema.as_str()
        );
    }

    Ok(Decoded {
        schema,
        sequence: RecordedSequence::new(frames),
        stats,
    })
}

/// 先頭要素が配列なら Keypoints3D、それ以外は Flat
fn detect(items: &[Value]) -> Schema {
    match items.first() {
        Some(Value::Array(_)) => Schema::Keypoints3D,
        _ => Schema::Flat,
    }
}

fn decode_keypoints3d_frame(item: &Value, stats: &mut DecodeStats) -> Frame {
    let mut frame = Frame::new();
    let keypoints = item
        .as_array()
        .and_then(|poses| poses.first())
        .and_then(|pose| pose.get("keypoints3D"))
        .and_then(Value::as_array);

    let Some(keypoints) = keypoints else {
        stats.empty_frames += 1;
        return frame;
    };

    for kp in keypoints {
        let name = kp.get("name").and_then(Value::as_str).and_then(KeypointName::from_name);
        match (name, read_point(kp)) {
            (Some(name), Some(point)) => frame.insert(name, point),
            _ => stats.skipped_keypoints += 1,
        }
    }
    frame
}

fn decode_flat_frame(item: &Value, stats: &mut DecodeStats) -> Frame {
    let mut frame = Frame::new();
    let Some(points) = item.as_object() else {
        stats.empty_frames += 1;
        return frame;
    };
    if points.is_empty() {
        stats.empty_frames += 1;
    }

    for (key, value) in points {
        match (KeypointName::from_name(key), read_point(value)) {
            (Some(name), Some(point)) => frame.insert(name, point),
            _ => stats.skipped_keypoints += 1,
        }
    }
    frame
}

fn read_point(value: &Value) -> Option<Vector3<f32>> {
    let axis = |key: &str| value.get(key).and_then(Value::as_f64).map(|v| v as f32);
    Some(Vector3::new(axis("x")?, axis("y")?, axis("z")?))
}

#[derive(Serialize)]
struct PointRecord {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Serialize)]
struct KeypointRecord {
    name: &'static str,
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Serialize)]
struct PoseRecord {
    #[serde(rename = "keypoints3D")]
    keypoints_3d: Vec<KeypointRecord>,
}

/// コンパクトな JSON に書き出す
pub fn encode(sequence: &RecordedSequence, schema: Schema) -> Result<String, MotionError> {
    let text = match schema {
        Schema::Keypoints3D => {
            let frames: Vec<[PoseRecord; 1]> = sequence
                .iter()
                .map(|frame| {
                    [PoseRecord {
                        keypoints_3d: frame
                            .iter()
                            .map(|kp| KeypointRecord {
                                name: kp.name.as_str(),
                                x: kp.x,
                                y: kp.y,
                                z: kp.z,
                            })
                            .collect(),
                    }]
                })
                .collect();
            serde_json::to_string(&frames)?
        }
        Schema::Flat => {
            let frames: Vec<BTreeMap<&'static str, PointRecord>> = sequence
                .iter()
                .map(|frame| {
                    frame
                        .iter()
                        .map(|kp| (kp.name.as_str(), PointRecord { x: kp.x, y: kp.y, z: kp.z }))
                        .collect()
                })
                .collect();
            serde_json::to_string(&frames)?
        }
    };
    Ok(text)
}
