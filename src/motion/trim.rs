use serde_json::{Map, Value};

use super::sequence::RecordedSequence;
use super::MotionError;

/// キーポイントを1つも持たないフレームを除く
pub fn trim_sequence(sequence: &RecordedSequence) -> RecordedSequence {
    sequence.iter().filter(|f| !f.is_empty()).cloned().collect()
}

/// Keypoints3D 形式のテキストを縮小する
///
/// 先頭検出の `keypoints3D` だけを残し (キーポイント内のフィールドはそのまま)、
/// 検出のないフレームは除く。出力は空白なしの JSON。
pub fn trim_keypoints3d(text: &str) -> Result<(String, usize), MotionError> {
    let root: Value = serde_json::from_str(text)?;
    let Value::Array(items) = root else {
        return Err(MotionError::Malformed("top level is not an array".to_string()));
    };

    let kept: Vec<Value> = items
        .iter()
        .filter_map(|item| {
            let keypoints = item.as_array()?.first()?.get("keypoints3D")?.clone();
            let mut pose = Map::new();
            pose.insert("keypoints3D".to_string(), keypoints);
            Some(Value::Array(vec![Value::Object(pose)]))
        })
        .collect();

    let dropped = items.len() - kept.len();
    Ok((serde_json::to_string(&kept)?, dropped))
}
