use std::num::NonZeroUsize;

use crate::pose::{Frame, KeypointName};

use super::sequence::RecordedSequence;

/// 連続する2フレーム間を `factor` 個のフレームに線形分割
///
/// i 番目 (0 <= i < factor) は `prev + (curr - prev) * (i / factor)`。
/// i = 0 は `prev` そのもの。片方にしかないキーポイントは出力しない。
pub fn interpolate_pair(prev: &Frame, curr: &Frame, factor: NonZeroUsize) -> Vec<Frame> {
    let factor = factor.get();
    let mut frames = vec![Frame::new(); factor];

    for name in KeypointName::ALL {
        let (Some(from), Some(to)) = (prev.get(name), curr.get(name)) else {
            continue;
        };
        let diff = to - from;
        for (i, frame) in frames.iter_mut().enumerate() {
            let t = i as f32 / factor as f32;
            frame.insert(name, from + diff * t);
        }
    }

    frames
}

/// 記録シーケンス全体を補間
///
/// 出力長は `(N - 1) * factor`。N < 2 なら空。
pub fn interpolate(sequence: &RecordedSequence, factor: NonZeroUsize) -> RecordedSequence {
    sequence
        .frames()
        .windows(2)
        .flat_map(|pair| interpolate_pair(&pair[0], &pair[1], factor))
        .collect()
}
