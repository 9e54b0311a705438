use crate::pose::Frame;

use super::sequence::RecordedSequence;

/// 記録シーケンスの再生カーソル
///
/// ループ有効時は末尾の次に先頭へ戻る。
pub struct Playback {
    sequence: RecordedSequence,
    cursor: usize,
    looping: bool,
}

impl Playback {
    pub fn new(sequence: RecordedSequence, looping: bool) -> Self {
        Self {
            sequence,
            cursor: 0,
            looping,
        }
    }

    /// 次のフレーム。ループなしで末尾を過ぎたら None
    pub fn next_frame(&mut self) -> Option<&Frame> {
        if self.cursor >= self.sequence.len() {
            if !self.looping || self.sequence.is_empty() {
                return None;
            }
            self.cursor = 0;
        }
        let index = self.cursor;
        self.cursor += 1;
        self.sequence.get(index)
    }

    /// 次に返すフレームのインデックス
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::KeypointName;
    use nalgebra::Vector3;

    fn make_sequence(n: usize) -> RecordedSequence {
        (0..n)
            .map(|i| {
                let mut f = Frame::new();
                f.insert(KeypointName::Nose, Vector3::new(i as f32, 0.0, 0.0));
                f
            })
            .collect()
    }

    fn nose_x(frame: Option<&Frame>) -> Option<f32> {
        frame.and_then(|f| f.get(KeypointName::Nose)).map(|p| p.x)
    }

    #[test]
    fn test_plays_once_without_loop() {
        let mut playback = Playback::new(make_sequence(2), false);
        assert_eq!(nose_x(playback.next_frame()), Some(0.0));
        assert_eq!(nose_x(playback.next_frame()), Some(1.0));
        assert_eq!(nose_x(playback.next_frame()), None);
        assert_eq!(nose_x(playback.next_frame()), None);
    }

    #[test]
    fn test_wraps_with_loop() {
        let mut playback = Playback::new(make_sequence(2), true);
        let xs: Vec<Option<f32>> = (0..5).map(|_| nose_x(playback.next_frame())).collect();
        assert_eq!(xs, vec![Some(0.0), Some(1.0), Some(0.0), Some(1.0), Some(0.0)]);
        assert_eq!(playback.position(), 1);
    }

    #[test]
    fn test_empty_sequence_with_loop() {
        let mut playback = Playback::new(RecordedSequence::default(), true);
        assert!(playback.next_frame().is_none());
    }

    #[test]
    fn test_reset() {
        let mut playback = Playback::new(make_sequence(3), false);
        playback.next_frame();
        playback.next_frame();
        playback.reset();
        assert_eq!(nose_x(playback.next_frame()), Some(0.0));
    }
}
