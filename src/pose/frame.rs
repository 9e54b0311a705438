use nalgebra::Vector3;

use super::keypoint::{Keypoint, KeypointName};

/// 1フレーム分のキーポイント集合
///
/// 検出漏れがあるため全キーポイントが揃う保証はない。欠けた名前は `None`。
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    points: [Option<Vector3<f32>>; KeypointName::COUNT],
}

impl Frame {
    pub fn new() -> Self {
        Self {
            points: [None; KeypointName::COUNT],
        }
    }

    pub fn insert(&mut self, name: KeypointName, position: Vector3<f32>) {
        self.points[name as usize] = Some(position);
    }

    pub fn remove(&mut self, name: KeypointName) -> Option<Vector3<f32>> {
        self.points[name as usize].take()
    }

    pub fn get(&self, name: KeypointName) -> Option<Vector3<f32>> {
        self.points[name as usize]
    }

    pub fn contains(&self, name: KeypointName) -> bool {
        self.points[name as usize].is_some()
    }

    /// 存在するキーポイント数
    pub fn len(&self) -> usize {
        self.points.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.points.iter().all(|p| p.is_none())
    }

    /// 存在するキーポイントを語彙順に返す
    pub fn iter(&self) -> impl Iterator<Item = Keypoint> + '_ {
        KeypointName::ALL
            .iter()
            .zip(self.points.iter())
            .filter_map(|(&name, p)| p.map(|p| Keypoint::from_position(name, p)))
    }

    /// 全キーポイントに同じ変換を適用した新しいフレーム
    pub fn map_points<F>(&self, mut f: F) -> Frame
    where
        F: FnMut(Vector3<f32>) -> Vector3<f32>,
    {
        let mut out = Frame::new();
        for (dst, src) in out.points.iter_mut().zip(self.points.iter()) {
            *dst = src.map(&mut f);
        }
        out
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Keypoint> for Frame {
    fn from_iter<I: IntoIterator<Item = Keypoint>>(iter: I) -> Self {
        let mut frame = Frame::new();
        for kp in iter {
            frame.insert(kp.name, kp.position());
        }
        frame
    }
}
