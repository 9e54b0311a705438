use nalgebra::{UnitQuaternion, Vector3};
use std::f32::consts::{FRAC_PI_2, PI};

use crate::pose::{Frame, KeypointName};

use super::segment::{Anchor, Side};

/// これ未満の長さの方向ベクトルは不定として扱う
pub const DEGENERATE_EPSILON: f32 = 1.0e-6;

pub fn midpoint(a: Vector3<f32>, b: Vector3<f32>) -> Vector3<f32> {
    (a + b) / 2.0
}

/// 関節 (肩・肘など) はキーポイント位置そのもの
pub fn place_joint(target: Vector3<f32>) -> Vector3<f32> {
    target
}

/// セグメントの長軸 (+Y) を `direction` に向ける回転
///
/// `direction` は正規化済みであること。真下向きは X 軸まわりの半回転。
pub fn direction_rotation(direction: &Vector3<f32>) -> UnitQuaternion<f32> {
    UnitQuaternion::rotation_between(&Vector3::y(), direction)
        .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI))
}

/// `a - b` 方向の回転。`a == b` なら None
pub fn rotation_from_points(a: Vector3<f32>, b: Vector3<f32>) -> Option<UnitQuaternion<f32>> {
    let diff = a - b;
    let len = diff.norm();
    if !(len >= DEGENERATE_EPSILON) {
        return None;
    }
    Some(direction_rotation(&(diff / len)))
}

/// 2点間にまたがる四肢 (前腕など)
///
/// 位置は中点、回転は `a - b` 方向。2点が一致する場合の回転は None。
pub fn place_limb(a: Vector3<f32>, b: Vector3<f32>) -> (Vector3<f32>, Option<UnitQuaternion<f32>>) {
    (midpoint(a, b), rotation_from_points(a, b))
}

/// 頭部
///
/// 位置は鼻と両耳中点の中点。向きは水平面上の 鼻 - 耳中点 の角度から求め、
/// モデル固有の前方軸補正 `correction` を後ろから掛ける。
pub fn place_head(
    nose: Vector3<f32>,
    left_ear: Vector3<f32>,
    right_ear: Vector3<f32>,
    correction: &UnitQuaternion<f32>,
) -> (Vector3<f32>, UnitQuaternion<f32>) {
    let ears = midpoint(left_ear, right_ear);
    let position = midpoint(nose, ears);
    let angle = f32::atan2(nose.z - ears.z, nose.x - ears.x);
    let facing = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2 - angle);
    (position, facing * correction)
}

/// 手 (グローブ)
///
/// 位置は手首。回転は 手首 - 肘 方向に、拳の向き (人差し指 - 小指) と真下の
/// なす角だけローカルY軸でひねりを加える。右手はひねりが逆向き。
pub fn place_hand(
    side: Side,
    wrist: Vector3<f32>,
    elbow: Vector3<f32>,
    index: Vector3<f32>,
    pinky: Vector3<f32>,
) -> (Vector3<f32>, Option<UnitQuaternion<f32>>) {
    let knuckles = match side {
        Side::Left => index - pinky,
        Side::Right => pinky - index,
    };
    let twist = if knuckles.norm() < DEGENERATE_EPSILON {
        0.0
    } else {
        knuckles.angle(&-Vector3::y())
    };
    let twist = match side {
        Side::Left => twist,
        Side::Right => -twist,
    };
    let rotation = rotation_from_points(wrist, elbow)
        .map(|forearm| forearm * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), twist));
    (place_joint(wrist), rotation)
}

/// 1フレーム分のアンカー解決
///
/// 仮想キーポイント (肩中点・腰中点・背骨中点・耳中点) はここで一度だけ計算する。
/// 背骨中点は肩中点と腰中点の両方が揃ったときのみ存在する。
pub struct Anchors<'a> {
    frame: &'a Frame,
    shoulder_center: Option<Vector3<f32>>,
    hip_center: Option<Vector3<f32>>,
    ear_center: Option<Vector3<f32>>,
}

impl<'a> Anchors<'a> {
    pub fn new(frame: &'a Frame) -> Self {
        let pair = |a: KeypointName, b: KeypointName| Some(midpoint(frame.get(a)?, frame.get(b)?));
        Self {
            frame,
            shoulder_center: pair(KeypointName::LeftShoulder, KeypointName::RightShoulder),
            hip_center: pair(KeypointName::LeftHip, KeypointName::RightHip),
            ear_center: pair(KeypointName::LeftEar, KeypointName::RightEar),
        }
    }

    /// アンカー位置。欠けている場合は原因のキーポイント名を返す
    pub fn resolve(&self, anchor: Anchor) -> Result<Vector3<f32>, KeypointName> {
        match anchor {
            Anchor::Keypoint(name) => self.keypoint(name),
            Anchor::ShoulderCenter => self.shoulder_center(),
            Anchor::HipCenter => self.hip_center(),
            Anchor::SpineCenter => Ok(midpoint(self.shoulder_center()?, self.hip_center()?)),
            Anchor::EarCenter => self.ear_center.ok_or_else(|| {
                self.first_missing(&[KeypointName::LeftEar, KeypointName::RightEar])
            }),
        }
    }

    pub fn keypoint(&self, name: KeypointName) -> Result<Vector3<f32>, KeypointName> {
        self.frame.get(name).ok_or(name)
    }

    fn shoulder_center(&self) -> Result<Vector3<f32>, KeypointName> {
        self.shoulder_center.ok_or_else(|| {
            self.first_missing(&[KeypointName::LeftShoulder, KeypointName::RightShoulder])
        })
    }

    fn hip_center(&self) -> Result<Vector3<f32>, KeypointName> {
        self.hip_center
            .ok_or_else(|| self.first_missing(&[KeypointName::LeftHip, KeypointName::RightHip]))
    }

    fn first_missing(&self, names: &[KeypointName]) -> KeypointName {
        names
            .iter()
            .copied()
            .find(|&n| !self.frame.contains(n))
            .unwrap_or(names[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq_vec(a: &Vector3<f32>, b: &Vector3<f32>, eps: f32) -> bool {
        (a - b).norm() < eps
    }

    fn approx_eq_rot(a: &UnitQuaternion<f32>, b: &UnitQuaternion<f32>, eps: f32) -> bool {
        (a.coords - b.coords).norm() < eps || (a.coords + b.coords).norm() < eps
    }

    #[test]
    fn test_place_joint_identity() {
        let p = Vector3::new(0.3, -1.2, 4.0);
        assert_eq!(place_joint(p), p);
    }

    #[test]
    fn test_limb_midpoint_law() {
        let pairs = [
            (Vector3::new(1.0, 2.0, 3.0), Vector3::new(-3.0, 0.5, 7.0)),
            (Vector3::new(0.25, 0.0, -0.5), Vector3::new(0.75, 1.0, 0.5)),
            (Vector3::new(-2.0, -2.0, -2.0), Vector3::new(2.0, 2.0, 2.0)),
        ];
        for (a, b) in pairs {
            let (pos_ab, _) = place_limb(a, b);
            let (pos_ba, _) = place_limb(b, a);
            assert_eq!(pos_ab, (a + b) / 2.0);
            assert_eq!(pos_ab, pos_ba);
        }
    }

    #[test]
    fn test_limb_rotation_aligns_long_axis() {
        let a = Vector3::new(1.0, 1.0, 0.0);
        let b = Vector3::new(0.0, 0.0, 0.0);
        let (_, rot) = place_limb(a, b);
        let rot = rot.unwrap();
        let axis = rot * Vector3::y();
        assert!(approx_eq_vec(&axis, &(a - b).normalize(), 1e-5));

        // 逆順なら長軸も逆向き
        let (_, rot_rev) = place_limb(b, a);
        let axis_rev = rot_rev.unwrap() * Vector3::y();
        assert!(approx_eq_vec(&axis_rev, &-(a - b).normalize(), 1e-5));
    }

    #[test]
    fn test_limb_degenerate_has_no_rotation() {
        let p = Vector3::new(0.5, 0.5, 0.5);
        let (pos, rot) = place_limb(p, p);
        assert_eq!(pos, p);
        assert!(rot.is_none());
    }

    #[test]
    fn test_direction_rotation_straight_up_and_down() {
        assert!(approx_eq_rot(&direction_rotation(&Vector3::y()), &UnitQuaternion::identity(), 1e-6));
        let down = direction_rotation(&-Vector3::y());
        assert!(approx_eq_vec(&(down * Vector3::y()), &-Vector3::y(), 1e-5));
    }

    #[test]
    fn test_head_facing_plus_z_is_correction() {
        let correction = UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3);
        let nose = Vector3::new(0.0, 1.0, 1.0);
        let left_ear = Vector3::new(-0.5, 1.0, 0.0);
        let right_ear = Vector3::new(0.5, 1.0, 0.0);
        let (pos, rot) = place_head(nose, left_ear, right_ear, &correction);
        assert!(approx_eq_vec(&pos, &Vector3::new(0.0, 1.0, 0.5), 1e-6));
        // atan2(1, 0) = π/2 → ヨー 0
        assert!(approx_eq_rot(&rot, &correction, 1e-5));
    }

    #[test]
    fn test_head_facing_plus_x() {
        let nose = Vector3::new(1.0, 0.0, 0.0);
        let ear = Vector3::zeros();
        let (_, rot) = place_head(nose, ear, ear, &UnitQuaternion::identity());
        let expected = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2);
        assert!(approx_eq_rot(&rot, &expected, 1e-5));
    }

    #[test]
    fn test_head_ignores_vertical_offset() {
        let ear = Vector3::zeros();
        let (_, level) = place_head(Vector3::new(1.0, 0.0, 1.0), ear, ear, &UnitQuaternion::identity());
        let (_, raised) = place_head(Vector3::new(1.0, 5.0, 1.0), ear, ear, &UnitQuaternion::identity());
        assert!(approx_eq_rot(&level, &raised, 1e-6));
    }

    #[test]
    fn test_hand_position_at_wrist() {
        let wrist = Vector3::new(1.0, 1.0, 0.0);
        let elbow = Vector3::new(1.0, 2.0, 0.0);
        let (pos, rot) = place_hand(
            Side::Left,
            wrist,
            elbow,
            Vector3::new(1.1, 0.9, 0.0),
            Vector3::new(0.9, 0.9, 0.0),
        );
        assert_eq!(pos, wrist);
        // 手首→肘の逆 (下向き) に長軸が向く
        let axis = rot.unwrap() * Vector3::y();
        assert!(approx_eq_vec(&axis, &-Vector3::y(), 1e-5));
    }

    #[test]
    fn test_hand_twist_mirrors_between_sides() {
        let wrist = Vector3::zeros();
        let elbow = Vector3::new(0.0, -1.0, 0.0);
        let index = Vector3::new(1.0, 0.0, 0.0);
        let pinky = Vector3::new(0.0, 0.0, 0.0);
        let (_, left) = place_hand(Side::Left, wrist, elbow, index, pinky);
        let (_, right) = place_hand(Side::Right, wrist, elbow, index, pinky);
        // 前腕は真上、拳ベクトルは真下と直交 → ±90度のひねり
        let left_expected = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2);
        let right_expected = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -FRAC_PI_2);
        assert!(approx_eq_rot(&left.unwrap(), &left_expected, 1e-5));
        assert!(approx_eq_rot(&right.unwrap(), &right_expected, 1e-5));
    }

    #[test]
    fn test_hand_degenerate_forearm() {
        let p = Vector3::new(0.2, 0.2, 0.2);
        let (_, rot) = place_hand(Side::Right, p, p, Vector3::x(), Vector3::zeros());
        assert!(rot.is_none());
    }

    #[test]
    fn test_anchor_virtual_points() {
        let mut frame = Frame::new();
        frame.insert(KeypointName::LeftShoulder, Vector3::new(-1.0, 4.0, 0.0));
        frame.insert(KeypointName::RightShoulder, Vector3::new(1.0, 4.0, 0.0));
        frame.insert(KeypointName::LeftHip, Vector3::new(-1.0, 2.0, 0.0));
        frame.insert(KeypointName::RightHip, Vector3::new(1.0, 2.0, 0.0));
        let anchors = Anchors::new(&frame);

        assert_eq!(anchors.resolve(Anchor::ShoulderCenter), Ok(Vector3::new(0.0, 4.0, 0.0)));
        assert_eq!(anchors.resolve(Anchor::HipCenter), Ok(Vector3::new(0.0, 2.0, 0.0)));
        assert_eq!(anchors.resolve(Anchor::SpineCenter), Ok(Vector3::new(0.0, 3.0, 0.0)));
        assert_eq!(anchors.resolve(Anchor::EarCenter), Err(KeypointName::LeftEar));
    }

    #[test]
    fn test_anchor_reports_missing_name() {
        let mut frame = Frame::new();
        frame.insert(KeypointName::LeftShoulder, Vector3::zeros());
        frame.insert(KeypointName::RightShoulder, Vector3::zeros());
        frame.insert(KeypointName::LeftHip, Vector3::zeros());
        let anchors = Anchors::new(&frame);

        assert_eq!(anchors.resolve(Anchor::SpineCenter), Err(KeypointName::RightHip));
        assert_eq!(
            anchors.resolve(Anchor::Keypoint(KeypointName::Nose)),
            Err(KeypointName::Nose)
        );
    }
}
