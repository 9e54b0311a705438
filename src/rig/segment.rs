use nalgebra::{UnitQuaternion, Vector3};

use crate::pose::KeypointName;

use super::smooth::Smoothing;

/// リグのセグメント (ボーン) 識別子
///
/// `ALL` の順序が毎ティックの更新順。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentId {
    // 四肢
    LeftShin,
    RightShin,
    LeftThigh,
    RightThigh,
    LeftArm,
    RightArm,
    LeftForearm,
    RightForearm,
    LeftFoot,
    RightFoot,
    // 関節
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftHeel,
    RightHeel,
    // 胴体・頭
    UpperTorso,
    MiddleTorso,
    LowerTorso,
    Head,
    // 手
    LeftHand,
    RightHand,
}

impl SegmentId {
    pub const COUNT: usize = 26;

    pub const ALL: [SegmentId; Self::COUNT] = [
        Self::LeftShin,
        Self::RightShin,
        Self::LeftThigh,
        Self::RightThigh,
        Self::LeftArm,
        Self::RightArm,
        Self::LeftForearm,
        Self::RightForearm,
        Self::LeftFoot,
        Self::RightFoot,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftHeel,
        Self::RightHeel,
        Self::UpperTorso,
        Self::MiddleTorso,
        Self::LowerTorso,
        Self::Head,
        Self::LeftHand,
        Self::RightHand,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeftShin => "left_shin",
            Self::RightShin => "right_shin",
            Self::LeftThigh => "left_thigh",
            Self::RightThigh => "right_thigh",
            Self::LeftArm => "left_arm",
            Self::RightArm => "right_arm",
            Self::LeftForearm => "left_forearm",
            Self::RightForearm => "right_forearm",
            Self::LeftFoot => "left_foot",
            Self::RightFoot => "right_foot",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::UpperTorso => "upper_torso",
            Self::MiddleTorso => "middle_torso",
            Self::LowerTorso => "lower_torso",
            Self::Head => "head",
            Self::LeftHand => "left_hand",
            Self::RightHand => "right_hand",
        }
    }

    /// デフォルトリグでの配置ルール
    pub fn default_placement(&self) -> Placement {
        use KeypointName as K;
        let kp = Anchor::Keypoint;
        match self {
            Self::LeftShin => Placement::Limb(kp(K::LeftKnee), kp(K::LeftAnkle)),
            Self::RightShin => Placement::Limb(kp(K::RightKnee), kp(K::RightAnkle)),
            Self::LeftThigh => Placement::Limb(kp(K::LeftHip), kp(K::LeftKnee)),
            Self::RightThigh => Placement::Limb(kp(K::RightHip), kp(K::RightKnee)),
            Self::LeftArm => Placement::Limb(kp(K::LeftShoulder), kp(K::LeftElbow)),
            Self::RightArm => Placement::Limb(kp(K::RightShoulder), kp(K::RightElbow)),
            Self::LeftForearm => Placement::Limb(kp(K::LeftElbow), kp(K::LeftWrist)),
            Self::RightForearm => Placement::Limb(kp(K::RightElbow), kp(K::RightWrist)),
            Self::LeftFoot => Placement::Limb(kp(K::LeftHeel), kp(K::LeftFootIndex)),
            Self::RightFoot => Placement::Limb(kp(K::RightHeel), kp(K::RightFootIndex)),
            Self::LeftShoulder => Placement::Joint(kp(K::LeftShoulder)),
            Self::RightShoulder => Placement::Joint(kp(K::RightShoulder)),
            Self::LeftElbow => Placement::Joint(kp(K::LeftElbow)),
            Self::RightElbow => Placement::Joint(kp(K::RightElbow)),
            Self::LeftHip => Placement::Joint(kp(K::LeftHip)),
            Self::RightHip => Placement::Joint(kp(K::RightHip)),
            Self::LeftKnee => Placement::Joint(kp(K::LeftKnee)),
            Self::RightKnee => Placement::Joint(kp(K::RightKnee)),
            Self::LeftHeel => Placement::Joint(kp(K::LeftHeel)),
            Self::RightHeel => Placement::Joint(kp(K::RightHeel)),
            Self::UpperTorso => Placement::Span {
                position: (kp(K::LeftShoulder), kp(K::RightShoulder)),
                orientation: Some((kp(K::LeftShoulder), kp(K::RightShoulder))),
            },
            Self::MiddleTorso => Placement::Span {
                position: (Anchor::ShoulderCenter, Anchor::SpineCenter),
                orientation: None,
            },
            Self::LowerTorso => Placement::Span {
                position: (Anchor::HipCenter, Anchor::SpineCenter),
                orientation: Some((kp(K::LeftHip), kp(K::RightHip))),
            },
            Self::Head => Placement::Head,
            Self::LeftHand => Placement::Hand(Side::Left),
            Self::RightHand => Placement::Hand(Side::Right),
        }
    }
}

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Limb,
    Joint,
    Midpoint,
    Head,
    Hand,
}

/// 配置ルールの入力点
///
/// センサーキーポイントそのもの、またはキーポイントから毎ティック導出する仮想点。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Keypoint(KeypointName),
    /// 両肩の中点
    ShoulderCenter,
    /// 両腰の中点
    HipCenter,
    /// 肩中点と腰中点の中点
    SpineCenter,
    /// 両耳の中点
    EarCenter,
}

/// セグメントの配置ルール
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// 位置のみ
    Joint(Anchor),
    /// 中点 + `a - b` 方向
    Limb(Anchor, Anchor),
    /// 位置と向きを別の点の組から求める胴体用
    Span {
        position: (Anchor, Anchor),
        orientation: Option<(Anchor, Anchor)>,
    },
    /// 鼻と両耳
    Head,
    /// 手首・肘・人差し指・小指
    Hand(Side),
}

impl Placement {
    pub fn kind(&self) -> SegmentKind {
        match self {
            Self::Joint(_) => SegmentKind::Joint,
            Self::Limb(..) => SegmentKind::Limb,
            Self::Span { .. } => SegmentKind::Midpoint,
            Self::Head => SegmentKind::Head,
            Self::Hand(_) => SegmentKind::Hand,
        }
    }

    /// 向きを持つルールか
    pub fn has_orientation(&self) -> bool {
        match self {
            Self::Joint(_) => false,
            Self::Span { orientation, .. } => orientation.is_some(),
            Self::Limb(..) | Self::Head | Self::Hand(_) => true,
        }
    }

    /// ルールが直接参照するアンカー
    pub fn anchors(&self) -> Vec<Anchor> {
        use KeypointName as K;
        match *self {
            Self::Joint(a) => vec![a],
            Self::Limb(a, b) => vec![a, b],
            Self::Span { position, orientation } => {
                let mut out = vec![position.0, position.1];
                if let Some((a, b)) = orientation {
                    out.extend([a, b]);
                }
                out
            }
            Self::Head => vec![Anchor::Keypoint(K::Nose), Anchor::EarCenter],
            Self::Hand(side) => {
                let names = match side {
                    Side::Left => [K::LeftWrist, K::LeftElbow, K::LeftIndex, K::LeftPinky],
                    Side::Right => [K::RightWrist, K::RightElbow, K::RightIndex, K::RightPinky],
                };
                names.into_iter().map(Anchor::Keypoint).collect()
            }
        }
    }
}

/// セグメントの位置と回転
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentTransform {
    pub position: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl SegmentTransform {
    pub fn new(position: Vector3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self { position, rotation }
    }

    /// 原点、回転なし
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }
}

impl Default for SegmentTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// リグの1セグメント。変換はティックをまたいで保持される
#[derive(Debug, Clone)]
pub struct RigSegment {
    pub id: SegmentId,
    pub placement: Placement,
    pub transform: SegmentTransform,
    /// 個別の平滑化係数 (None ならリグ全体の設定)
    pub smoothing: Option<Smoothing>,
    pub(crate) position_observed: bool,
    pub(crate) rotation_observed: bool,
}

impl RigSegment {
    pub fn new(id: SegmentId, placement: Placement) -> Self {
        Self {
            id,
            placement,
            transform: SegmentTransform::identity(),
            smoothing: None,
            position_observed: false,
            rotation_observed: false,
        }
    }

    pub fn kind(&self) -> SegmentKind {
        self.placement.kind()
    }

    /// 一度でもターゲットを受け取ったか
    pub fn is_observed(&self) -> bool {
        self.position_observed
    }

    pub fn reset(&mut self) {
        self.transform = SegmentTransform::identity();
        self.position_observed = false;
        self.rotation_observed = false;
    }
}

/// デフォルトのヒューマノイドリグ
pub fn default_segments() -> Vec<RigSegment> {
    SegmentId::ALL
        .iter()
        .map(|&id| RigSegment::new(id, id.default_placement()))
        .collect()
}
