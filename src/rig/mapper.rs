use log::debug;
use nalgebra::{UnitQuaternion, Vector3};

use crate::config::{Axis, AxisRotation, Config};
use crate::pose::{normalize_frame, Frame, KeypointName};

use super::place::{self, Anchors};
use super::segment::{default_segments, Placement, RigSegment, SegmentId, SegmentTransform, Side};
use super::smooth::{smooth_position, smooth_rotation, Smoothing};

/// リグ全体の実行時設定。更新ループを止めずに変更できる
#[derive(Debug, Clone, PartialEq)]
pub struct RigSettings {
    /// 座標正規化の倍率
    pub scale: f32,
    pub smoothing: Smoothing,
    /// 初回観測時はターゲットへ直接合わせる
    pub snap_first_sample: bool,
    /// 頭部モデルの前方軸補正
    pub head_correction: UnitQuaternion<f32>,
}

impl RigSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            scale: config.rig.scale,
            smoothing: Smoothing::from_config(&config.smooth),
            snap_first_sample: config.rig.snap_first_sample,
            head_correction: compose_axis_rotations(&config.rig.head_correction),
        }
    }
}

impl Default for RigSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// ローカル軸回転を順に掛け合わせる
pub fn compose_axis_rotations(rotations: &[AxisRotation]) -> UnitQuaternion<f32> {
    rotations.iter().fold(UnitQuaternion::identity(), |acc, rot| {
        let axis = match rot.axis {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        };
        acc * UnitQuaternion::from_axis_angle(&axis, rot.degrees.to_radians())
    })
}

/// セグメント単位の非致命的な問題
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentIssue {
    /// 必要なキーポイントがフレームにない。このティックは更新しない
    MissingKeypoint(KeypointName),
    /// 2点が一致して向きが不定。位置のみ更新し回転は維持
    DegenerateGeometry,
}

/// 1ティックの更新結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    /// 位置を更新したセグメント数
    pub updated: usize,
    pub issues: Vec<(SegmentId, SegmentIssue)>,
}

impl UpdateReport {
    pub fn skipped(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.issues.iter().filter_map(|(id, issue)| match issue {
            SegmentIssue::MissingKeypoint(_) => Some(*id),
            SegmentIssue::DegenerateGeometry => None,
        })
    }

    pub fn issue(&self, id: SegmentId) -> Option<SegmentIssue> {
        self.issues.iter().find(|(s, _)| *s == id).map(|(_, issue)| *issue)
    }
}

/// レンダラーへ渡す1セグメント分のスナップショット
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentPose {
    pub id: SegmentId,
    pub transform: SegmentTransform,
}

/// 全セグメントの読み取り専用スナップショット (更新順)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RigSnapshot {
    pub segments: Vec<SegmentPose>,
}

impl RigSnapshot {
    pub fn get(&self, id: SegmentId) -> Option<&SegmentTransform> {
        self.segments.iter().find(|s| s.id == id).map(|s| &s.transform)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// 瞬間ターゲット
struct Target {
    position: Vector3<f32>,
    rotation: Option<UnitQuaternion<f32>>,
}

/// キーポイントフレーム → セグメント変換
///
/// セグメントテーブルを所有し、毎ティック
/// 正規化 → ターゲット計算 → 平滑化 を行う。
pub struct RigMapper {
    settings: RigSettings,
    segments: Vec<RigSegment>,
}

impl RigMapper {
    pub fn new(settings: RigSettings) -> Self {
        Self::with_segments(settings, default_segments())
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(RigSettings::from_config(config))
    }

    /// 任意のセグメントテーブルで作成 (順序はそのまま更新順になる)
    pub fn with_segments(settings: RigSettings, segments: Vec<RigSegment>) -> Self {
        Self { settings, segments }
    }

    pub fn settings(&self) -> &RigSettings {
        &self.settings
    }

    pub fn set_smoothing(&mut self, smoothing: Smoothing) {
        self.settings.smoothing = smoothing;
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.settings.scale = scale;
    }

    pub fn set_head_correction(&mut self, correction: UnitQuaternion<f32>) {
        self.settings.head_correction = correction;
    }

    /// セグメント個別の平滑化係数。None でリグ全体の設定に戻す
    pub fn set_segment_smoothing(&mut self, id: SegmentId, smoothing: Option<Smoothing>) -> bool {
        match self.segments.iter_mut().find(|s| s.id == id) {
            Some(segment) => {
                segment.smoothing = smoothing;
                true
            }
            None => false,
        }
    }

    pub fn segments(&self) -> &[RigSegment] {
        &self.segments
    }

    pub fn transform(&self, id: SegmentId) -> Option<&SegmentTransform> {
        self.segments.iter().find(|s| s.id == id).map(|s| &s.transform)
    }

    /// 全セグメントを未観測・原点に戻す
    pub fn reset(&mut self) {
        for segment in &mut self.segments {
            segment.reset();
        }
    }

    /// 1フレーム分の更新
    ///
    /// 必要なキーポイントが欠けたセグメントは前回の値のまま。
    /// 全ターゲットは同じ入力フレームから計算するため、セグメント間の依存はない。
    pub fn update(&mut self, frame: &Frame) -> UpdateReport {
        let frame = normalize_frame(frame, self.settings.scale);
        let anchors = Anchors::new(&frame);
        let mut report = UpdateReport::default();

        for segment in &mut self.segments {
            let target = match compute_target(&segment.placement, &anchors, &self.settings) {
                Ok(target) => target,
                Err(missing) => {
                    debug!("{}: skipped, {} missing", segment.id, missing);
                    report
                        .issues
                        .push((segment.id, SegmentIssue::MissingKeypoint(missing)));
                    continue;
                }
            };

            let smoothing = segment.smoothing.unwrap_or(self.settings.smoothing);
            let snap = self.settings.snap_first_sample;

            // 係数 0 のセグメントはスナップ有効でも動かさない
            segment.transform.position = if snap && !segment.position_observed && smoothing.position > 0.0 {
                target.position
            } else {
                smooth_position(segment.transform.position, target.position, smoothing.position)
            };
            segment.position_observed = true;

            match target.rotation {
                Some(rotation) => {
                    segment.transform.rotation = if snap && !segment.rotation_observed && smoothing.rotation > 0.0 {
                        rotation
                    } else {
                        smooth_rotation(segment.transform.rotation, rotation, smoothing.rotation)
                    };
                    segment.rotation_observed = true;
                }
                None if segment.placement.has_orientation() => {
                    debug!("{}: degenerate direction, rotation kept", segment.id);
                    report
                        .issues
                        .push((segment.id, SegmentIssue::DegenerateGeometry));
                }
                None => {}
            }
            report.updated += 1;
        }

        report
    }

    pub fn snapshot(&self) -> RigSnapshot {
        RigSnapshot {
            segments: self
                .segments
                .iter()
                .map(|s| SegmentPose {
                    id: s.id,
                    transform: s.transform,
                })
                .collect(),
        }
    }
}

fn compute_target(
    placement: &Placement,
    anchors: &Anchors<'_>,
    settings: &RigSettings,
) -> Result<Target, KeypointName> {
    use KeypointName as K;
    let target = match *placement {
        Placement::Joint(a) => Target {
            position: place::place_joint(anchors.resolve(a)?),
            rotation: None,
        },
        Placement::Limb(a, b) => {
            let (position, rotation) = place::place_limb(anchors.resolve(a)?, anchors.resolve(b)?);
            Target { position, rotation }
        }
        Placement::Span { position, orientation } => {
            let (pos, _) = place::place_limb(anchors.resolve(position.0)?, anchors.resolve(position.1)?);
            let rotation = match orientation {
                Some((a, b)) => place::place_limb(anchors.resolve(a)?, anchors.resolve(b)?).1,
                None => None,
            };
            Target { position: pos, rotation }
        }
        Placement::Head => {
            let nose = anchors.keypoint(K::Nose)?;
            let left_ear = anchors.keypoint(K::LeftEar)?;
            let right_ear = anchors.keypoint(K::RightEar)?;
            let (position, rotation) =
                place::place_head(nose, left_ear, right_ear, &settings.head_correction);
            Target {
                position,
                rotation: Some(rotation),
            }
        }
        Placement::Hand(side) => {
            let (wrist, elbow, index, pinky) = match side {
                Side::Left => (K::LeftWrist, K::LeftElbow, K::LeftIndex, K::LeftPinky),
                Side::Right => (K::RightWrist, K::RightElbow, K::RightIndex, K::RightPinky),
            };
            let (position, rotation) = place::place_hand(
                side,
                anchors.keypoint(wrist)?,
                anchors.keypoint(elbow)?,
                anchors.keypoint(index)?,
                anchors.keypoint(pinky)?,
            );
            Target { position, rotation }
        }
    };
    Ok(target)
}
