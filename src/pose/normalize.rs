use nalgebra::Vector3;

use super::frame::Frame;

/// 姿勢推定の座標系 → リグのワールド座標系
///
/// 推定器はカメラ相対 (Y下向き, Z手前向き)。リグは Y上向き, Z奥向き。
/// X/Z を反転し、Y を反転+オフセット、全軸を `scale` 倍する。
pub fn normalize_point(point: Vector3<f32>, scale: f32) -> Vector3<f32> {
    Vector3::new(
        -point.x * scale,
        -(point.y * scale - scale),
        -point.z * scale,
    )
}

/// フレーム内の全キーポイントを正規化
pub fn normalize_frame(frame: &Frame, scale: f32) -> Frame {
    frame.map_points(|p| normalize_point(p, scale))
}
