pub mod mapper;
pub mod place;
pub mod segment;
pub mod smooth;

pub use mapper::{RigMapper, RigSettings, RigSnapshot, SegmentIssue, SegmentPose, UpdateReport};
pub use segment::{Anchor, Placement, RigSegment, SegmentId, SegmentKind, SegmentTransform, Side};
pub use smooth::{smooth_position, smooth_rotation, Smoothing};
