pub mod frame;
pub mod keypoint;
pub mod normalize;

pub use frame::Frame;
pub use keypoint::{Keypoint, KeypointName};
pub use normalize::{normalize_frame, normalize_point};
