pub mod interpolate;
pub mod playback;
pub mod schema;
pub mod sequence;
pub mod store;
pub mod trim;

use std::path::PathBuf;
use thiserror::Error;

pub use interpolate::{interpolate, interpolate_pair};
pub use playback::Playback;
pub use schema::{decode, encode, DecodeStats, Decoded, Schema, SchemaChoice};
pub use sequence::RecordedSequence;
pub use store::{derived_path, interpolate_dir, interpolate_file, load_sequence, save_sequence, BatchReport};
pub use trim::{trim_keypoints3d, trim_sequence};

/// 記録モーションの読み書きエラー
///
/// ファイル単位で致命的なもののみ。キーポイント単位の不備はスキップされる。
#[derive(Debug, Error)]
pub enum MotionError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed recorded sequence: {0}")]
    Malformed(String),
}
