//! Keypoints3D 形式の記録を縮小して `<stem>_trimmed.json` に書き出す

use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

use rig_retarget::motion::{derived_path, trim_keypoints3d};

const TRIMMED_SUFFIX: &str = "_trimmed";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let inputs: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if inputs.is_empty() {
        anyhow::bail!("usage: trim_motion <file.json>...");
    }

    for input in inputs {
        let text = fs::read_to_string(&input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        let (trimmed, dropped) = trim_keypoints3d(&text)
            .with_context(|| format!("Failed to trim {}", input.display()))?;

        let output = derived_path(&input, TRIMMED_SUFFIX);
        fs::write(&output, &trimmed)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        info!(
            "{} -> {} ({} -> {} bytes, {} empty frame(s) dropped)",
            input.display(),
            output.display(),
            text.len(),
            trimmed.len(),
            dropped
        );
    }

    Ok(())
}
