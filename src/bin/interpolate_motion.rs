//! 記録モーションのフレーム補間
//!
//! 使い方: interpolate_motion [ファイルまたはディレクトリ] [倍率]
//! 省略時は config.toml の [interpolation] を使う。

use anyhow::{bail, Context, Result};
use log::{error, info};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use rig_retarget::config::Config;
use rig_retarget::motion::{interpolate_dir, interpolate_file};

const CONFIG_PATH: &str = "config.toml";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load_or_default(CONFIG_PATH);
    let mut args = std::env::args().skip(1);

    let input = PathBuf::from(args.next().unwrap_or_else(|| config.interpolation.input.clone()));
    let factor = match args.next() {
        Some(arg) => arg.parse::<usize>().with_context(|| format!("invalid factor {:?}", arg))?,
        None => config.interpolation.factor,
    };
    let factor = NonZeroUsize::new(factor).context("factor must be at least 1")?;
    let schema = config.interpolation.schema;
    let suffix = &config.interpolation.suffix;

    if input.is_dir() {
        let report = interpolate_dir(&input, factor, schema, suffix)?;
        info!(
            "{} written, {} failed, {} skipped",
            report.written.len(),
            report.failed.len(),
            report.skipped.len()
        );
        for (path, e) in &report.failed {
            error!("{}: {}", path.display(), e);
        }
        if !report.failed.is_empty() {
            bail!("{} file(s) failed", report.failed.len());
        }
    } else {
        interpolate_file(&input, factor, schema, suffix)?;
    }

    Ok(())
}
