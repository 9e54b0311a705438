use log::{info, warn};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use super::interpolate::interpolate;
use super::schema::{decode, encode, Decoded, Schema, SchemaChoice};
use super::sequence::RecordedSequence;
use super::MotionError;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> MotionError + '_ {
    move |source| MotionError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub fn load_sequence(path: &Path, choice: SchemaChoice) -> Result<Decoded, MotionError> {
    let text = fs::read_to_string(path).map_err(io_error(path))?;
    decode(&text, choice)
}

pub fn save_sequence(path: &Path, sequence: &RecordedSequence, schema: Schema) -> Result<(), MotionError> {
    let text = encode(sequence, schema)?;
    fs::write(path, text).map_err(io_error(path))
}

/// `<dir>/<stem><suffix>.json`
pub fn derived_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    path.with_file_name(format!("{stem}{suffix}.json"))
}

/// 1ファイルを補間し、入力と同じスキーマで隣に書き出す
pub fn interpolate_file(
    path: &Path,
    factor: NonZeroUsize,
    choice: SchemaChoice,
    suffix: &str,
) -> Result<PathBuf, MotionError> {
    let decoded = load_sequence(path, choice)?;
    let output = interpolate(&decoded.sequence, factor);
    let out_path = derived_path(path, suffix);
    save_sequence(&out_path, &output, decoded.schema)?;
    info!(
        "{} -> {} ({} -> {} frames, {})",
        path.display(),
        out_path.display(),
        decoded.sequence.len(),
        output.len(),
        decoded.schema.as_str()
    );
    Ok(out_path)
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, MotionError)>,
    /// 既に接尾辞を持つ (出力済みの) ファイル
    pub skipped: Vec<PathBuf>,
}

/// ディレクトリ内の `.json` をすべて補間
///
/// 1ファイルの失敗は記録して残りを続ける。ディレクトリが読めなければエラー。
pub fn interpolate_dir(
    dir: &Path,
    factor: NonZeroUsize,
    choice: SchemaChoice,
    suffix: &str,
) -> Result<BatchReport, MotionError> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_error(dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut report = BatchReport::default();
    for path in paths {
        let already_derived = path
            .file_stem()
            .is_some_and(|stem| !suffix.is_empty() && stem.to_string_lossy().ends_with(suffix));
        if already_derived {
            report.skipped.push(path);
            continue;
        }

        match interpolate_file(&path, factor, choice, suffix) {
            Ok(out) => report.written.push(out),
            Err(e) => {
                warn!("{}: {}", path.display(), e);
                report.failed.push((path, e));
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rig_retarget_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    const TWO_FRAMES: &str = r#"[
        {"nose": {"x": 0.0, "y": 0.0, "z": 0.0}},
        {"nose": {"x": 1.0, "y": 2.0, "z": 3.0}}
    ]"#;

    #[test]
    fn test_derived_path() {
        assert_eq!(
            derived_path(Path::new("data/walk.json"), "_interpolated"),
            PathBuf::from("data/walk_interpolated.json")
        );
        assert_eq!(
            derived_path(Path::new("walk.v2.json"), "_trimmed"),
            PathBuf::from("walk.v2_trimmed.json")
        );
    }

    #[test]
    fn test_interpolate_file_keeps_schema() {
        let dir = make_temp_dir("file");
        let path = dir.join("walk.json");
        fs::write(&path, TWO_FRAMES).unwrap();

        let out = interpolate_file(&path, NonZeroUsize::new(4).unwrap(), SchemaChoice::Auto, "_interpolated").unwrap();
        assert_eq!(out, dir.join("walk_interpolated.json"));

        let decoded = load_sequence(&out, SchemaChoice::Auto).unwrap();
        assert_eq!(decoded.schema, Schema::Flat);
        assert_eq!(decoded.sequence.len(), 4);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_sequence(Path::new("/nonexistent/rig_retarget.json"), SchemaChoice::Auto);
        assert!(matches!(result, Err(MotionError::Io { .. })));
    }

    #[test]
    fn test_interpolate_dir_continues_after_failure() {
        let dir = make_temp_dir("dir");
        fs::write(dir.join("a.json"), TWO_FRAMES).unwrap();
        fs::write(dir.join("b.json"), "{broken").unwrap();
        fs::write(dir.join("c_interpolated.json"), TWO_FRAMES).unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let report = interpolate_dir(&dir, NonZeroUsize::new(2).unwrap(), SchemaChoice::Auto, "_interpolated").unwrap();
        assert_eq!(report.written, vec![dir.join("a_interpolated.json")]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, dir.join("b.json"));
        assert_eq!(report.skipped, vec![dir.join("c_interpolated.json")]);

        let _ = fs::remove_dir_all(&dir);
    }
}
