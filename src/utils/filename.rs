use std::path::{Path, PathBuf};

const RECENT_FILE_SUFFIX: &str = "recent_weather.csv";

/// Derive the output path for recent-window fetches: `foo.csv` -> `foo_recent.csv`.
///
/// Paths already ending in `recent_weather.csv` are kept as given.
pub fn recent_output_path(path: &Path) -> PathBuf {
    let as_str = path.to_string_lossy();
    if as_str.ends_with(RECENT_FILE_SUFFIX) {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let filename = match path.extension() {
        Some(ext) => format!("{}_recent.{}", stem, ext.to_string_lossy()),
        None => format!("{}_recent", stem),
    };

    path.with_file_name(filename)
}
