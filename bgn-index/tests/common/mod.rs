use std::path::PathBuf;

pub fn init_log() {
    bgn_util::init_log();
}

/// Write `contents` to a file under the temp dir named after the test
pub fn write_temp(name: &str, contents: &str) -> std::io::Result<PathBuf> {
    let path = std::env::temp_dir().join(format!("bgn_index_{name}.json"));
    std::fs::write(&path, contents)?;
    Ok(path)
}
