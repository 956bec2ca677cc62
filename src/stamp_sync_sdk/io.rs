use std::collections::BTreeMap;
use std::fs;

use anyhow::anyhow;
use camino::{Utf8Path, Utf8PathBuf};
use memmap::Mmap;

use super::error::ExtractError;

pub fn check_mcap_input_path<P: AsRef<Utf8Path>>(input: P) -> Result<Utf8PathBuf, anyhow::Error> {
    let input = input.as_ref();
    if input.is_file() {
        if input.extension() != Some("mcap") {
            return Err(anyhow!(
                "Input path must point to an .mcap file or a folder containing one."
            ));
        }
        return Ok(input.to_path_buf());
    }
    if input.is_dir() {
        let mut candidates: Vec<Utf8PathBuf> = input
            .read_dir_utf8()?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension() == Some("mcap"))
            .collect();
        candidates.sort();
        return candidates.pop().ok_or_else(|| {
            anyhow!("Input path must point to an .mcap file or a folder containing one.")
        });
    }
    Err(anyhow!("Input path doesn't exist: {}", input))
}

pub fn map_mcap<P: AsRef<Utf8Path>>(p: P) -> Result<Mmap, ExtractError> {
    let fd = fs::File::open(p.as_ref()).map_err(|e| ExtractError::io(p.as_ref(), e))?;
    unsafe { Mmap::map(&fd) }.map_err(|e| ExtractError::io(p.as_ref(), e))
}

/// Creates `path` and its parents unless it already exists.
pub fn ensure_dir<P: AsRef<Utf8Path>>(path: P) -> Result<(), ExtractError> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| ExtractError::io(path, e))?;
    }
    if !path.is_dir() {
        return Err(ExtractError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::Other, "not a directory"),
        ));
    }
    Ok(())
}

/// `/imu/data` -> `_imu_data`
pub fn topic_dir_name(topic: &str) -> String {
    topic.replace('/', "_")
}

/// Maps every topic to its output directory below `output`, creating the
/// directories on the way.
pub fn make_topic_dirs<P: AsRef<Utf8Path>>(
    output: P,
    topics: &[String],
) -> Result<BTreeMap<String, Utf8PathBuf>, ExtractError> {
    let mut topic_dirs = BTreeMap::new();
    for topic in topics {
        let dir = output.as_ref().join(topic_dir_name(topic));
        ensure_dir(&dir)?;
        topic_dirs.insert(topic.clone(), dir);
    }
    Ok(topic_dirs)
}
