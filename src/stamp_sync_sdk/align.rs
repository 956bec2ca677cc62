//! Aligns files named by capture timestamp with an independently clocked
//! reference log.
//!
//! Both alignment modes compute a single offset and hand it to
//! [`apply_offset`], which renames `<old>.<ext>` to `<old + offset>.<ext>` and
//! records every rename in `transformation_metainf.csv`. A directory is meant
//! to be aligned once: running again on its output would apply the offset a
//! second time, so the entry points refuse directories that already carry the
//! audit file unless [`AlignOptions::force`] is set.

use std::collections::{BTreeSet, HashSet};
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use tracing::{debug, info};

use super::error::AlignError;
use super::reference::{read_frame_timestamps, read_reference_record, TimeReferenceRecord};
use super::sensors::common::{CsvSaveable, CsvWriter};

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "tif"];
pub const TRANSFORMATION_FILE_NAME: &str = "transformation_metainf.csv";

const FRAME_EXTENSION: &str = "png";
const FRAME_PATTERN: &str = r"^frame-(\d+)\.png$";
const VIDEO_DATE_PATTERN: &str = r"VID_((\d|_)*)";
const STAGING_SUFFIX: &str = "aligning";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampedFile {
    pub timestamp: i64,
    pub extension: String,
}

impl TimestampedFile {
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.timestamp, self.extension)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformationRecord {
    pub seq: usize,
    pub old_stamp: i64,
    pub new_stamp: i64,
}

impl CsvSaveable for TransformationRecord {
    fn get_csv_headers() -> Option<&'static str> {
        Some("seq,old_stamp,new_stamp")
    }

    fn to_csv_row(&self) -> String {
        format!("{},{},{}", self.seq, self.old_stamp, self.new_stamp)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlignOptions {
    /// Align even if the directory already holds a transformation file.
    pub force: bool,
}

#[derive(Debug, Clone)]
pub struct AlignmentReport {
    pub reference: TimeReferenceRecord,
    /// Local timestamp the reference timestamp was matched against.
    pub source_timestamp: i64,
    pub offset: i64,
    pub records: Vec<TransformationRecord>,
}

pub fn align_by_ref<P: AsRef<Utf8Path>>(
    time_ref: P,
    target_dir: P,
    ref_seq: usize,
) -> Result<AlignmentReport, AlignError> {
    align_by_ref_with(time_ref, target_dir, ref_seq, &AlignOptions::default())
}

/// Matches line `ref_seq` of the reference log with the earliest image of
/// `target_dir` and shifts every image by the resulting offset.
pub fn align_by_ref_with<P: AsRef<Utf8Path>>(
    time_ref: P,
    target_dir: P,
    ref_seq: usize,
    options: &AlignOptions,
) -> Result<AlignmentReport, AlignError> {
    let target_dir = target_dir.as_ref();
    check_not_aligned(target_dir, options)?;

    let reference = read_reference_record(time_ref, ref_seq, 2)?;
    let files = list_timestamped_files(target_dir, &ALLOWED_EXTENSIONS)?;
    let anchor = files
        .first()
        .ok_or_else(|| AlignError::NoEligibleFiles(target_dir.to_path_buf()))?;

    let extensions: BTreeSet<&str> = files.iter().map(|f| f.extension.as_str()).collect();
    if extensions.len() > 1 {
        return Err(AlignError::MixedExtensions {
            dir: target_dir.to_path_buf(),
            extensions: extensions.into_iter().map(str::to_string).collect(),
        });
    }

    let offset = reference
        .timestamp_a
        .checked_sub(anchor.timestamp)
        .ok_or(AlignError::Overflow {
            timestamp: reference.timestamp_a,
            offset: anchor.timestamp,
        })?;
    info!(
        "Aligning with sequence {}, timestamps {} - {}",
        reference.sequence, anchor.timestamp, reference.timestamp_a
    );

    let timestamps: Vec<i64> = files.iter().map(|f| f.timestamp).collect();
    let records = apply_offset(target_dir, &timestamps, &anchor.extension, offset)?;

    Ok(AlignmentReport {
        reference,
        source_timestamp: anchor.timestamp,
        offset,
        records,
    })
}

pub fn align_by_delta<P: AsRef<Utf8Path>>(
    time_ref: P,
    target_dir: P,
    video_path: P,
) -> Result<AlignmentReport, AlignError> {
    align_by_delta_with(time_ref, target_dir, video_path, &AlignOptions::default())
}

/// Names the `frame-N.png` files extracted from `video_path` after their
/// recorded timestamps, then shifts them by the delta stored on the first
/// line of the reference log.
pub fn align_by_delta_with<P: AsRef<Utf8Path>>(
    time_ref: P,
    target_dir: P,
    video_path: P,
    options: &AlignOptions,
) -> Result<AlignmentReport, AlignError> {
    let target_dir = target_dir.as_ref();
    check_not_aligned(target_dir, options)?;

    let frame_log = frame_timestamp_log_path(video_path.as_ref())?;
    if !frame_log.is_file() {
        return Err(AlignError::io(
            frame_log,
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "frame timestamp log not found",
            ),
        ));
    }
    let timestamps = read_frame_timestamps(&frame_log)?;

    // validated before any frame is touched
    let reference = read_reference_record(time_ref.as_ref(), 1, 3)?;
    let offset = reference
        .delta()
        .ok_or_else(|| AlignError::MalformedLine {
            path: time_ref.as_ref().to_path_buf(),
            line: 1,
            reason: "reference and local timestamps do not give a valid delta".to_string(),
        })?;

    rename_frames(target_dir, &timestamps)?;

    info!(
        "Aligning with sequence {}, timestamps {} - {}",
        reference.sequence,
        reference.timestamp_b.unwrap_or_default(),
        reference.timestamp_a
    );
    let records = apply_offset(target_dir, &timestamps, FRAME_EXTENSION, offset)?;

    Ok(AlignmentReport {
        reference,
        source_timestamp: reference.timestamp_b.unwrap_or_default(),
        offset,
        records,
    })
}

/// Renames `<old>.<extension>` to `<old + offset>.<extension>` for every
/// timestamp, in order, writing one `seq,old_stamp,new_stamp` row per rename
/// to a fresh `transformation_metainf.csv`.
///
/// The batch is checked before anything moves: duplicate timestamps, missing
/// sources and destinations owned by files outside the batch are rejected.
/// When a destination is still occupied by a later source, the sources are
/// first moved aside so no file is overwritten.
pub fn apply_offset<P: AsRef<Utf8Path>>(
    target_dir: P,
    timestamps: &[i64],
    extension: &str,
    offset: i64,
) -> Result<Vec<TransformationRecord>, AlignError> {
    let target_dir = target_dir.as_ref();
    let records = plan_renames(timestamps, offset)?;
    let file_path = |stamp: i64| target_dir.join(format!("{}.{}", stamp, extension));
    let staged_path =
        |stamp: i64| target_dir.join(format!("{}.{}.{}", stamp, extension, STAGING_SUFFIX));

    let sources: HashSet<i64> = timestamps.iter().copied().collect();
    for record in &records {
        let source = file_path(record.old_stamp);
        if !source.is_file() {
            return Err(AlignError::MissingSource(source));
        }
        let destination = file_path(record.new_stamp);
        if !sources.contains(&record.new_stamp) && destination.exists() {
            return Err(AlignError::Collision(destination));
        }
    }
    let needs_staging = offset != 0 && records.iter().any(|r| sources.contains(&r.new_stamp));

    let csv_path = target_dir.join(TRANSFORMATION_FILE_NAME);
    let mut writer = CsvWriter::create(&csv_path).map_err(|e| AlignError::io(&csv_path, e))?;

    if needs_staging {
        for record in &records {
            let (from, to) = (file_path(record.old_stamp), staged_path(record.old_stamp));
            fs::rename(&from, &to).map_err(|e| AlignError::io(&from, e))?;
        }
    }

    for record in &records {
        let from = match needs_staging {
            true => staged_path(record.old_stamp),
            false => file_path(record.old_stamp),
        };
        let to = file_path(record.new_stamp);
        writer
            .add(record)
            .map_err(|e| AlignError::io(&csv_path, e))?;
        debug!("Old name: {} new name: {}", from, to);
        fs::rename(&from, &to).map_err(|e| AlignError::io(&from, e))?;
    }
    writer.finish().map_err(|e| AlignError::io(&csv_path, e))?;

    Ok(records)
}

fn plan_renames(timestamps: &[i64], offset: i64) -> Result<Vec<TransformationRecord>, AlignError> {
    let mut seen = HashSet::with_capacity(timestamps.len());
    timestamps
        .iter()
        .enumerate()
        .map(|(seq, &old_stamp)| {
            if !seen.insert(old_stamp) {
                return Err(AlignError::DuplicateTimestamp(old_stamp));
            }
            let new_stamp = old_stamp.checked_add(offset).ok_or(AlignError::Overflow {
                timestamp: old_stamp,
                offset,
            })?;
            Ok(TransformationRecord {
                seq,
                old_stamp,
                new_stamp,
            })
        })
        .collect()
}

/// Timestamp-named files of `dir` whose extension is in `allowed`, sorted by
/// timestamp. A retained file whose stem is not an integer is an error.
pub fn list_timestamped_files<P: AsRef<Utf8Path>>(
    dir: P,
    allowed: &[&str],
) -> Result<Vec<TimestampedFile>, AlignError> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    for entry in dir.read_dir_utf8().map_err(|e| AlignError::io(dir, e))? {
        let entry = entry.map_err(|e| AlignError::io(dir, e))?;
        let path = entry.path();
        let extension = match path.extension() {
            Some(ext) if allowed.contains(&ext) => ext,
            _ => continue,
        };
        if !path.is_file() {
            continue;
        }
        let timestamp = path
            .file_stem()
            .and_then(|stem| stem.parse::<i64>().ok())
            .ok_or_else(|| AlignError::InvalidTimestamp {
                dir: dir.to_path_buf(),
                name: entry.file_name().to_string(),
            })?;
        files.push(TimestampedFile {
            timestamp,
            extension: extension.to_string(),
        });
    }
    files.sort_by_key(|f| f.timestamp);
    Ok(files)
}

/// `<dir>/VID_20200101_120000.mp4` keeps its frame timestamps in
/// `<dir>/20200101_120000/VID_20200101_120000_timestamps.csv`.
pub fn frame_timestamp_log_path(video_path: &Utf8Path) -> Result<Utf8PathBuf, AlignError> {
    let invalid = || AlignError::InvalidVideoPath(video_path.to_path_buf());
    let video_name = video_path.file_stem().ok_or_else(invalid)?;
    let video_root = video_path.parent().unwrap_or_else(|| Utf8Path::new(""));
    let date_pattern = Regex::new(VIDEO_DATE_PATTERN).map_err(|_| invalid())?;
    let video_date = date_pattern.replace_all(video_name, "$1");

    Ok(video_root
        .join(video_date.as_ref())
        .join(format!("{}_timestamps.csv", video_name)))
}

fn rename_frames(target_dir: &Utf8Path, timestamps: &[i64]) -> Result<(), AlignError> {
    let frame_pattern = Regex::new(FRAME_PATTERN)
        .map_err(|e| AlignError::io(target_dir, std::io::Error::other(e)))?;
    let mut frames = 0;
    for entry in target_dir
        .read_dir_utf8()
        .map_err(|e| AlignError::io(target_dir, e))?
    {
        let entry = entry.map_err(|e| AlignError::io(target_dir, e))?;
        if frame_pattern.is_match(entry.file_name()) {
            frames += 1;
        }
    }
    if frames != timestamps.len() {
        return Err(AlignError::FrameCountMismatch {
            dir: target_dir.to_path_buf(),
            timestamps: timestamps.len(),
            frames,
        });
    }

    let mut seen = HashSet::with_capacity(timestamps.len());
    for (i, timestamp) in timestamps.iter().enumerate() {
        if !seen.insert(*timestamp) {
            return Err(AlignError::DuplicateTimestamp(*timestamp));
        }
        let frame = target_dir.join(format!("frame-{}.{}", i + 1, FRAME_EXTENSION));
        if !frame.is_file() {
            return Err(AlignError::MissingSource(frame));
        }
        let destination = target_dir.join(format!("{}.{}", timestamp, FRAME_EXTENSION));
        if destination.exists() {
            return Err(AlignError::Collision(destination));
        }
    }

    for (i, timestamp) in timestamps.iter().enumerate() {
        let from = target_dir.join(format!("frame-{}.{}", i + 1, FRAME_EXTENSION));
        let to = target_dir.join(format!("{}.{}", timestamp, FRAME_EXTENSION));
        debug!("Frame {} -> {}", from, to);
        fs::rename(&from, &to).map_err(|e| AlignError::io(&from, e))?;
    }
    Ok(())
}

fn check_not_aligned(target_dir: &Utf8Path, options: &AlignOptions) -> Result<(), AlignError> {
    let audit = target_dir.join(TRANSFORMATION_FILE_NAME);
    if !options.force && audit.exists() {
        return Err(AlignError::AlreadyAligned(audit));
    }
    Ok(())
}
