use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while aligning timestamp-named files.
#[derive(Debug, Error)]
pub enum AlignError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sequence {requested} requested from {path}, which has {available} line(s)")]
    MissingReferenceLine {
        path: Utf8PathBuf,
        requested: usize,
        available: usize,
    },

    #[error("malformed line {line} in {path}: {reason}")]
    MalformedLine {
        path: Utf8PathBuf,
        line: usize,
        reason: String,
    },

    #[error("file name `{name}` in {dir} is not an integer timestamp")]
    InvalidTimestamp { dir: Utf8PathBuf, name: String },

    #[error("no file with an allowed extension in {0}")]
    NoEligibleFiles(Utf8PathBuf),

    #[error("{dir} mixes several image extensions: {extensions:?}")]
    MixedExtensions {
        dir: Utf8PathBuf,
        extensions: Vec<String>,
    },

    #[error("timestamp {0} appears more than once in the rename batch")]
    DuplicateTimestamp(i64),

    #[error("source file {0} does not exist")]
    MissingSource(Utf8PathBuf),

    #[error("destination {0} already exists and is not part of the rename batch")]
    Collision(Utf8PathBuf),

    #[error("applying offset {offset} to timestamp {timestamp} overflows")]
    Overflow { timestamp: i64, offset: i64 },

    #[error("frame log lists {timestamps} timestamp(s) but {dir} holds {frames} frame file(s)")]
    FrameCountMismatch {
        dir: Utf8PathBuf,
        timestamps: usize,
        frames: usize,
    },

    #[error("cannot derive a frame timestamp log from video path {0}")]
    InvalidVideoPath(Utf8PathBuf),

    #[error("{0} was already aligned, remove it or force the run to align again")]
    AlreadyAligned(Utf8PathBuf),
}

impl AlignError {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        AlignError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised while extracting topics out of a sensor log.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("MCAP error: {0}")]
    Mcap(#[from] mcap::McapError),

    #[error("failed to decode {schema} message on {topic}: {reason}")]
    Decode {
        topic: String,
        schema: String,
        reason: String,
    },

    #[error("topic {topic} carries `{found}` messages, expected `{expected}`")]
    UnexpectedSchema {
        topic: String,
        expected: &'static str,
        found: String,
    },

    #[error("unsupported image encoding `{encoding}` for {target}")]
    UnsupportedEncoding {
        encoding: String,
        target: &'static str,
    },

    #[error("image buffer holds {actual} bytes, {expected} expected for {width}x{height} `{encoding}`")]
    ImageSize {
        encoding: String,
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("failed to write image {path}: {source}")]
    Image {
        path: Utf8PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write array {path}: {source}")]
    Npy {
        path: Utf8PathBuf,
        #[source]
        source: ndarray_npy::WriteNpyError,
    },

    #[error("{imu_topics} IMU topic(s) given for {temperature_topics} temperature topic(s)")]
    TopicPairing {
        imu_topics: usize,
        temperature_topics: usize,
    },

    #[error("timestamp in temperature topic {temperature_topic} did not match IMU topic {imu_topic} at row {index}: {imu_stamp} != {temperature_stamp}")]
    StampMismatch {
        imu_topic: String,
        temperature_topic: String,
        index: usize,
        imu_stamp: u64,
        temperature_stamp: u64,
    },
}

impl ExtractError {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        ExtractError::Io {
            path: path.into(),
            source,
        }
    }
}
