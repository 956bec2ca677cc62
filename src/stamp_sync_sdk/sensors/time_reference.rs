use super::basic::Time;
use super::common::CsvSaveable;
use super::header::Header;
use super::utils::{HasHeader, RosMsg};
use serde::{Deserialize, Serialize};

pub const SCHEMA_DEF: &str = "std_msgs/Header header\nbuiltin_interfaces/Time time_ref\nstring source\n================================================================================\nMSG: std_msgs/Header\nbuiltin_interfaces/Time stamp\nstring frame_id\n================================================================================\nMSG: builtin_interfaces/Time\nint32 sec\nuint32 nanosec\n";

pub const TIME_REF_FILE_NAME: &str = "time_ref.csv";

/// `sensor_msgs/msg/TimeReference`
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct TimeReference {
    pub header: Header,
    pub time_ref: Time,
    pub source: String,
}

impl RosMsg for TimeReference {
    fn get_schema_name() -> &'static str {
        "sensor_msgs/msg/TimeReference"
    }

    fn get_schema_def() -> &'static [u8] {
        SCHEMA_DEF.as_bytes()
    }
}

impl HasHeader for TimeReference {
    fn get_header(&self) -> &Header {
        &self.header
    }

    fn check_stamps(&self) -> Result<(), String> {
        if self.header.try_timestamp().is_none() || self.time_ref.try_as_nanos().is_none() {
            return Err(format!(
                "stamp {}s / time_ref {}s is before the epoch",
                self.header.stamp_sec, self.time_ref.sec
            ));
        }
        Ok(())
    }
}

/// One `index,stamp,time_ref` row of `time_ref.csv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRefRow {
    pub index: usize,
    pub stamp: u64,
    pub time_ref: u64,
}

impl TimeRefRow {
    pub fn new(index: usize, msg: &TimeReference) -> Self {
        Self {
            index,
            stamp: msg.header.get_timestamp(),
            time_ref: msg.time_ref.as_nanos(),
        }
    }
}

impl CsvSaveable for TimeRefRow {
    fn get_csv_headers() -> Option<&'static str> {
        None
    }

    fn to_csv_row(&self) -> String {
        format!("{},{},{}", self.index, self.stamp, self.time_ref)
    }
}
