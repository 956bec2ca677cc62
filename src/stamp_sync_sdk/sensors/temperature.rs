use super::header::Header;
use super::utils::{HasHeader, RosMsg};
use serde::{Deserialize, Serialize};

pub const SCHEMA_DEF: &str = "std_msgs/Header header\nfloat64 temperature\nfloat64 variance\n================================================================================\nMSG: std_msgs/Header\nbuiltin_interfaces/Time stamp\nstring frame_id\n================================================================================\nMSG: builtin_interfaces/Time\nint32 sec\nuint32 nanosec\n";

/// `sensor_msgs/msg/Temperature`
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Temperature {
    pub header: Header,
    pub temperature: f64,
    pub variance: f64,
}

impl RosMsg for Temperature {
    fn get_schema_name() -> &'static str {
        "sensor_msgs/msg/Temperature"
    }

    fn get_schema_def() -> &'static [u8] {
        SCHEMA_DEF.as_bytes()
    }
}

impl HasHeader for Temperature {
    fn get_header(&self) -> &Header {
        &self.header
    }
}
