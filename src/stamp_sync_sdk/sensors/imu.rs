use super::basic::{Quaternion, Vector3};
use super::common::CsvSaveable;
use super::header::Header;
use super::temperature::Temperature;
use super::utils::{HasHeader, RosMsg};
use serde::{Deserialize, Serialize};

pub const SCHEMA_DEF: &str = "std_msgs/Header header\ngeometry_msgs/Quaternion orientation\nfloat64[9] orientation_covariance\ngeometry_msgs/Vector3 angular_velocity\nfloat64[9] angular_velocity_covariance\ngeometry_msgs/Vector3 linear_acceleration\nfloat64[9] linear_acceleration_covariance\n================================================================================\nMSG: std_msgs/Header\nbuiltin_interfaces/Time stamp\nstring frame_id\n================================================================================\nMSG: builtin_interfaces/Time\nint32 sec\nuint32 nanosec\n================================================================================\nMSG: geometry_msgs/Quaternion\nfloat64 x\nfloat64 y\nfloat64 z\nfloat64 w\n================================================================================\nMSG: geometry_msgs/Vector3\nfloat64 x\nfloat64 y\nfloat64 z\n";

pub const IMU_FILE_NAME: &str = "imu.csv";

/// `sensor_msgs/msg/Imu`
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Imu {
    pub header: Header,
    pub orientation: Quaternion,
    pub orientation_covariance: [f64; 9],
    pub angular_velocity: Vector3,
    pub angular_velocity_covariance: [f64; 9],
    pub linear_acceleration: Vector3,
    pub linear_acceleration_covariance: [f64; 9],
}

impl Imu {
    pub fn new(
        header: Header,
        angular_velocity: Vector3,
        linear_acceleration: Vector3,
    ) -> Self {
        Imu {
            header,
            orientation: Quaternion::identity(),
            orientation_covariance: [0f64; 9],
            angular_velocity,
            angular_velocity_covariance: [0f64; 9],
            linear_acceleration,
            linear_acceleration_covariance: [0f64; 9],
        }
    }
}

impl RosMsg for Imu {
    fn get_schema_name() -> &'static str {
        "sensor_msgs/msg/Imu"
    }

    fn get_schema_def() -> &'static [u8] {
        SCHEMA_DEF.as_bytes()
    }
}

impl HasHeader for Imu {
    fn get_header(&self) -> &Header {
        &self.header
    }
}

/// An IMU reading joined with the temperature reported for the same stamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuSample {
    pub stamp: u64,
    pub angular_velocity: Vector3,
    pub linear_acceleration: Vector3,
    pub temperature: f64,
}

impl ImuSample {
    /// Joins the two readings, or returns both stamps when they disagree.
    pub fn pair(imu: &Imu, temperature: &Temperature) -> Result<Self, (u64, u64)> {
        let imu_stamp = imu.header.get_timestamp();
        let temperature_stamp = temperature.header.get_timestamp();
        if imu_stamp != temperature_stamp {
            return Err((imu_stamp, temperature_stamp));
        }
        Ok(ImuSample {
            stamp: imu_stamp,
            angular_velocity: imu.angular_velocity,
            linear_acceleration: imu.linear_acceleration,
            temperature: temperature.temperature,
        })
    }
}

impl CsvSaveable for ImuSample {
    fn get_csv_headers() -> Option<&'static str> {
        None
    }

    // `{:?}` keeps the decimal point on whole values: 25.0, not 25
    fn to_csv_row(&self) -> String {
        let la = self.linear_acceleration;
        let av = self.angular_velocity;
        format!(
            "{},{:?},{:?},{:?},{:?},{:?},{:?},{:?}",
            self.stamp, av.x, av.y, av.z, la.x, la.y, la.z, self.temperature
        )
    }
}
