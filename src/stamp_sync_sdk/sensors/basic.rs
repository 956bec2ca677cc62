use serde::{Deserialize, Serialize};

/// `builtin_interfaces/Time`
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub struct Time {
    pub sec: i32,
    pub nanosec: u32,
}

impl Time {
    pub fn from_nanos(timestamp: u64) -> Self {
        let (sec, nanosec) = super::header::get_sec_nsec(timestamp);
        Self { sec, nanosec }
    }

    #[inline]
    pub fn try_as_nanos(&self) -> Option<u64> {
        let sec = u64::try_from(self.sec).ok()?;
        Some(sec * 1_000_000_000 + u64::from(self.nanosec))
    }

    /// Nanoseconds since the epoch, 0 for earlier times.
    #[inline]
    pub fn as_nanos(&self) -> u64 {
        self.try_as_nanos().unwrap_or_default()
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}
impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}
impl Quaternion {
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}
