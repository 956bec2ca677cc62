use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Header {
    pub stamp_sec: i32,
    pub stamp_nsec: u32,
    pub frame_id: String,
}

impl Header {
    pub fn new(stamp: u64, frame_id: &str) -> Self {
        let (stamp_sec, stamp_nsec) = get_sec_nsec(stamp);
        Header {
            stamp_sec,
            stamp_nsec,
            frame_id: frame_id.to_string(),
        }
    }

    /// Stamp in nanoseconds, `None` for stamps before the epoch.
    #[inline]
    pub fn try_timestamp(&self) -> Option<u64> {
        let sec = u64::try_from(self.stamp_sec).ok()?;
        Some(sec * 1_000_000_000 + u64::from(self.stamp_nsec))
    }

    /// Returns the stamp of this [`Header`] in nanoseconds. Stamps before the
    /// epoch read as 0; decoded messages are checked against them.
    #[inline]
    pub fn get_timestamp(&self) -> u64 {
        self.try_timestamp().unwrap_or_default()
    }
}

#[inline]
pub fn get_sec_nsec(timestamp: u64) -> (i32, u32) {
    let sec = timestamp / 1_000_000_000;
    let nsec = timestamp - sec * 1_000_000_000;
    (sec as i32, nsec as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nanosecond_round_trip() {
        let header = Header {
            stamp_sec: 1748443579,
            stamp_nsec: 970818840,
            frame_id: "vn100_link".to_string(),
        };
        assert_eq!(header.get_timestamp(), 1748443579970818840);
        assert_eq!(Header::new(1748443579970818840, "vn100_link"), header);
    }

    #[test]
    fn stamps_before_epoch_have_no_timestamp() {
        let header = Header {
            stamp_sec: -1,
            stamp_nsec: 999_999_999,
            frame_id: "imu".to_string(),
        };
        assert_eq!(header.try_timestamp(), None);
        assert_eq!(header.get_timestamp(), 0);

        let latest = Header {
            stamp_sec: i32::MAX,
            stamp_nsec: u32::MAX,
            frame_id: "imu".to_string(),
        };
        assert_eq!(
            latest.try_timestamp(),
            Some(i32::MAX as u64 * 1_000_000_000 + u32::MAX as u64)
        );
    }
}
