pub mod basic;
pub(crate) mod common;
pub mod header;
pub mod image;
pub mod imu;
pub mod temperature;
pub mod time_reference;
pub mod utils;
