use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use cdr_encoding::{from_bytes, to_vec};
use serde::{de::DeserializeOwned, Serialize};
use std::io::{Cursor, Write};

use super::header::Header;

/// CDR little endian encapsulation, as written by ROS 2 publishers.
const CDR_LE: u32 = 0x0001_0000;

pub trait HasHeader {
    fn get_header(&self) -> &Header;

    /// Rejects stamps that cannot be written as nanoseconds since the epoch.
    fn check_stamps(&self) -> Result<(), String> {
        let header = self.get_header();
        match header.try_timestamp() {
            Some(_) => Ok(()),
            None => Err(format!(
                "header stamp {}s is before the epoch",
                header.stamp_sec
            )),
        }
    }
}

/// A ROS 2 message with a fixed schema, serialized as CDR.
pub trait RosMsg: Serialize + DeserializeOwned {
    fn get_schema_name() -> &'static str;
    fn get_schema_def() -> &'static [u8];

    fn construct_msg(&self, buffer: &mut Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
        let mut cursor = Cursor::new(buffer);

        // write endian
        cursor.write_u32::<BigEndian>(CDR_LE)?;
        let serialized = to_vec::<Self, LittleEndian>(self)?;
        cursor.write_all(&serialized)?;
        Ok(())
    }

    fn parse_msg(input: &[u8]) -> Result<Self, String> {
        if input.len() < 4 {
            return Err(format!(
                "payload of {} bytes has no encapsulation header",
                input.len()
            ));
        }
        // first 4 bytes: representation identifier and options
        let parsed = match (input[0], input[1]) {
            (0x00, 0x01) => from_bytes::<Self, LittleEndian>(&input[4..]),
            (0x00, 0x00) => from_bytes::<Self, BigEndian>(&input[4..]),
            (a, b) => {
                return Err(format!(
                    "unsupported CDR representation {:02X}{:02X}",
                    a, b
                ))
            }
        };
        parsed
            .map(|(message, _consumed_byte_count)| message)
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
pub(crate) fn encode<T: RosMsg>(msg: &T) -> Vec<u8> {
    let mut buffer = Vec::new();
    msg.construct_msg(&mut buffer).unwrap();
    buffer
}
