use camino::{Utf8Path, Utf8PathBuf};
use mcap::read::MessageStream;
use memmap::Mmap;
use tracing::debug;

use super::error::ExtractError;
use super::io::map_mcap;
use super::sensors::utils::{HasHeader, RosMsg};

/// One recorded message, detached from the log it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct BagMessage {
    pub topic: String,
    pub schema_name: String,
    pub log_time: u64,
    pub data: Vec<u8>,
}

impl BagMessage {
    /// Decodes the payload as `T`, refusing messages recorded under another
    /// schema or stamped before the epoch.
    pub fn decode<T: RosMsg + HasHeader>(&self) -> Result<T, ExtractError> {
        let expected = T::get_schema_name();
        if !schema_matches(&self.schema_name, expected) {
            return Err(ExtractError::UnexpectedSchema {
                topic: self.topic.clone(),
                expected,
                found: self.schema_name.clone(),
            });
        }
        let decode_error = |reason| ExtractError::Decode {
            topic: self.topic.clone(),
            schema: self.schema_name.clone(),
            reason,
        };
        let message = T::parse_msg(&self.data).map_err(decode_error)?;
        message.check_stamps().map_err(decode_error)?;
        Ok(message)
    }
}

impl<'a> From<mcap::Message<'a>> for BagMessage {
    fn from(message: mcap::Message<'a>) -> Self {
        BagMessage {
            topic: message.channel.topic.clone(),
            schema_name: message
                .channel
                .schema
                .as_ref()
                .map(|schema| schema.name.clone())
                .unwrap_or_default(),
            log_time: message.log_time,
            data: message.data.into_owned(),
        }
    }
}

/// `sensor_msgs/msg/Imu` also matches bags converted from ROS 1 that were
/// recorded as `sensor_msgs/Imu`.
fn schema_matches(found: &str, expected: &str) -> bool {
    found == expected || found == expected.replacen("/msg/", "/", 1)
}

pub type MessageIter<'a> = Box<dyn Iterator<Item = Result<BagMessage, ExtractError>> + 'a>;

/// A recorded sensor log that can be replayed topic by topic.
pub trait MessageSource {
    /// Messages published on any of `topics`, in log order.
    fn read_messages<'a>(&'a self, topics: &'a [String]) -> Result<MessageIter<'a>, ExtractError>;

    /// Number of messages `read_messages` would yield, when known upfront.
    fn message_count(&self, _topics: &[String]) -> Option<u64> {
        None
    }
}

/// A memory mapped MCAP file.
pub struct McapBag {
    mapped: Mmap,
    path: Utf8PathBuf,
}

impl McapBag {
    pub fn open<P: AsRef<Utf8Path>>(path: P) -> Result<Self, ExtractError> {
        let mapped = map_mcap(&path)?;
        debug!(path = %path.as_ref(), bytes = mapped.len(), "Mapped MCAP file");
        Ok(McapBag {
            mapped,
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl MessageSource for McapBag {
    fn read_messages<'a>(&'a self, topics: &'a [String]) -> Result<MessageIter<'a>, ExtractError> {
        let stream = MessageStream::new(&self.mapped)?;
        Ok(Box::new(stream.filter_map(move |message| match message {
            Ok(message) if topics.contains(&message.channel.topic) => {
                Some(Ok(BagMessage::from(message)))
            }
            Ok(_) => None,
            Err(e) => Some(Err(ExtractError::from(e))),
        })))
    }

    fn message_count(&self, topics: &[String]) -> Option<u64> {
        let summary = mcap::Summary::read(&self.mapped).ok()??;
        let stats = summary.stats?;
        let count = summary
            .channels
            .values()
            .filter(|channel| topics.contains(&channel.topic))
            .filter_map(|channel| stats.channel_message_counts.get(&channel.id))
            .sum();
        Some(count)
    }
}
