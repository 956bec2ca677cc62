use std::fs;

use anyhow::{bail, Context, Result};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use super::error::ExtractError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImuTopicPair {
    pub topic: String,
    pub temperature_topic: String,
}

/// Topics to extract from a sensor log.
///
/// ```yaml
/// image_topics: [/camera/left/image_raw]
/// depth_topics: [/camera/depth]
/// time_ref_topics: [/gps/time_reference]
/// imu:
///   - topic: /imu/data
///     temperature_topic: /imu/temperature
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionConfig {
    pub image_topics: Vec<String>,
    pub depth_topics: Vec<String>,
    pub time_ref_topics: Vec<String>,
    pub imu: Vec<ImuTopicPair>,
}

impl ExtractionConfig {
    pub fn from_file<P: AsRef<Utf8Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Cannot read config {}", path))?;
        let config: ExtractionConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid extraction config {}", path))?;
        Ok(config)
    }

    /// Appends topics given on the command line. IMU and temperature topics are
    /// paired by position.
    pub fn merge_topics(
        &mut self,
        images: Vec<String>,
        depth: Vec<String>,
        time_ref: Vec<String>,
        imu: Vec<String>,
        temperature: Vec<String>,
    ) -> Result<(), ExtractError> {
        if imu.len() != temperature.len() {
            return Err(ExtractError::TopicPairing {
                imu_topics: imu.len(),
                temperature_topics: temperature.len(),
            });
        }
        self.image_topics.extend(images);
        self.depth_topics.extend(depth);
        self.time_ref_topics.extend(time_ref);
        self.imu.extend(
            imu.into_iter()
                .zip(temperature)
                .map(|(topic, temperature_topic)| ImuTopicPair {
                    topic,
                    temperature_topic,
                }),
        );
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.image_topics.is_empty()
            && self.depth_topics.is_empty()
            && self.time_ref_topics.is_empty()
            && self.imu.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            bail!("Nothing to extract: no image, depth, time reference or IMU topic given");
        }
        let all_topics = self
            .image_topics
            .iter()
            .chain(&self.depth_topics)
            .chain(&self.time_ref_topics)
            .chain(self.imu.iter().flat_map(|p| [&p.topic, &p.temperature_topic]));
        for topic in all_topics {
            if topic.trim().is_empty() {
                bail!("Topic names cannot be empty");
            }
        }
        Ok(())
    }

    pub fn imu_topic_lists(&self) -> (Vec<String>, Vec<String>) {
        self.imu
            .iter()
            .map(|pair| (pair.topic.clone(), pair.temperature_topic.clone()))
            .unzip()
    }
}
