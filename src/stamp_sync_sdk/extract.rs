use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use super::error::ExtractError;
use super::io::{ensure_dir, make_topic_dirs};
use super::rosbag::MessageSource;
use super::sensors::common::CsvWriter;
use super::sensors::image::{Image, RosImage, NPY_EXTENSION, PNG_EXTENSION};
use super::sensors::imu::{Imu, ImuSample, IMU_FILE_NAME};
use super::sensors::temperature::Temperature;
use super::sensors::time_reference::{TimeRefRow, TimeReference, TIME_REF_FILE_NAME};
use super::sensors::utils::HasHeader;

/// Writes selected topics of a sensor log as per-topic files below `output`.
pub struct RosbagExtractor<'a, S: MessageSource> {
    bag: &'a S,
    output: Utf8PathBuf,
}

impl<'a, S: MessageSource> RosbagExtractor<'a, S> {
    pub fn new<P: AsRef<Utf8Path>>(bag: &'a S, output: P) -> Result<Self, ExtractError> {
        ensure_dir(&output)?;
        Ok(RosbagExtractor {
            bag,
            output: output.as_ref().to_path_buf(),
        })
    }

    pub fn output(&self) -> &Utf8Path {
        &self.output
    }

    fn progress_bar(&self, topics: &[String]) -> ProgressBar {
        match self.bag.message_count(topics) {
            Some(count) => ProgressBar::new(count),
            None => ProgressBar::no_length(),
        }
    }

    /// Saves every image of `topics` as `<stamp>.png`, or as a float32
    /// `<stamp>.npy` array when `use_depth` is set. Returns the number of
    /// files written.
    pub fn extract_images(&self, topics: &[String], use_depth: bool) -> Result<usize, ExtractError> {
        let topic_dirs = make_topic_dirs(&self.output, topics)?;
        let extension = match use_depth {
            true => NPY_EXTENSION,
            false => PNG_EXTENSION,
        };

        let pb = self.progress_bar(topics);
        pb.set_message(format!("Extracting {} images", extension));

        let mut written = 0;
        for message in self.bag.read_messages(topics)? {
            let message = message?;
            let ros_image: RosImage = message.decode()?;
            let image = Image::from_ros_image(&ros_image)?;

            let filename = format!("{}.{}", image.get_header().get_timestamp(), extension);
            let path = topic_dirs[&message.topic].join(&filename);
            match use_depth {
                true => image.save_npy(&path)?,
                false => image.save_png(&path)?,
            }
            info!(topic = %message.topic, "Wrote image {}", filename);
            written += 1;
            pb.inc(1);
        }
        pb.finish_and_clear();

        if written == 0 {
            warn!(?topics, "No image found on the requested topics");
        }
        Ok(written)
    }

    /// Writes `<topic dir>/time_ref.csv` for every topic. Returns the number of
    /// rows written per topic.
    pub fn extract_time_ref(
        &self,
        topics: &[String],
    ) -> Result<BTreeMap<String, usize>, ExtractError> {
        let topic_dirs = make_topic_dirs(&self.output, topics)?;
        let mut counts = BTreeMap::new();

        for topic in topics {
            let path = topic_dirs[topic].join(TIME_REF_FILE_NAME);
            let mut writer =
                CsvWriter::<TimeRefRow>::create(&path).map_err(|e| ExtractError::io(&path, e))?;

            let single = std::slice::from_ref(topic);
            for (index, message) in self.bag.read_messages(single)?.enumerate() {
                let time_ref: TimeReference = message?.decode()?;
                writer
                    .add(&TimeRefRow::new(index, &time_ref))
                    .map_err(|e| ExtractError::io(&path, e))?;
            }

            let rows = writer.finish().map_err(|e| ExtractError::io(&path, e))?;
            if rows == 0 {
                warn!(topic = %topic, "No time reference on topic");
            }
            info!(topic = %topic, rows, "Written time reference rows");
            counts.insert(topic.clone(), rows);
        }
        Ok(counts)
    }

    /// Joins each IMU topic with the temperature topic at the same position
    /// into `<imu topic dir>/imu.csv`. Returns the number of rows written per
    /// IMU topic.
    pub fn extract_imu(
        &self,
        topics: &[String],
        temp_topics: &[String],
    ) -> Result<BTreeMap<String, usize>, ExtractError> {
        if topics.len() != temp_topics.len() {
            return Err(ExtractError::TopicPairing {
                imu_topics: topics.len(),
                temperature_topics: temp_topics.len(),
            });
        }
        let topic_dirs = make_topic_dirs(&self.output, topics)?;
        let mut counts = BTreeMap::new();

        for (topic, temp_topic) in topics.iter().zip(temp_topics) {
            let path = topic_dirs[topic].join(IMU_FILE_NAME);
            let mut writer =
                CsvWriter::<ImuSample>::create(&path).map_err(|e| ExtractError::io(&path, e))?;

            let imu_msgs = self.bag.read_messages(std::slice::from_ref(topic))?;
            let temp_msgs = self.bag.read_messages(std::slice::from_ref(temp_topic))?;

            for (index, (imu_msg, temp_msg)) in imu_msgs.zip(temp_msgs).enumerate() {
                let imu: Imu = imu_msg?.decode()?;
                let temperature: Temperature = temp_msg?.decode()?;
                let sample = ImuSample::pair(&imu, &temperature).map_err(
                    |(imu_stamp, temperature_stamp)| ExtractError::StampMismatch {
                        imu_topic: topic.clone(),
                        temperature_topic: temp_topic.clone(),
                        index,
                        imu_stamp,
                        temperature_stamp,
                    },
                )?;
                writer.add(&sample).map_err(|e| ExtractError::io(&path, e))?;
            }

            let rows = writer.finish().map_err(|e| ExtractError::io(&path, e))?;
            debug!(path = %path, "Closed IMU file");
            info!("Written {} IMU rows for {}", rows, topic);
            counts.insert(topic.clone(), rows);
        }
        Ok(counts)
    }
}
