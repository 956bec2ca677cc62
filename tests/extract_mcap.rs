use std::collections::BTreeMap;
use std::fs;
use std::io::BufWriter;

use camino::{Utf8Path, Utf8PathBuf};
use stamp_sync_sdk::stamp_sync_sdk::config::{ExtractionConfig, ImuTopicPair};
use stamp_sync_sdk::stamp_sync_sdk::process_rosbag;
use stamp_sync_sdk::stamp_sync_sdk::rosbag::{McapBag, MessageSource};
use stamp_sync_sdk::stamp_sync_sdk::sensors::basic::{Time, Vector3};
use stamp_sync_sdk::stamp_sync_sdk::sensors::header::Header;
use stamp_sync_sdk::stamp_sync_sdk::sensors::image::RosImage;
use stamp_sync_sdk::stamp_sync_sdk::sensors::imu::Imu;
use stamp_sync_sdk::stamp_sync_sdk::sensors::temperature::Temperature;
use stamp_sync_sdk::stamp_sync_sdk::sensors::time_reference::TimeReference;
use stamp_sync_sdk::stamp_sync_sdk::sensors::utils::RosMsg;

const TIME_REF_TOPIC: &str = "/gps/time_reference";
const IMU_TOPIC: &str = "/imu/data";
const TEMP_TOPIC: &str = "/imu/temperature";
const CAMERA_TOPIC: &str = "/camera/image_raw";

struct BagWriter {
    writer: mcap::Writer<BufWriter<fs::File>>,
    channels: BTreeMap<String, u16>,
    sequence: u32,
}

impl BagWriter {
    fn create(path: &Utf8Path) -> Self {
        let writer = mcap::WriteOptions::new()
            .profile("ros2")
            .create(BufWriter::new(fs::File::create(path).unwrap()))
            .unwrap();
        BagWriter {
            writer,
            channels: BTreeMap::new(),
            sequence: 0,
        }
    }

    fn write<T: RosMsg>(&mut self, topic: &str, stamp: u64, msg: &T) {
        let channel_id = match self.channels.get(topic) {
            Some(id) => *id,
            None => {
                let schema_id = self
                    .writer
                    .add_schema(T::get_schema_name(), "ros2msg", T::get_schema_def())
                    .unwrap();
                let id = self
                    .writer
                    .add_channel(schema_id, topic, "cdr", &BTreeMap::new())
                    .unwrap();
                self.channels.insert(topic.to_string(), id);
                id
            }
        };
        let mut buffer = Vec::new();
        msg.construct_msg(&mut buffer).unwrap();
        self.writer
            .write_to_known_channel(
                &mcap::records::MessageHeader {
                    channel_id,
                    sequence: self.sequence,
                    log_time: stamp,
                    publish_time: stamp,
                },
                &buffer,
            )
            .unwrap();
        self.sequence += 1;
    }

    fn finish(mut self) {
        self.writer.finish().unwrap();
    }
}

fn write_bag(dir: &Utf8Path) -> Utf8PathBuf {
    let path = dir.join("run.mcap");
    let mut bag = BagWriter::create(&path);

    for (i, stamp) in [1_000_000_000u64, 1_100_000_000, 1_200_000_000]
        .into_iter()
        .enumerate()
    {
        bag.write(
            TIME_REF_TOPIC,
            stamp,
            &TimeReference {
                header: Header::new(stamp, "gps"),
                time_ref: Time::from_nanos(stamp + 37_000_000_000),
                source: "gps".to_string(),
            },
        );
        bag.write(
            IMU_TOPIC,
            stamp,
            &Imu::new(
                Header::new(stamp, "imu_link"),
                Vector3::new(0.0, 0.0, 0.5 * i as f64),
                Vector3::new(0.0, 0.0, 9.81),
            ),
        );
        bag.write(
            TEMP_TOPIC,
            stamp,
            &Temperature {
                header: Header::new(stamp, "imu_link"),
                temperature: 25.0 + i as f64,
                variance: 0.0,
            },
        );
    }
    bag.write(
        CAMERA_TOPIC,
        1_050_000_000,
        &RosImage {
            header: Header::new(1_050_000_000, "camera"),
            height: 2,
            width: 2,
            encoding: "mono16".to_string(),
            is_bigendian: 0,
            step: 4,
            data: vec![0, 0, 255, 0, 0, 1, 255, 255],
        },
    );
    bag.finish();
    path
}

fn utf8_tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, path)
}

#[test]
fn mcap_summary_counts_messages() {
    let (_guard, root) = utf8_tempdir();
    let path = write_bag(&root);
    let bag = McapBag::open(&path).unwrap();

    let topics = vec![IMU_TOPIC.to_string(), TEMP_TOPIC.to_string()];
    assert_eq!(bag.message_count(&topics), Some(6));
    let read: Vec<_> = bag
        .read_messages(&topics)
        .unwrap()
        .map(|m| m.unwrap().topic)
        .collect();
    assert_eq!(
        read,
        vec![IMU_TOPIC, TEMP_TOPIC, IMU_TOPIC, TEMP_TOPIC, IMU_TOPIC, TEMP_TOPIC]
    );
}

#[test]
fn extracts_every_output_from_an_mcap_folder() {
    let (_guard, root) = utf8_tempdir();
    let bag_dir = root.join("bag");
    fs::create_dir(&bag_dir).unwrap();
    write_bag(&bag_dir);
    let output = root.join("out");

    let config = ExtractionConfig {
        image_topics: vec![CAMERA_TOPIC.to_string()],
        time_ref_topics: vec![TIME_REF_TOPIC.to_string()],
        imu: vec![ImuTopicPair {
            topic: IMU_TOPIC.to_string(),
            temperature_topic: TEMP_TOPIC.to_string(),
        }],
        ..Default::default()
    };
    process_rosbag(&bag_dir, &output, &config).unwrap();

    let time_ref = fs::read_to_string(output.join("_gps_time_reference/time_ref.csv")).unwrap();
    assert_eq!(
        time_ref,
        "0,1000000000,38000000000\n1,1100000000,38100000000\n2,1200000000,38200000000\n"
    );

    let imu = fs::read_to_string(output.join("_imu_data/imu.csv")).unwrap();
    assert_eq!(
        imu,
        "1000000000,0.0,0.0,0.0,0.0,0.0,9.81,25.0\n1100000000,0.0,0.0,0.5,0.0,0.0,9.81,26.0\n1200000000,0.0,0.0,1.0,0.0,0.0,9.81,27.0\n"
    );

    let png = output.join("_camera_image_raw/1050000000.png");
    let image = image::open(&png).unwrap().to_luma16();
    assert_eq!(image.dimensions(), (2, 2));
    assert_eq!(image.get_pixel(1, 0).0, [255]);
    assert_eq!(image.get_pixel(1, 1).0, [65535]);
}
