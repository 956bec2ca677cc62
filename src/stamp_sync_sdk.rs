pub mod align;
pub mod cli_common;
pub mod config;
pub mod error;
pub mod extract;
pub mod io;
pub mod reference;
pub mod rosbag;
pub mod sensors;

use anyhow::Result;
use camino::Utf8Path;
use tracing::info;

use config::ExtractionConfig;
use extract::RosbagExtractor;
use rosbag::McapBag;

/// Runs every extraction listed in `config` against the MCAP file (or folder
/// holding one) at `input`, writing per-topic outputs below `output`.
pub fn process_rosbag<P: AsRef<Utf8Path>>(
    input: P,
    output: P,
    config: &ExtractionConfig,
) -> Result<()> {
    // check that the input is either .mcap or folder/name.mcap
    let input_path = io::check_mcap_input_path(input)?;
    config.validate()?;

    let bag = McapBag::open(&input_path)?;
    let extractor = RosbagExtractor::new(&bag, output.as_ref())?;

    if !config.image_topics.is_empty() {
        let written = extractor.extract_images(&config.image_topics, false)?;
        info!(images = written, "Raster extraction finished");
    }
    if !config.depth_topics.is_empty() {
        let written = extractor.extract_images(&config.depth_topics, true)?;
        info!(arrays = written, "Depth extraction finished");
    }
    if !config.time_ref_topics.is_empty() {
        extractor.extract_time_ref(&config.time_ref_topics)?;
    }
    if !config.imu.is_empty() {
        let (imu_topics, temp_topics) = config.imu_topic_lists();
        extractor.extract_imu(&imu_topics, &temp_topics)?;
    }

    Ok(())
}
