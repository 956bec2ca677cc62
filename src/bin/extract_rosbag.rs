use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use stamp_sync_sdk::stamp_sync_sdk::cli_common::CommonArgs;
use stamp_sync_sdk::stamp_sync_sdk::config::ExtractionConfig;
use stamp_sync_sdk::stamp_sync_sdk::process_rosbag;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// YAML file listing the topics to extract
    #[arg(short, long)]
    config: Option<Utf8PathBuf>,

    /// Image topic saved as PNG files
    #[arg(long)]
    images: Vec<String>,

    /// Image topic saved as float32 .npy arrays
    #[arg(long)]
    depth: Vec<String>,

    /// sensor_msgs/TimeReference topic
    #[arg(long)]
    time_ref: Vec<String>,

    /// IMU topic, paired with the --temperature given at the same position
    #[arg(long)]
    imu: Vec<String>,

    #[arg(long)]
    temperature: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    args.common.verbosity.init_tracing();

    let mut config = match &args.config {
        Some(path) => ExtractionConfig::from_file(path)?,
        None => ExtractionConfig::default(),
    };
    config.merge_topics(
        args.images,
        args.depth,
        args.time_ref,
        args.imu,
        args.temperature,
    )?;

    process_rosbag(&args.common.input, &args.common.output, &config)?;
    Ok(())
}
