use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use stamp_sync_sdk::stamp_sync_sdk::align::{
    align_by_delta_with, align_by_ref_with, AlignOptions, AlignmentReport,
};
use stamp_sync_sdk::stamp_sync_sdk::cli_common::{Verbosity, TARGET_DIR_HELP};
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    mode: Mode,

    #[command(flatten)]
    verbosity: Verbosity,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Match one line of the reference log with the earliest image
    ByRef {
        /// Reference log, `sequence,timestamp` per line
        #[arg(short, long)]
        time_ref: Utf8PathBuf,

        #[arg(short = 'd', long, help = TARGET_DIR_HELP.as_str())]
        target_dir: Utf8PathBuf,

        /// 1-based line of the reference log to align with
        #[arg(short, long, default_value_t = 1)]
        ref_seq: usize,

        /// Align again even if the directory was already aligned
        #[arg(short, long)]
        force: bool,
    },
    /// Name frames extracted from a video and shift them by the logged delta
    ByDelta {
        /// Reference log, `sequence,reference,local` on the first line
        #[arg(short, long)]
        time_ref: Utf8PathBuf,

        /// Directory holding the frame-N.png files
        #[arg(short = 'd', long)]
        target_dir: Utf8PathBuf,

        /// Video the frames were extracted from
        #[arg(long)]
        video: Utf8PathBuf,

        /// Align again even if the directory was already aligned
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    args.verbosity.init_tracing();

    let report: AlignmentReport = match args.mode {
        Mode::ByRef {
            time_ref,
            target_dir,
            ref_seq,
            force,
        } => align_by_ref_with(&time_ref, &target_dir, ref_seq, &AlignOptions { force })
            .with_context(|| format!("Failed to align {}", target_dir))?,
        Mode::ByDelta {
            time_ref,
            target_dir,
            video,
            force,
        } => align_by_delta_with(&time_ref, &target_dir, &video, &AlignOptions { force })
            .with_context(|| format!("Failed to align {}", target_dir))?,
    };

    info!(
        offset = report.offset,
        files = report.records.len(),
        "Alignment done"
    );
    Ok(())
}
