use camino::Utf8PathBuf;
use clap::Args;
use std::sync::LazyLock;
use tracing_subscriber::EnvFilter;

use super::align::ALLOWED_EXTENSIONS;

pub static TARGET_DIR_HELP: LazyLock<String> = LazyLock::new(|| {
    format!(
        "Directory of timestamp-named images. Only files ending in {} are renamed",
        ALLOWED_EXTENSIONS
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(", ")
    )
});

#[derive(Args, Debug)]
pub struct CommonArgs {
    /// MCAP file, or a folder containing one
    #[arg(short, long)]
    pub input: Utf8PathBuf,

    /// Output root, one folder per topic is created below it
    #[arg(short, long)]
    pub output: Utf8PathBuf,

    #[command(flatten)]
    pub verbosity: Verbosity,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct Verbosity {
    /// Log every file written or renamed
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Verbosity {
    /// Installs the fmt subscriber. `RUST_LOG` wins over `--verbose`.
    pub fn init_tracing(&self) {
        let default_level = match self.verbose {
            true => "debug",
            false => "info",
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    }
}
