use clap::Parser;
use std::path::PathBuf;

use crate::settings::AppSettings;

/// Command-line arguments for the directory browser.
///
/// ```rust
/// use clap::Parser;
/// use purge::args::Args;
///
/// let args = Args::parse_from(["purge", "./some/path", "--sort-size"]);
/// assert!(args.target.ends_with("some/path"));
/// assert!(args.sort_size);
/// ```
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Browse a directory tree by size and delete what you no longer need"
)]
pub struct Args {
    #[arg(default_value = ".", value_hint = clap::ValueHint::DirPath)]
    pub target: PathBuf,

    #[arg(long, help = "Order entries largest first once every size is known")]
    pub sort_size: bool,

    #[arg(long, help = "Delete without asking for confirmation")]
    pub no_confirm: bool,

    #[arg(
        long,
        value_name = "N",
        help = "Worker threads used for sizing (default: 3/4 of the CPUs)"
    )]
    pub threads: Option<usize>,

    #[arg(long, value_name = "PATH", help = "Append diagnostics to this file")]
    pub log_file: Option<PathBuf>,

    #[arg(long, help = "Print the sized listing of TARGET and exit")]
    pub list: bool,

    #[arg(long, help = "Store the effective options as defaults in the settings file")]
    pub save_settings: bool,
}

impl Args {
    /// Overlays the command line on top of the persisted settings.
    ///
    /// ```rust
    /// use clap::Parser;
    /// use purge::args::Args;
    /// use purge::settings::AppSettings;
    ///
    /// let args = Args::parse_from(["purge", "--no-confirm", "--threads", "2"]);
    /// let merged = args.apply_to(AppSettings::default());
    /// assert!(!merged.confirm_delete);
    /// assert_eq!(merged.worker_threads, 2);
    /// ```
    pub fn apply_to(&self, mut settings: AppSettings) -> AppSettings {
        if self.sort_size {
            settings.sort_by_size = true;
        }
        if self.no_confirm {
            settings.confirm_delete = false;
        }
        if let Some(threads) = self.threads {
            settings.worker_threads = threads;
        }
        if let Some(path) = &self.log_file {
            settings.log_file = Some(path.clone());
        }
        settings
    }
}
