use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_FIELD: &str = "Description";
pub const DEFAULT_TYPES: &str = "jpg,jpeg,png,mp4,mov,avi";

/// Preview files and add EXIF descriptions via exiftool.
///
/// Each matching file is opened in the system previewer, then you are asked
/// for a description. Press Enter without typing to skip a file.
#[derive(Debug, Parser)]
#[command(name = "describe_media", version)]
pub struct Args {
    /// Directory to scan for files (default: current dir)
    #[arg(value_name = "DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// EXIF field to update (Description, Title, Comment, XPComment, ...)
    #[arg(long, default_value = DEFAULT_FIELD)]
    pub field: String,

    /// Comma-separated list of file extensions, without dots
    #[arg(long, default_value = DEFAULT_TYPES)]
    pub types: String,

    /// Edit even if the file already has a value for the field
    #[arg(long)]
    pub overwrite: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Command used to preview files (default: `open` on macOS, `xdg-open` elsewhere)
    #[arg(long, value_name = "CMD")]
    pub opener: Option<String>,
}
