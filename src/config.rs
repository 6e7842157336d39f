use std::path::PathBuf;

use crate::args::Args;
use crate::filename::parse_extensions;

#[cfg(target_os = "macos")]
pub const DEFAULT_OPENER: &str = "open";
#[cfg(not(target_os = "macos"))]
pub const DEFAULT_OPENER: &str = "xdg-open";

/// Settings for one run, passed explicitly through the processing loop
#[derive(Debug, Clone)]
pub struct Config {
    pub directory: PathBuf,
    pub field: String,
    pub extensions: Vec<String>,
    pub overwrite: bool,
    pub debug: bool,
    pub opener: String,
}

impl Config {
    /// Build a config from parsed command line arguments
    pub fn from_args(args: Args) -> Self {
        let directory = args.directory.unwrap_or_else(|| PathBuf::from("."));
        let field = args.field.trim().to_string();

        Config {
            directory,
            field,
            extensions: parse_extensions(&args.types),
            overwrite: args.overwrite,
            debug: args.debug,
            opener: args.opener.unwrap_or_else(|| DEFAULT_OPENER.to_string()),
        }
    }

    /// Accepted extensions as they are shown to the operator (".jpg, .png")
    pub fn extensions_label(&self) -> String {
        self.extensions
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_default_args() {
        let config = Config::from_args(Args::try_parse_from(["describe_media"]).unwrap());
        assert_eq!(config.directory, PathBuf::from("."));
        assert_eq!(config.field, "Description");
        assert_eq!(config.extensions, vec!["jpg", "jpeg", "png", "mp4", "mov", "avi"]);
        assert!(!config.overwrite);
        assert!(!config.debug);
        assert_eq!(config.opener, DEFAULT_OPENER);
    }

    #[test]
    fn test_debug_flag_reaches_config() {
        let args = Args::try_parse_from(["describe_media", "--debug"]).unwrap();
        assert!(Config::from_args(args).debug);
    }

    #[test]
    fn test_types_are_normalized() {
        let args =
            Args::try_parse_from(["describe_media", "--types", "JPG,.Png,,jpg"]).unwrap();
        let config = Config::from_args(args);
        assert_eq!(config.extensions, vec!["jpg", "png"]);
        assert_eq!(config.extensions_label(), ".jpg, .png");
    }

    #[test]
    fn test_opener_override() {
        let args = Args::try_parse_from(["describe_media", "--opener", "feh"]).unwrap();
        assert_eq!(Config::from_args(args).opener, "feh");
    }
}
