//! Preview media files one at a time and write an operator-supplied
//! description into each file's metadata with exiftool.

pub mod args;
pub mod config;
pub mod console;
pub mod error;
pub mod filename;
pub mod metadata;
pub mod processor;
pub mod prompt;
pub mod scan;
