use std::path::Path;

/// Parse a comma-separated extension list into lowercase suffixes without dots.
///
/// Empty entries and duplicates are dropped, order is preserved.
pub fn parse_extensions(types: &str) -> Vec<String> {
    let mut extensions: Vec<String> = Vec::new();
    for raw in types.split(',') {
        let ext = normalize_extension(raw);
        if !ext.is_empty() && !extensions.contains(&ext) {
            extensions.push(ext);
        }
    }
    extensions
}

/// Normalize file extension: trimmed, lowercase, no leading dot
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Check a filename against the accepted extensions, ignoring case
pub fn has_supported_extension(filename: &str, extensions: &[String]) -> bool {
    let lower = filename.to_lowercase();
    extensions
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}

/// Get the display name of a path (its final component)
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
