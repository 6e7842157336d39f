use exiftool::ExifTool;
use serde_json::Value;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use tracing::{debug, warn};

use crate::error::{DescribeError, Result};

const EXIFTOOL_PROGRAM: &str = "exiftool";

/// The external operations the describe loop depends on
pub trait MetadataTool {
    /// Current value of `field`, or an empty string when the file has none
    fn read_field(&mut self, path: &Path, field: &str) -> Result<String>;

    /// Set `field` to `value`, replacing the file in place
    fn write_field(&mut self, path: &Path, field: &str, value: &str) -> Result<()>;

    /// Show the file to the operator without waiting for the viewer to close
    fn open_file(&mut self, path: &Path) -> Result<()>;
}

/// ExifTool-backed implementation.
///
/// Reads go through one long-lived exiftool process, started on first use.
/// Writes run a fresh `exiftool ... -overwrite_original` so the exit status
/// and stderr can be reported per file.
pub struct ExifToolBackend {
    reader: Option<ExifTool>,
    program: String,
    opener: String,
    previews: Vec<Child>,
}

impl ExifToolBackend {
    pub fn new(opener: impl Into<String>) -> Self {
        ExifToolBackend {
            reader: None,
            program: EXIFTOOL_PROGRAM.to_string(),
            opener: opener.into(),
            previews: Vec::new(),
        }
    }

    /// Use a different executable for writes
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn reader(&mut self) -> Result<&mut ExifTool> {
        if self.reader.is_none() {
            let tool = ExifTool::new().map_err(|e| {
                DescribeError::ExifTool(format!("could not start exiftool: {}", e))
            })?;
            self.reader = Some(tool);
        }
        self.reader
            .as_mut()
            .ok_or_else(|| DescribeError::ExifTool("exiftool is not running".to_string()))
    }

    /// Reap previewers that have already exited
    fn reap_previews(&mut self) {
        self.previews
            .retain_mut(|child| matches!(child.try_wait(), Ok(None)));
    }
}

impl MetadataTool for ExifToolBackend {
    fn read_field(&mut self, path: &Path, field: &str) -> Result<String> {
        let path_str = path
            .to_str()
            .ok_or_else(|| {
                DescribeError::ExifTool(format!("path is not valid UTF-8: {}", path.display()))
            })?;
        let tag_arg = format!("-{}", field);
        let args = vec![tag_arg.as_str(), path_str];

        let output = self
            .reader()?
            .json_execute(&args)
            .map_err(|e| DescribeError::ExifTool(e.to_string()))?;

        let value = extract_field_value(&output, field);
        debug!(file = %path.display(), field, existing = %value, "read field");
        Ok(value)
    }

    fn write_field(&mut self, path: &Path, field: &str, value: &str) -> Result<()> {
        let assignment = format!("-{}={}", field, value);
        debug!(
            "Running: {} {} -overwrite_original {}",
            self.program,
            assignment,
            path.display()
        );

        let output = Command::new(&self.program)
            .arg(&assignment)
            .arg("-overwrite_original")
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| DescribeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        // Check stderr, fall back to the exit status

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.is_empty() {
            Err(DescribeError::ExifTool(format!("exited with {}", output.status)))
        } else {
            Err(DescribeError::ExifTool(stderr))
        }
    }

    fn open_file(&mut self, path: &Path) -> Result<()> {
        self.reap_previews();

        let child = Command::new(&self.opener)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| DescribeError::Spawn {
                program: self.opener.clone(),
                source,
            })?;
        self.previews.push(child);
        Ok(())
    }
}

impl Drop for ExifToolBackend {
    fn drop(&mut self) {
        self.reap_previews();
        if !self.previews.is_empty() {
            warn!("{} previewer process(es) still running", self.previews.len());
        }
    }
}

/// Pull the bare value of `field` out of exiftool's JSON output.
///
/// Tag names come back without their group prefix, so `XMP:Title` is looked
/// up as `Title`. A missing tag yields an empty string.
pub fn extract_field_value(output: &Value, field: &str) -> String {
    let tag = field.rsplit(':').next().unwrap_or(field);

    let record = match output {
        Value::Array(items) => items.first(),
        other => Some(other),
    };

    record
        .and_then(Value::as_object)
        .and_then(|map| {
            map.iter()
                .find(|(key, _)| key.as_str() != "SourceFile" && key.eq_ignore_ascii_case(tag))
                .map(|(_, value)| value_to_text(value))
        })
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_present_field() {
        let output = json!([{ "SourceFile": "a.jpg", "Description": "sunset " }]);
        assert_eq!(extract_field_value(&output, "Description"), "sunset");
    }

    #[test]
    fn test_extract_missing_field() {
        let output = json!([{ "SourceFile": "a.jpg" }]);
        assert_eq!(extract_field_value(&output, "Description"), "");
        assert_eq!(extract_field_value(&json!([]), "Description"), "");
    }

    #[test]
    fn test_extract_ignores_case_and_group() {
        let output = json!([{ "SourceFile": "a.jpg", "Title": "Beach" }]);
        assert_eq!(extract_field_value(&output, "title"), "Beach");
        assert_eq!(extract_field_value(&output, "XMP:Title"), "Beach");
    }

    #[test]
    fn test_extract_non_string_values() {
        let output = json!([{ "SourceFile": "a.jpg", "Rating": 5, "Subject": ["sea", "sky"] }]);
        assert_eq!(extract_field_value(&output, "Rating"), "5");
        assert_eq!(extract_field_value(&output, "Subject"), "sea, sky");
    }

    #[test]
    fn test_source_file_is_never_a_value() {
        let output = json!([{ "SourceFile": "a.jpg" }]);
        assert_eq!(extract_field_value(&output, "SourceFile"), "");
    }

    #[cfg(unix)]
    fn fake_exiftool(dir: &Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-exiftool");
        std::fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[test]
    fn test_write_passes_field_assignment() {
        let dir = tempfile::TempDir::new().unwrap();
        let argv_file = dir.path().join("argv.txt");
        let program = fake_exiftool(
            dir.path(),
            &format!("printf '%s\\n' \"$@\" > '{}'", argv_file.display()),
        );
        let photo = dir.path().join("a b.jpg");

        let mut backend = ExifToolBackend::new("true").with_program(program);
        backend
            .write_field(&photo, "Description", "sunset, over the bay")
            .unwrap();

        let argv = std::fs::read_to_string(&argv_file).unwrap();
        let args: Vec<&str> = argv.lines().collect();
        assert_eq!(
            args,
            vec![
                "-Description=sunset, over the bay",
                "-overwrite_original",
                photo.to_str().unwrap(),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_write_failure_reports_stderr() {
        let dir = tempfile::TempDir::new().unwrap();
        let program = fake_exiftool(
            dir.path(),
            "echo '  Error: File not found - a.jpg  ' >&2\nexit 1",
        );

        let mut backend = ExifToolBackend::new("true").with_program(program);
        let err = backend
            .write_field(Path::new("a.jpg"), "Description", "sunset")
            .unwrap_err();
        assert_eq!(err.to_string(), "exiftool failed: Error: File not found - a.jpg");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_failure_without_stderr_reports_status() {
        let dir = tempfile::TempDir::new().unwrap();
        let program = fake_exiftool(dir.path(), "exit 3");

        let mut backend = ExifToolBackend::new("true").with_program(program);
        let err = backend
            .write_field(Path::new("a.jpg"), "Description", "sunset")
            .unwrap_err();
        assert!(matches!(err, DescribeError::ExifTool(_)));
        assert!(err.to_string().contains("exit status: 3"), "{}", err);
    }

    #[test]
    fn test_write_with_missing_program_is_spawn_error() {
        let mut backend =
            ExifToolBackend::new("true").with_program("definitely-not-a-real-exiftool");
        let err = backend
            .write_field(Path::new("a.jpg"), "Description", "sunset")
            .unwrap_err();
        assert!(matches!(err, DescribeError::Spawn { .. }));
    }

    #[test]
    fn test_open_missing_previewer_is_an_error() {
        let mut backend = ExifToolBackend::new("definitely-not-a-real-previewer-binary");
        let err = backend.open_file(Path::new("a.jpg")).unwrap_err();
        assert!(matches!(err, DescribeError::Spawn { .. }));
    }
}
