//! JSON report writer.

use crate::output::schema::Report;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Write a report to a JSON file, creating parent directories if
/// needed.
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - path is empty or a directory
pub fn write_report(report: &Report, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    validate_output_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.exists() && !parent.as_os_str().is_empty() {
            debug!("creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!("cannot create directory {}: {}", parent.display(), e))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report).map_err(OutputError::SerializationFailed)?;

    info!("report written to: {}", output_path.display());
    Ok(())
}

/// Read a report back from a JSON file.
pub fn read_report(input_path: impl AsRef<Path>) -> Result<Report, OutputError> {
    let input_path = input_path.as_ref();

    debug!("reading report from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let report: Report = serde_json::from_reader(file).map_err(OutputError::SerializationFailed)?;
    Ok(report)
}

fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::ModuleRow;
    use tempfile::NamedTempFile;

    fn sample_report() -> Report {
        let rows = vec![ModuleRow { module: "vmxnet3".to_string(), count: 2, pages: 2 }];
        Report::from_modules("dump.txt", &rows)
    }

    #[test]
    fn test_write_and_read_report() {
        let report = sample_report();
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        write_report(&report, path).unwrap();
        let loaded = read_report(path).unwrap();

        assert_eq!(loaded.version, report.version);
        assert_eq!(loaded.report, "modules");
        assert_eq!(loaded.rows.len(), 1);
        assert_eq!(loaded.rows[0].kbytes, 8);
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("nested/dirs/report.json");

        write_report(&sample_report(), &nested).unwrap();
        assert!(nested.exists());
    }

    #[test]
    fn test_empty_path_rejected() {
        let result = write_report(&sample_report(), Path::new(""));
        assert!(result.is_err());
    }

    #[test]
    fn test_directory_path_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = write_report(&sample_report(), temp_dir.path());
        assert!(result.is_err());
    }
}
