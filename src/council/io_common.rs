use std::path::{Path, PathBuf};

use crate::council::*;

pub fn source_path(root: &str, file_path: &str) -> String {
    let p: PathBuf = [root, file_path].iter().collect();
    p.as_path().display().to_string()
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Scorecard cells hold the name of the councillor followed by other details
/// on the next lines.
pub fn councillor_name(cell: &str) -> String {
    cell.split('\n').next().unwrap_or("").trim().to_string()
}

pub fn header_index(header: &[String], column: &str) -> CouncilResult<usize> {
    header
        .iter()
        .position(|h| h.trim() == column)
        .context(MissingColumnSnafu { column })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_paths() {
        assert_eq!(councillor_name("Paula Fletcher\nWard 14"), "Paula Fletcher");
        assert_eq!(councillor_name(" Josh Matlow "), "Josh Matlow");
        assert_eq!(
            simplify_file_name("/data/member-voting-record-2022-2026.csv"),
            "member-voting-record-2022-2026.csv"
        );
        assert_eq!(source_path("/data", "votes.csv"), "/data/votes.csv");
    }

    #[test]
    fn missing_header() {
        let header: Vec<String> = vec!["Vote".to_string(), " Result".to_string()];
        assert_eq!(header_index(&header, "Result").unwrap(), 1);
        assert!(matches!(
            header_index(&header, "Committee"),
            Err(CouncilError::MissingColumn { column }) if column == "Committee"
        ));
    }
}
