use std::path::{Component, Path};

use crate::SizingError;
use crate::preset::FilePreset;
use crate::size::size_label;

const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Turns a user supplied name into a single safe file name.
///
/// Rejects:
/// - Empty names
/// - Absolute paths
/// - Parent directory traversal (`..`)
/// - Names that sanitize down to nothing
///
/// Characters illegal on common filesystems become `_`, trailing dots and
/// spaces are trimmed, and Windows device names gain a `_` prefix.
pub fn sanitize_file_name(name: &str) -> Result<String, SizingError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SizingError::InvalidName("empty name".into()));
    }

    let path = Path::new(trimmed);
    if path.is_absolute() || trimmed.starts_with(['/', '\\']) {
        return Err(SizingError::InvalidName(format!(
            "absolute path not allowed: {name}"
        )));
    }
    for component in path.components() {
        if matches!(component, Component::ParentDir | Component::Prefix(_)) {
            return Err(SizingError::InvalidName(format!(
                "path traversal not allowed: {name}"
            )));
        }
    }
    if trimmed.split(['/', '\\']).any(|part| part == "..") {
        return Err(SizingError::InvalidName(format!(
            "path traversal not allowed: {name}"
        )));
    }

    let mut cleaned: String = trimmed
        .chars()
        .map(|c| {
            if c.is_control() || ILLEGAL_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    let kept = cleaned.trim_end_matches(['.', ' ']).len();
    cleaned.truncate(kept);
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_' || c == '.') {
        return Err(SizingError::InvalidName(format!(
            "name has no usable characters: {name}"
        )));
    }

    let stem = cleaned.split('.').next().unwrap_or_default();
    if RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(stem)) {
        cleaned.insert(0, '_');
    }

    Ok(cleaned)
}

/// Appends the preset's extension unless the name already ends with it.
pub fn ensure_extension(name: &str, preset: &FilePreset) -> String {
    let suffix = format!(".{}", preset.extension);
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    }
}

/// Default name for a generated file: `fillgen-<size>.<ext>`.
pub fn default_file_name(size: u64, preset: &FilePreset) -> String {
    format!("fillgen-{}.{}", size_label(size), preset.extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size::MIB;

    #[test]
    fn accepts_simple_name() {
        assert_eq!(sanitize_file_name("upload-test").unwrap(), "upload-test");
        assert_eq!(sanitize_file_name("  spaced name  ").unwrap(), "spaced name");
    }

    #[test]
    fn replaces_illegal_characters() {
        assert_eq!(sanitize_file_name("a:b*c?d").unwrap(), "a_b_c_d");
        assert_eq!(sanitize_file_name("tab\there").unwrap(), "tab_here");
        assert_eq!(sanitize_file_name("sub/dir").unwrap(), "sub_dir");
    }

    #[test]
    fn trims_trailing_dots() {
        assert_eq!(sanitize_file_name("report...").unwrap(), "report");
    }

    #[test]
    fn prefixes_reserved_names() {
        assert_eq!(sanitize_file_name("CON").unwrap(), "_CON");
        assert_eq!(sanitize_file_name("nul.txt").unwrap(), "_nul.txt");
        assert_eq!(sanitize_file_name("console").unwrap(), "console");
    }

    #[test]
    fn rejects_empty() {
        assert!(sanitize_file_name("").is_err());
        assert!(sanitize_file_name("   ").is_err());
        assert!(sanitize_file_name("...").is_err());
    }

    #[test]
    fn rejects_traversal() {
        assert!(sanitize_file_name("../escape").is_err());
        assert!(sanitize_file_name("sub/../../x").is_err());
        assert!(sanitize_file_name("..\\windows").is_err());
        assert!(sanitize_file_name("..").is_err());
    }

    #[test]
    fn rejects_absolute() {
        assert!(sanitize_file_name("/etc/passwd").is_err());
        assert!(sanitize_file_name("\\\\server\\share").is_err());
    }

    #[test]
    fn extension_added_once() {
        let pdf = FilePreset::from_name("pdf").unwrap();
        assert_eq!(ensure_extension("report", &pdf), "report.pdf");
        assert_eq!(ensure_extension("report.PDF", &pdf), "report.PDF");
        assert_eq!(ensure_extension("report.txt", &pdf), "report.txt.pdf");
    }

    #[test]
    fn default_name_includes_size() {
        let bin = FilePreset::binary();
        assert_eq!(default_file_name(10 * MIB, &bin), "fillgen-10MiB.bin");
    }
}
