use serde::Serialize;

use crate::SizingError;

/// Named file type preset.
///
/// A preset only picks the extension. File content is the same filler ramp
/// for every preset; no header or container format is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilePreset {
    pub name: &'static str,
    pub extension: &'static str,
    pub description: &'static str,
}

/// All built-in presets, in display order.
pub const PRESETS: &[FilePreset] = &[
    FilePreset {
        name: "bin",
        extension: "bin",
        description: "raw binary",
    },
    FilePreset {
        name: "txt",
        extension: "txt",
        description: "plain text",
    },
    FilePreset {
        name: "csv",
        extension: "csv",
        description: "comma-separated values",
    },
    FilePreset {
        name: "json",
        extension: "json",
        description: "JSON document",
    },
    FilePreset {
        name: "pdf",
        extension: "pdf",
        description: "PDF document",
    },
    FilePreset {
        name: "zip",
        extension: "zip",
        description: "ZIP archive",
    },
    FilePreset {
        name: "tar",
        extension: "tar",
        description: "tar archive",
    },
    FilePreset {
        name: "jpg",
        extension: "jpg",
        description: "JPEG image",
    },
    FilePreset {
        name: "png",
        extension: "png",
        description: "PNG image",
    },
    FilePreset {
        name: "mp4",
        extension: "mp4",
        description: "MP4 video",
    },
    FilePreset {
        name: "iso",
        extension: "iso",
        description: "disc image",
    },
    FilePreset {
        name: "img",
        extension: "img",
        description: "disk image",
    },
];

impl FilePreset {
    /// Looks up a preset by name; case-insensitive, leading dot allowed.
    pub fn from_name(name: &str) -> Result<Self, SizingError> {
        let key = name.trim().trim_start_matches('.');
        PRESETS
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(key))
            .copied()
            .ok_or_else(|| SizingError::UnknownPreset(name.to_string()))
    }

    /// The `bin` preset.
    pub fn binary() -> Self {
        PRESETS[0]
    }
}

impl Default for FilePreset {
    fn default() -> Self {
        Self::binary()
    }
}
