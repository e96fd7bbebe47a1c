//! MIME type classification for Drive files

use serde::{Deserialize, Serialize};

/// MIME type Drive uses to mark folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Legacy and non-standard video MIME strings that do not follow the
/// `video/` prefix convention reliably across uploaders.
const VIDEO_MIME_TYPES: &[&str] = &[
    "video/mp4",
    "video/avi",
    "video/mkv",
    "video/mov",
    "video/wmv",
    "video/flv",
    "video/webm",
    "video/quicktime",
    "video/x-msvideo",
    "video/x-matroska",
    "video/x-ms-wmv",
];

/// PDF MIME variants seen in the wild besides `application/pdf`
const PDF_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/x-pdf",
    "application/acrobat",
    "applications/vnd.pdf",
    "text/pdf",
    "text/x-pdf",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FileKind {
    #[serde(rename = "video")]
    Video,
    #[serde(rename = "pdf")]
    Pdf,
    #[serde(rename = "other")]
    Other,
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::Video => write!(f, "video"),
            FileKind::Pdf => write!(f, "pdf"),
            FileKind::Other => write!(f, "other"),
        }
    }
}

/// Whether a MIME type denotes a video
pub fn is_video(mime_type: &str) -> bool {
    mime_type.starts_with("video/") || VIDEO_MIME_TYPES.contains(&mime_type)
}

/// Whether a MIME type denotes a PDF
pub fn is_pdf(mime_type: &str) -> bool {
    mime_type == "application/pdf" || PDF_MIME_TYPES.contains(&mime_type)
}

/// Map a MIME type string to a file kind
pub fn classify(mime_type: &str) -> FileKind {
    if is_video(mime_type) {
        FileKind::Video
    } else if is_pdf(mime_type) {
        FileKind::Pdf
    } else {
        FileKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_prefix_always_classifies_as_video() {
        assert_eq!(classify("video/mp4"), FileKind::Video);
        assert_eq!(classify("video/x-some-new-container"), FileKind::Video);
        assert_eq!(classify("video/"), FileKind::Video);
    }

    #[test]
    fn legacy_video_mime_types_classify_as_video() {
        for mime in ["video/x-msvideo", "video/x-matroska", "video/x-ms-wmv"] {
            assert_eq!(classify(mime), FileKind::Video, "{mime}");
        }
    }

    #[test]
    fn pdf_variants_classify_as_pdf() {
        assert_eq!(classify("application/pdf"), FileKind::Pdf);
        assert_eq!(classify("application/x-pdf"), FileKind::Pdf);
        assert_eq!(classify("applications/vnd.pdf"), FileKind::Pdf);
        assert_eq!(classify("text/x-pdf"), FileKind::Pdf);
    }

    #[test]
    fn everything_else_is_other() {
        assert_eq!(classify("image/png"), FileKind::Other);
        assert_eq!(classify("application/zip"), FileKind::Other);
        assert_eq!(classify(FOLDER_MIME_TYPE), FileKind::Other);
        assert_eq!(classify(""), FileKind::Other);
    }

    #[test]
    fn file_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&FileKind::Video).unwrap(), "\"video\"");
        assert_eq!(serde_json::to_string(&FileKind::Pdf).unwrap(), "\"pdf\"");
    }
}
