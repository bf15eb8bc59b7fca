use std::time::Duration;

pub const CONFIG_DIR_NAME: &str = ".course_organizer";
pub const DIRECTORIES_FILE: &str = "directories.json";
pub const WATCHED_FILE: &str = "watched.json";
pub const EXCLUSIONS_FILE: &str = "exclusions.json";

/// Subtitle formats that accompany lecture videos. They are listed next to
/// the video they belong to, so they are excluded from enumeration and from
/// the progress denominator.
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &[
    ".srt", // SubRip
    ".vtt", // WebVTT
    ".sub", // SubViewer
    ".smi", // SAMI
    ".ssa", // SubStation Alpha
    ".ass", // Advanced SubStation Alpha
    ".idx", // VobSub index
    ".mks", // Matroska subtitles
];

pub const UI_STATUS_MESSAGE_DURATION: Duration = Duration::from_secs(5);
