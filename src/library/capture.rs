//! Capture date of a photo
//!
//! Taken from EXIF when the file carries it, otherwise from the file's
//! modification time.

use chrono::NaiveDateTime;
use exif::{In, Reader, Tag};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, trace};

/// EXIF tags to try for date extraction, in priority order
const DATE_TAGS: &[Tag] = &[Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime];

/// Where a capture date came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSource {
    Exif,
    FileSystem,
    Now,
}

/// Best known capture date of `path`
pub fn capture_date(path: &Path) -> (NaiveDateTime, CaptureSource) {
    if let Some(taken) = exif_date(path) {
        return (taken, CaptureSource::Exif);
    }

    match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => {
            let datetime: chrono::DateTime<chrono::Utc> = modified.into();
            debug!(?path, "No EXIF date, using modification time");
            (datetime.naive_utc(), CaptureSource::FileSystem)
        }
        Err(_) => (chrono::Utc::now().naive_utc(), CaptureSource::Now),
    }
}

fn exif_date(path: &Path) -> Option<NaiveDateTime> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = Reader::new().read_from_container(&mut reader).ok()?;

    DATE_TAGS.iter().find_map(|tag| {
        let field = exif.get_field(*tag, In::PRIMARY)?;
        let parsed = parse_exif_datetime(&field.display_value().to_string());
        if parsed.is_some() {
            trace!(?path, ?tag, "Found EXIF date");
        }
        parsed
    })
}

/// Parse "YYYY:MM:DD HH:MM:SS" and a few looser variants
fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_matches('"');

    [
        "%Y:%m:%d %H:%M:%S",
        "%Y:%m:%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
    ]
    .iter()
    .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
}
