//! Dismissable notifications describing how an operation ended

use crate::error::{Error, LibraryError, LogicError};
use crate::migrate::{ExportOutcome, ExportStatus, ImportReport, ImportStatus};
use rust_i18n::t;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// Localized title plus optional detail line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: Option<String>,
}

impl Notice {
    fn new(level: NoticeLevel, title: impl Into<String>, message: Option<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message,
        }
    }

    pub fn import(report: &ImportReport, album: &str) -> Self {
        match report.status() {
            ImportStatus::Done => {
                let mut message =
                    t!("import_done_message", count = report.imported, album = album).into_owned();
                if report.album_created {
                    message.push(' ');
                    message.push_str(&t!("import_album_created"));
                }
                Self::new(NoticeLevel::Success, t!("import_done_title"), Some(message))
            }
            ImportStatus::Partial => Self::new(
                NoticeLevel::Warning,
                t!("import_partial_title"),
                Some(t!("import_partial_message", count = report.not_processed()).into_owned()),
            ),
        }
    }

    pub fn export(outcome: &ExportOutcome) -> Self {
        let report = match outcome {
            ExportOutcome::NotFound { .. } => {
                return Self::new(
                    NoticeLevel::Error,
                    t!("export_not_found_title"),
                    Some(t!("export_not_found_message").into_owned()),
                );
            }
            ExportOutcome::Exported(report) => report,
        };

        let mut notice = match report.status() {
            ExportStatus::Done => Self::new(
                NoticeLevel::Success,
                t!("export_done_title"),
                Some(t!("export_done_message", count = report.exported).into_owned()),
            ),
            ExportStatus::Partial { shortfall } => Self::new(
                NoticeLevel::Warning,
                t!("export_partial_title"),
                Some(t!("export_partial_message", count = shortfall).into_owned()),
            ),
        };
        if !report.assets_deleted {
            notice.level = NoticeLevel::Warning;
            let detail = t!("export_delete_failed");
            notice.message = Some(match notice.message.take() {
                Some(message) => format!("{} {}", message, detail),
                None => detail.into_owned(),
            });
        }
        notice
    }

    pub fn from_error(error: &Error) -> Self {
        let (title, message) = match error {
            Error::Library(LibraryError::AuthorizationDenied) => {
                (t!("access_denied_title"), t!("access_denied_message").into_owned())
            }
            Error::Logic(LogicError::AlbumCreationFailed { .. })
            | Error::Logic(LogicError::AlbumResolutionFailed { .. }) => {
                (t!("import_failed_title"), t!("album_creation_failed").into_owned())
            }
            Error::Logic(LogicError::EmptyFolder { .. }) => {
                (t!("album_empty_title"), t!("album_empty_message").into_owned())
            }
            Error::Logic(LogicError::MigrationInProgress { .. }) => {
                (t!("migration_busy_title"), t!("migration_busy_message").into_owned())
            }
            Error::FileSystem(_) | Error::Io(_) => (t!("io_error_title"), error.to_string()),
            _ => (t!("internal_error_title"), t!("retry_message").into_owned()),
        };
        Self::new(NoticeLevel::Error, title, Some(message))
    }
}
