//! Announcement board and operational calendar shown after login.

use chrono::{Datelike, NaiveDate};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub date: NaiveDate,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortalContent {
    #[serde(default)]
    pub announcements: Vec<Announcement>,
    #[serde(default)]
    pub calendar: Vec<CalendarEvent>,
}

/// A calendar month, parsed from `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.len() != 7 {
            return None;
        }
        let first = NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d").ok()?;
        Some(Self {
            year: first.year(),
            month: first.month(),
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

/// Serves portal content, either built in or read once from a JSON file.
#[derive(Debug, Clone)]
pub struct ContentProvider {
    content: PortalContent,
}

impl ContentProvider {
    pub fn new(mut content: PortalContent) -> Self {
        content.calendar.sort_by_key(|event| event.date);
        Self { content }
    }

    pub fn from_file(path: &Path) -> Result<Self, ContentError> {
        let raw = fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let content: PortalContent =
            serde_json::from_str(&raw).map_err(|source| ContentError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        info!(
            "Loaded {} announcements and {} calendar events from {}",
            content.announcements.len(),
            content.calendar.len(),
            path.display()
        );
        Ok(Self::new(content))
    }

    /// File content when `path` is set, built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ContentError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn builtin() -> Self {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);
        let calendar = [
            (date(2025, 1, 6), "Quarterly planning", Some("Operations and fleet managers")),
            (date(2025, 1, 20), "Safety training", Some("Mandatory for drivers")),
            (date(2025, 2, 3), "Payroll closing", None),
            (date(2025, 2, 17), "Fleet maintenance window", Some("Yard closed in the morning")),
        ]
        .into_iter()
        .filter_map(|(date, title, description)| {
            Some(CalendarEvent {
                date: date?,
                title: title.to_string(),
                description: description.map(str::to_string),
            })
        })
        .collect();

        Self::new(PortalContent {
            announcements: vec![
                Announcement {
                    title: "Welcome to Mural One".to_string(),
                    body: "Company news, the operational calendar and the virtual assistant now live in one place.".to_string(),
                    date: None,
                    category: Some("general".to_string()),
                },
                Announcement {
                    title: "Assistant usage".to_string(),
                    body: "The virtual assistant answers operational questions. HR topics go to your manager.".to_string(),
                    date: None,
                    category: Some("technology".to_string()),
                },
            ],
            calendar,
        })
    }

    /// Content with the calendar narrowed to `month` when given.
    pub fn snapshot(&self, month: Option<Month>) -> PortalContent {
        let calendar = self
            .content
            .calendar
            .iter()
            .filter(|event| month.map_or(true, |m| m.contains(event.date)))
            .cloned()
            .collect();
        PortalContent {
            announcements: self.content.announcements.clone(),
            calendar,
        }
    }
}
