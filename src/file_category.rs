//! File categorization system for sorting files by detected type.
//!
//! This module maps media type strings (e.g. `"image/png"`) to one of six
//! fixed categories. Rules are evaluated in a fixed order and the first match
//! wins, so document-like `application/*` types are caught before the generic
//! `application` fallback.
//!
//! # Examples
//!
//! ```
//! use dirsort::file_category::{Category, classify_media_type};
//!
//! assert_eq!(classify_media_type(Some("image/png")), Category::Picture);
//! assert_eq!(classify_media_type(Some("application/pdf")), Category::Document);
//! assert_eq!(classify_media_type(Some("application/zip")), Category::Application);
//! assert_eq!(classify_media_type(None), Category::Miscellaneous);
//! ```

use crate::detect::TypeDetector;
use log::debug;
use std::fmt;
use std::path::Path;

/// Represents one of the six category buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Office documents, PDF, YAML, CSV and any `text/*` file
    Document,
    /// `image/*` files
    Picture,
    /// `video/*` files
    Video,
    /// `audio/*` files
    Audio,
    /// Remaining `application/*` files
    Application,
    /// Undetected or unrecognised files
    Miscellaneous,
}

impl Category {
    /// All categories, in folder order.
    pub const ALL: [Category; 6] = [
        Category::Document,
        Category::Picture,
        Category::Video,
        Category::Audio,
        Category::Application,
        Category::Miscellaneous,
    ];

    /// Returns the destination folder name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use dirsort::file_category::Category;
    ///
    /// assert_eq!(Category::Document.dir_name(), "Documents");
    /// assert_eq!(Category::Audio.dir_name(), "Audio");
    /// assert_eq!(Category::Miscellaneous.dir_name(), "Miscellaneous");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Document => "Documents",
            Category::Picture => "Pictures",
            Category::Video => "Videos",
            Category::Audio => "Audio",
            Category::Application => "Applications",
            Category::Miscellaneous => "Miscellaneous",
        }
    }

    /// Returns the category whose folder is named `name`, if any.
    ///
    /// Matching is exact: `"documents"` is not a category folder.
    pub fn from_dir_name(name: &str) -> Option<Category> {
        Self::ALL.into_iter().find(|c| c.dir_name() == name)
    }

    /// Returns the index of this category in [`Category::ALL`].
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// The top-level part of a media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopLevel {
    Text,
    Image,
    Video,
    Audio,
    Application,
    Other(String),
}

/// A parsed media type such as `application/pdf`.
///
/// Both parts are lowercased and any `;`-separated parameters are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    pub top: TopLevel,
    pub subtype: String,
}

impl MediaType {
    /// Parses a media type string, returning `None` if it has no `/`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dirsort::file_category::{MediaType, TopLevel};
    ///
    /// let parsed = MediaType::parse("Text/Plain; charset=utf-8").unwrap();
    /// assert_eq!(parsed.top, TopLevel::Text);
    /// assert_eq!(parsed.subtype, "plain");
    /// assert!(MediaType::parse("garbage").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let essence = raw.split(';').next()?.trim().to_ascii_lowercase();
        let (top, subtype) = essence.split_once('/')?;
        if top.is_empty() {
            return None;
        }

        let top = match top {
            "text" => TopLevel::Text,
            "image" => TopLevel::Image,
            "video" => TopLevel::Video,
            "audio" => TopLevel::Audio,
            "application" => TopLevel::Application,
            other => TopLevel::Other(other.to_string()),
        };

        Some(Self {
            top,
            subtype: subtype.to_string(),
        })
    }

    /// Word-processing, presentation and spreadsheet Office Open XML formats.
    fn is_office_document(&self) -> bool {
        if self.top != TopLevel::Application {
            return false;
        }
        let Some(rest) = self.subtype.strip_prefix("vnd.openxmlformats-officedocument.") else {
            return false;
        };
        ["wordprocessingml.", "presentationml.", "spreadsheetml."]
            .iter()
            .any(|family| rest.starts_with(family))
    }

    /// `application/*` types that are really documents.
    fn is_document_like_application(&self) -> bool {
        self.top == TopLevel::Application
            && matches!(self.subtype.as_str(), "pdf" | "yaml" | "x-yaml" | "csv")
    }
}

/// Maps a detected media type to its category.
///
/// Rules, first match wins:
/// 1. Office Open XML documents
/// 2. `application/pdf`, `application/yaml`, `application/csv`
/// 3. `text/*`
/// 4. `image/*`
/// 5. `video/*`
/// 6. `audio/*`
/// 7. any other `application/*`
/// 8. everything else, including no detected type
pub fn classify_media_type(media_type: Option<&str>) -> Category {
    let Some(parsed) = media_type.and_then(MediaType::parse) else {
        return Category::Miscellaneous;
    };

    if parsed.is_office_document() || parsed.is_document_like_application() {
        return Category::Document;
    }

    match parsed.top {
        TopLevel::Text => Category::Document,
        TopLevel::Image => Category::Picture,
        TopLevel::Video => Category::Video,
        TopLevel::Audio => Category::Audio,
        TopLevel::Application => Category::Application,
        TopLevel::Other(_) => Category::Miscellaneous,
    }
}

/// Classifies files by asking a [`TypeDetector`] for their media type.
pub struct TypeClassifier<'a> {
    detector: &'a dyn TypeDetector,
}

impl<'a> TypeClassifier<'a> {
    pub fn new(detector: &'a dyn TypeDetector) -> Self {
        Self { detector }
    }

    /// Returns the category for the file at `path`.
    pub fn classify(&self, path: &Path) -> Category {
        let detected = self.detector.detect(path);
        let category = classify_media_type(detected.as_deref());
        debug!(
            "{} detected as {} -> {}",
            path.display(),
            detected.as_deref().unwrap_or("<unknown>"),
            category
        );
        category
    }
}
