//! Media type detection.
//!
//! The sorter only needs a best guess at a file's media type. [`TypeDetector`]
//! is the seam; [`ContentDetector`] is the implementation used by the CLI.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Returns a best-guess media type string for a path, or `None` if undetermined.
pub trait TypeDetector {
    fn detect(&self, path: &Path) -> Option<String>;
}

/// Detects media types from file content, falling back to the extension.
///
/// Magic bytes are checked with the `infer` crate. Plain-text formats have no
/// signature, so anything `infer` does not recognise is looked up in an
/// extension table.
///
/// # Examples
///
/// ```no_run
/// use dirsort::detect::{ContentDetector, TypeDetector};
/// use std::path::Path;
///
/// let detector = ContentDetector::default();
/// println!("{:?}", detector.detect(Path::new("notes.md")));
/// ```
#[derive(Debug, Clone)]
pub struct ContentDetector {
    extension_map: HashMap<String, &'static str>,
}

impl ContentDetector {
    /// Creates a new `ContentDetector` with all standard extension mappings.
    pub fn new() -> Self {
        let mut detector = Self {
            extension_map: HashMap::new(),
        };
        detector.populate_standard_mappings();
        detector
    }

    fn populate_standard_mappings(&mut self) {
        // Text and markup
        self.add_extension_mapping("txt", "text/plain");
        self.add_extension_mapping("log", "text/plain");
        self.add_extension_mapping("md", "text/markdown");
        self.add_extension_mapping("markdown", "text/markdown");
        self.add_extension_mapping("html", "text/html");
        self.add_extension_mapping("htm", "text/html");
        self.add_extension_mapping("css", "text/css");
        self.add_extension_mapping("csv", "text/csv");
        self.add_extension_mapping("tsv", "text/tab-separated-values");
        self.add_extension_mapping("rtf", "text/rtf");
        self.add_extension_mapping("ics", "text/calendar");
        self.add_extension_mapping("js", "text/javascript");
        self.add_extension_mapping("rs", "text/x-rust");
        self.add_extension_mapping("py", "text/x-python");
        self.add_extension_mapping("c", "text/x-c");
        self.add_extension_mapping("h", "text/x-c");

        // Structured data
        self.add_extension_mapping("yaml", "application/yaml");
        self.add_extension_mapping("yml", "application/yaml");
        self.add_extension_mapping("json", "application/json");
        self.add_extension_mapping("xml", "application/xml");
        self.add_extension_mapping("toml", "application/toml");

        // Office and print
        self.add_extension_mapping("pdf", "application/pdf");
        self.add_extension_mapping("doc", "application/msword");
        self.add_extension_mapping(
            "docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        );
        self.add_extension_mapping(
            "pptx",
            "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        );
        self.add_extension_mapping(
            "xlsx",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        );
        self.add_extension_mapping("odt", "application/vnd.oasis.opendocument.text");

        // Images
        self.add_extension_mapping("png", "image/png");
        self.add_extension_mapping("jpg", "image/jpeg");
        self.add_extension_mapping("jpeg", "image/jpeg");
        self.add_extension_mapping("gif", "image/gif");
        self.add_extension_mapping("webp", "image/webp");
        self.add_extension_mapping("svg", "image/svg+xml");
        self.add_extension_mapping("bmp", "image/bmp");
        self.add_extension_mapping("tif", "image/tiff");
        self.add_extension_mapping("tiff", "image/tiff");
        self.add_extension_mapping("ico", "image/vnd.microsoft.icon");
        self.add_extension_mapping("heic", "image/heic");

        // Audio
        self.add_extension_mapping("mp3", "audio/mpeg");
        self.add_extension_mapping("wav", "audio/wav");
        self.add_extension_mapping("ogg", "audio/ogg");
        self.add_extension_mapping("flac", "audio/flac");
        self.add_extension_mapping("aac", "audio/aac");
        self.add_extension_mapping("m4a", "audio/mp4");
        self.add_extension_mapping("opus", "audio/opus");

        // Video
        self.add_extension_mapping("mp4", "video/mp4");
        self.add_extension_mapping("m4v", "video/mp4");
        self.add_extension_mapping("mkv", "video/x-matroska");
        self.add_extension_mapping("mov", "video/quicktime");
        self.add_extension_mapping("avi", "video/x-msvideo");
        self.add_extension_mapping("webm", "video/webm");
        self.add_extension_mapping("flv", "video/x-flv");

        // Archives and executables
        self.add_extension_mapping("zip", "application/zip");
        self.add_extension_mapping("gz", "application/gzip");
        self.add_extension_mapping("tar", "application/x-tar");
        self.add_extension_mapping("7z", "application/x-7z-compressed");
        self.add_extension_mapping("rar", "application/vnd.rar");
        self.add_extension_mapping("exe", "application/x-msdownload");
        self.add_extension_mapping("msi", "application/x-msi");
        self.add_extension_mapping("deb", "application/vnd.debian.binary-package");
        self.add_extension_mapping("dmg", "application/x-apple-diskimage");
        self.add_extension_mapping("jar", "application/java-archive");
        self.add_extension_mapping("sh", "application/x-sh");
        self.add_extension_mapping("wasm", "application/wasm");
    }

    /// Adds a file extension to media type mapping.
    pub fn add_extension_mapping(&mut self, ext: &str, media_type: &'static str) {
        self.extension_map.insert(ext.to_lowercase(), media_type);
    }

    /// Maps a file extension to a media type.
    ///
    /// # Examples
    ///
    /// ```
    /// use dirsort::detect::ContentDetector;
    ///
    /// let detector = ContentDetector::default();
    /// assert_eq!(detector.extension_to_media_type("PDF"), Some("application/pdf"));
    /// assert_eq!(detector.extension_to_media_type("unknownext"), None);
    /// ```
    pub fn extension_to_media_type(&self, ext: &str) -> Option<&'static str> {
        self.extension_map.get(&ext.to_lowercase()).copied()
    }

    fn sniff(path: &Path) -> Option<String> {
        // Opening a FIFO or device for reading can block indefinitely.
        if !fs::metadata(path).is_ok_and(|meta| meta.is_file()) {
            return None;
        }

        match infer::get_from_path(path) {
            Ok(Some(kind)) => Some(kind.mime_type().to_string()),
            Ok(None) => None,
            Err(e) => {
                log::debug!("Could not read {} for sniffing: {}", path.display(), e);
                None
            }
        }
    }
}

impl Default for ContentDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeDetector for ContentDetector {
    fn detect(&self, path: &Path) -> Option<String> {
        if let Some(mime) = Self::sniff(path) {
            return Some(mime);
        }

        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.extension_to_media_type(ext))
            .map(str::to_string)
    }
}
