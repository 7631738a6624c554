//! Screenshots written when targeting fails.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use image::DynamicImage;

use crate::errors::Result;

pub trait DiagnosticSink {
    /// Persist `image` and return where it went.
    fn save(&self, image: &DynamicImage, label: &str, timestamp: DateTime<Local>) -> Result<PathBuf>;
}

/// `[label]YYYY-MM-DD (HH-MM-SS).png`
pub fn diagnostic_file_name(label: &str, timestamp: DateTime<Local>) -> String {
    format!("[{}]{}.png", label, timestamp.format("%Y-%m-%d (%H-%M-%S)"))
}

/// Writes PNGs into one directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DiagnosticSink for DirectorySink {
    fn save(&self, image: &DynamicImage, label: &str, timestamp: DateTime<Local>) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(diagnostic_file_name(label, timestamp));
        image.save(&path)?;
        log::info!("diagnostic screenshot saved to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use image::RgbImage;

    #[test]
    fn test_file_name_format() {
        let ts = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(diagnostic_file_name("Error", ts), "[Error]2024-03-09 (07-05-01).png");
    }

    #[test]
    fn test_saves_png_into_new_directory() {
        let root = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(root.path().join("shots"));
        let image = DynamicImage::ImageRgb8(RgbImage::new(4, 4));

        let path = sink.save(&image, "Error", Local::now()).unwrap();
        assert!(path.starts_with(sink.dir()));
        assert_eq!(image::open(&path).unwrap().width(), 4);
    }
}
