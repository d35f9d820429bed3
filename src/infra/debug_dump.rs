use crate::types::Source;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Keeps a copy of every fetched page so selector breakage can be diagnosed
/// offline with `expo_scraper parse`.
#[derive(Debug, Clone, Default)]
pub struct DebugDump {
    dir: Option<PathBuf>,
}

impl DebugDump {
    pub fn new(enabled: bool, dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: enabled.then(|| dir.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    /// Write `html` to `<dir>/<source>_<timestamp>.html`. Failures are logged
    /// and otherwise ignored.
    pub fn save(&self, source: Source, html: &str) -> Option<PathBuf> {
        let dir = self.dir.as_deref()?;
        let path = dir.join(format!(
            "{}_{}.html",
            source,
            Local::now().format("%Y%m%d_%H%M%S%.3f")
        ));
        match write_dump(dir, &path, html) {
            Ok(()) => {
                debug!(source = %source, path = %path.display(), "Saved debug dump");
                Some(path)
            }
            Err(e) => {
                warn!(source = %source, "Failed to save debug dump: {}", e);
                None
            }
        }
    }
}

fn write_dump(dir: &Path, path: &Path, html: &str) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(path, html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_disabled_dump_writes_nothing() {
        assert_eq!(DebugDump::disabled().save(Source::Kagaku, "<html/>"), None);
        assert!(!DebugDump::new(false, "unused").is_enabled());
    }

    #[test]
    fn test_enabled_dump_writes_page() {
        let temp = tempdir().unwrap();
        let dump = DebugDump::new(true, temp.path().join("debug"));
        let path = dump.save(Source::Makuhari, "<html>幕張</html>").unwrap();

        assert!(path.file_name().unwrap().to_string_lossy().starts_with("makuhari_"));
        assert_eq!(fs::read_to_string(path).unwrap(), "<html>幕張</html>");
    }
}
