//! Platform collaborators
//!
//! The launcher core never touches hardware directly. Everything it needs
//! from the platform goes through the traits in this module:
//!
//! - [`Display`] - rectangle fill, image blit, text and battery drawing
//! - [`Input`] - snapshot of the currently pressed keys
//! - [`Settings`] - persistent integer store keyed by string
//! - [`FileSystem`] - existence/size probe, bounded reads, whole-file writes
//!
//! Host implementations backed by `std::fs` are provided for the file
//! system and settings store; display and input come from the platform.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::image::Image;

// ============================================================================
// Key Bit Positions
// ============================================================================

/// Key bit flags for [`Keys`]
pub mod button {
    pub const UP: u16 = 1 << 0;
    pub const DOWN: u16 = 1 << 1;
    pub const LEFT: u16 = 1 << 2;
    pub const RIGHT: u16 = 1 << 3;
    pub const A: u16 = 1 << 4;
    pub const B: u16 = 1 << 5;
    pub const START: u16 = 1 << 6;
    pub const SELECT: u16 = 1 << 7;
    pub const MENU: u16 = 1 << 8;
    pub const OPTION: u16 = 1 << 9;

    /// D-pad mask (UP | DOWN | LEFT | RIGHT)
    pub const DPAD_MASK: u16 = UP | DOWN | LEFT | RIGHT;

    /// Any key at all
    pub const ANY: u16 = 0x03FF;
}

/// Snapshot of pressed keys (bit flags from [`button`])
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keys(pub u16);

impl Keys {
    pub const NONE: Keys = Keys(0);

    #[inline]
    pub const fn contains(self, mask: u16) -> bool {
        self.0 & mask != 0
    }

    /// True if any key is held
    #[inline]
    pub const fn any(self) -> bool {
        self.contains(button::ANY)
    }
}

// ============================================================================
// Display
// ============================================================================

/// Horizontal text alignment inside the given width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
}

/// Display abstraction (RGB565 colors).
///
/// Negative coordinates are measured from the right/bottom edge, so
/// `draw_image(-w, -h, w, h, img)` anchors an image to the bottom-right corner.
pub trait Display {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    /// Height of one line of text in pixels
    fn font_height(&self) -> i32;
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u16);
    /// Blit the top-left `w`x`h` region of `image`
    fn draw_image(&mut self, x: i32, y: i32, w: i32, h: i32, image: &Image);
    /// Draw one line of text, padding `width` with `bg`. Returns the line height.
    fn draw_text(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        text: &str,
        fg: u16,
        bg: u16,
        align: TextAlign,
    ) -> i32;
    fn draw_battery(&mut self, x: i32, y: i32);
}

// ============================================================================
// Input
// ============================================================================

/// Input abstraction
pub trait Input {
    /// Keys held right now
    fn read(&mut self) -> Keys;
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("settings encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistent integer settings keyed by string
pub trait Settings {
    fn get_i32(&self, key: &str, default: i32) -> i32;
    fn set_i32(&mut self, key: &str, value: i32);
    /// Flush pending changes to storage
    fn commit(&mut self) -> Result<(), SettingsError>;
}

/// Settings kept only in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: BTreeMap<String, i32>,
    commits: usize,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `commit` has been called
    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl Settings for MemorySettings {
    fn get_i32(&self, key: &str, default: i32) -> i32 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_i32(&mut self, key: &str, value: i32) {
        self.values.insert(key.to_owned(), value);
    }

    fn commit(&mut self) -> Result<(), SettingsError> {
        self.commits += 1;
        Ok(())
    }
}

/// Settings stored as a flat JSON object in a single file
#[derive(Debug)]
pub struct JsonSettings {
    path: PathBuf,
    values: BTreeMap<String, i32>,
    dirty: bool,
}

impl JsonSettings {
    /// Load settings from `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read(&path) {
            Ok(data) => serde_json::from_slice(&data).unwrap_or_else(|err| {
                warn!("Settings file {:?} is corrupt, starting fresh: {}", path, err);
                BTreeMap::new()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                warn!("Unable to read settings {:?}: {}", path, err);
                BTreeMap::new()
            }
        };

        Self {
            path,
            values,
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Settings for JsonSettings {
    fn get_i32(&self, key: &str, default: i32) -> i32 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_i32(&mut self, key: &str, value: i32) {
        if self.values.insert(key.to_owned(), value) != Some(value) {
            self.dirty = true;
        }
    }

    fn commit(&mut self) -> Result<(), SettingsError> {
        if !self.dirty {
            debug!("Settings unchanged, skipping commit");
            return Ok(());
        }

        let data = serde_json::to_vec_pretty(&self.values)?;
        let io_err = |source| SettingsError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&self.path, data).map_err(io_err)?;

        self.dirty = false;
        info!("Settings saved to {:?}", self.path);
        Ok(())
    }
}

// ============================================================================
// File System
// ============================================================================

/// File system abstraction
pub trait FileSystem {
    /// Size of the file at `path`, or `None` if it does not exist
    fn file_size(&self, path: &str) -> Option<u64>;

    /// Open a file for sequential reading
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>>;

    /// Replace the file at `path` with `data`
    fn write(&self, path: &str, data: &[u8]) -> io::Result<()>;

    /// Names of the regular files in directory `path`
    fn list_dir(&self, path: &str) -> io::Result<Vec<String>>;

    /// Read at most `max_len` bytes from the start of a file
    fn read_bounded(&self, path: &str, max_len: usize) -> io::Result<Vec<u8>> {
        let mut data = Vec::new();
        self.open(path)?
            .take(max_len as u64)
            .read_to_end(&mut data)?;
        Ok(data)
    }
}

/// Host file system backed by `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn file_size(&self, path: &str) -> Option<u64> {
        fs::metadata(path)
            .ok()
            .filter(|meta| meta.is_file())
            .map(|meta| meta.len())
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(fs::File::open(path)?))
    }

    fn write(&self, path: &str, data: &[u8]) -> io::Result<()> {
        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)
    }

    fn list_dir(&self, path: &str) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_owned());
                }
            }
        }
        Ok(names)
    }
}

// ============================================================================
// Collaborator Bundle
// ============================================================================

/// The platform collaborators, borrowed for the duration of one call into
/// the launcher core
pub struct Hal<'a> {
    pub display: &'a mut dyn Display,
    pub input: &'a mut dyn Input,
    pub fs: &'a dyn FileSystem,
    pub settings: &'a mut dyn Settings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_any() {
        assert!(!Keys::NONE.any());
        assert!(Keys(button::MENU).any());
        assert!(Keys(button::UP | button::A).contains(button::DPAD_MASK));
        assert!(!Keys(button::A).contains(button::DPAD_MASK));
    }

    #[test]
    fn test_memory_settings() {
        let mut settings = MemorySettings::new();
        assert_eq!(settings.get_i32("SelectedTab", 3), 3);
        settings.set_i32("SelectedTab", 1);
        assert_eq!(settings.get_i32("SelectedTab", 3), 1);
        settings.commit().unwrap();
        assert_eq!(settings.commits(), 1);
    }

    #[test]
    fn test_json_settings_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("launcher.json");

        let mut settings = JsonSettings::open(&path);
        assert_eq!(settings.get_i32("Sel.Nintendo En", 0), 0);
        settings.set_i32("Sel.Nintendo En", 42);
        settings.commit().unwrap();

        let reloaded = JsonSettings::open(&path);
        assert_eq!(reloaded.get_i32("Sel.Nintendo En", 0), 42);
    }

    #[test]
    fn test_json_settings_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launcher.json");
        fs::write(&path, b"{not json").unwrap();

        let settings = JsonSettings::open(&path);
        assert_eq!(settings.get_i32("Theme", 7), 7);
    }

    #[test]
    fn test_std_file_system() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saves").join("game.bin");
        let path = path.to_str().unwrap();

        let fs = StdFileSystem;
        assert_eq!(fs.file_size(path), None);
        fs.write(path, b"0123456789").unwrap();
        assert_eq!(fs.file_size(path), Some(10));
        assert_eq!(fs.read_bounded(path, 4).unwrap(), b"0123");

        let listed = fs.list_dir(dir.path().join("saves").to_str().unwrap()).unwrap();
        assert_eq!(listed, ["game.bin"]);
    }
}
