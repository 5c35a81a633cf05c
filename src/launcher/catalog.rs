//! Game catalog
//!
//! One [`EmulatorTab`] per emulated system. It scans the system's ROM
//! directory when its tab is first shown, keeps one [`RomFile`] per game,
//! and draws the selected game's preview whenever the list is redrawn.

use std::io::{self, Read};

use tracing::{info, warn};

use crate::cover::{AssetKind, AssetPaths, CoverEntry, CoverResolver, CoverState, Resolution};
use crate::hal::FileSystem;
use crate::list::ListItem;
use crate::render;
use crate::tab::{TabContext, TabEvent, TabHandler, TabState};

/// Chunk size used while checksumming ROM files
const CRC_CHUNK_SIZE: usize = 4096;

pub const NO_COVER_TEXT: &str = "No cover";
pub const BAD_COVER_TEXT: &str = "Bad cover";
pub const NO_GAMES_TEXT: &str = "No games";

// ============================================================================
// Emulator
// ============================================================================

/// An emulated system as the launcher sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emulator {
    /// Tab title
    pub name: String,
    /// Directory name under the ROM, art and save roots
    pub dirname: String,
    /// Accepted ROM file extensions, without the dot
    pub extensions: Vec<String>,
    /// Header bytes skipped when checksumming (e.g. 16 for iNES)
    pub crc_offset: u64,
}

impl Emulator {
    pub fn new(name: &str, dirname: &str, extensions: &[&str], crc_offset: u64) -> Self {
        Self {
            name: name.to_owned(),
            dirname: dirname.to_owned(),
            extensions: extensions.iter().map(|ext| ext.to_ascii_lowercase()).collect(),
            crc_offset,
        }
    }

    fn accepts(&self, ext: &str) -> bool {
        self.extensions.iter().any(|known| known.eq_ignore_ascii_case(ext))
    }
}

// ============================================================================
// ROM File
// ============================================================================

/// One game in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomFile {
    /// File name without extension
    pub name: String,
    pub ext: String,
    /// Full path to the ROM
    pub path: String,
    /// System directory name
    pub dirname: String,
    pub crc_offset: u64,
    pub cover: CoverState,
}

impl RomFile {
    /// Build an entry for `file_name` inside `dir`. Returns `None` for
    /// names without an extension.
    pub fn new(dir: &str, file_name: &str, emulator: &Emulator) -> Option<Self> {
        let (name, ext) = file_name.rsplit_once('.')?;
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_owned(),
            ext: ext.to_owned(),
            path: format!("{}/{}", dir, file_name),
            dirname: emulator.dirname.clone(),
            crc_offset: emulator.crc_offset,
            cover: CoverState::new(),
        })
    }
}

impl CoverEntry for RomFile {
    fn cover(&self) -> &CoverState {
        &self.cover
    }

    fn cover_mut(&mut self) -> &mut CoverState {
        &mut self.cover
    }

    fn compute_checksum(&self, fs: &dyn FileSystem) -> io::Result<u32> {
        let checksum = crc32_file(fs, &self.path, self.crc_offset)?;
        info!("Checksum of '{}' is {:08X}", self.path, checksum);
        Ok(checksum)
    }

    fn asset_path(&self, kind: AssetKind, paths: &AssetPaths) -> Option<String> {
        let path = match kind {
            AssetKind::LegacyCover | AssetKind::PngCover => {
                let crc = self.cover.checksum()?;
                let ext = if kind == AssetKind::LegacyCover { "art" } else { "png" };
                format!("{}/{}/{:X}/{:08X}.{}", paths.romart, self.dirname, crc >> 28, crc, ext)
            }
            AssetKind::SaveScreenshot => {
                format!("{}/{}/{}.{}.png", paths.saves, self.dirname, self.name, self.ext)
            }
            AssetKind::DefaultImage => format!("{}/{}/default.png", paths.romart, self.dirname),
        };
        Some(path)
    }
}

/// CRC32 of a file's contents after skipping `offset` header bytes
pub fn crc32_file<F: FileSystem + ?Sized>(fs: &F, path: &str, offset: u64) -> io::Result<u32> {
    let mut reader = fs.open(path)?;
    io::copy(&mut reader.by_ref().take(offset), &mut io::sink())?;

    let mut hasher = crc32fast::Hasher::new();
    let mut chunk = [0u8; CRC_CHUNK_SIZE];
    loop {
        let read = reader.read(&mut chunk)?;
        if read == 0 {
            break;
        }
        hasher.update(&chunk[..read]);
    }
    Ok(hasher.finalize())
}

// ============================================================================
// Emulator Tab
// ============================================================================

/// Tab handler listing the games of one emulator
pub struct EmulatorTab {
    emulator: Emulator,
    roms_root: String,
    resolver: CoverResolver,
    files: Vec<RomFile>,
}

impl EmulatorTab {
    pub fn new(emulator: Emulator, roms_root: &str, resolver: CoverResolver) -> Self {
        Self {
            emulator,
            roms_root: roms_root.to_owned(),
            resolver,
            files: Vec::new(),
        }
    }

    pub fn emulator(&self) -> &Emulator {
        &self.emulator
    }

    pub fn files(&self) -> &[RomFile] {
        &self.files
    }

    /// The game under the tab's cursor
    pub fn selected_file(&self, tab: &TabState) -> Option<&RomFile> {
        let index = tab.list.selected()?.payload?;
        self.files.get(index)
    }

    /// Scan the ROM directory and fill the list
    fn populate(&mut self, tab: &mut TabState, fs: &dyn FileSystem) {
        let dir = format!("{}/{}", self.roms_root, self.emulator.dirname);

        let names = fs.list_dir(&dir).unwrap_or_else(|err| {
            warn!("Unable to list '{}': {}", dir, err);
            Vec::new()
        });

        self.files = names
            .iter()
            .filter_map(|name| RomFile::new(&dir, name, &self.emulator))
            .filter(|file| self.emulator.accepts(&file.ext))
            .collect();

        tab.list.resize(self.files.len());
        for (i, file) in self.files.iter().enumerate() {
            tab.list.set(i, ListItem::new(&file.name, i));
        }
        tab.list.sort();

        tab.set_status(Some(""), Some(""));
        if self.files.is_empty() {
            tab.set_persistent_status(Some(NO_GAMES_TEXT), Some(""));
        } else {
            let count = format!("Games: {}", self.files.len());
            tab.set_persistent_status(None, Some(&count));
        }

        info!("Found {} games for '{}' in '{}'", self.files.len(), self.emulator.name, dir);
    }

    fn update_position(&self, tab: &mut TabState) {
        if tab.list.is_empty() {
            return;
        }
        let position = format!("{}/{}", tab.list.cursor() + 1, tab.list.len());
        tab.set_persistent_status(Some(&position), None);
        // A cover message belongs to the previous selection
        tab.set_status(None, Some(""));
    }

    fn draw_preview(&mut self, ctx: &mut TabContext<'_, '_>) {
        let Some(index) = ctx.tab.list.selected().and_then(|item| item.payload) else {
            return;
        };
        let Some(file) = self.files.get_mut(index) else {
            return;
        };

        let mode = ctx.preview;
        match self.resolver.resolve(file, mode, ctx.hal.fs, &mut *ctx.hal.input) {
            Resolution::Found(img) => {
                render::draw_preview(&mut *ctx.hal.display, &img);
                drop(img);
            }
            Resolution::Missing { errors } => {
                if file.cover.checksum().is_some() && (mode.expects_image() || errors > 0) {
                    info!("No image found for '{}'", file.name);
                    let text = if errors > 0 { BAD_COVER_TEXT } else { NO_COVER_TEXT };
                    ctx.tab.set_status(None, Some(text));
                    render::draw_status(&mut *ctx.hal.display, ctx.tab);
                }
            }
            Resolution::Cancelled => {}
        }
    }
}

impl TabHandler for EmulatorTab {
    fn on_event(&mut self, event: TabEvent, ctx: &mut TabContext<'_, '_>) {
        match event {
            TabEvent::Init => self.populate(ctx.tab, ctx.hal.fs),
            TabEvent::Scroll => self.update_position(ctx.tab),
            TabEvent::Redraw => self.draw_preview(ctx),
        }
    }
}
