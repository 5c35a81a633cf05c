//! Cover art resolution
//!
//! For the selected catalog entry, walk a policy-defined list of asset
//! kinds and return the first one that exists and decodes. Every kind that
//! turns out to be absent or broken is remembered on the entry, so it is
//! never probed again for the rest of the process lifetime. Nothing is
//! invalidated if files appear later.
//!
//! The search checks input before every probe. A held key abandons the
//! search at once: reacting to the user beats finishing the lookup.

use std::io;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::hal::{FileSystem, Input};
use crate::image::{self, Image};

// ============================================================================
// Asset Kinds
// ============================================================================

/// Where a preview image can come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Cover art in the old `.art` (RAW565) format
    LegacyCover,
    /// Cover art as PNG
    PngCover,
    /// Screenshot taken when the game was last saved
    SaveScreenshot,
    /// Per-system fallback picture
    DefaultImage,
}

impl AssetKind {
    pub const COUNT: usize = 4;

    #[inline]
    const fn index(self) -> usize {
        match self {
            AssetKind::LegacyCover => 0,
            AssetKind::PngCover => 1,
            AssetKind::SaveScreenshot => 2,
            AssetKind::DefaultImage => 3,
        }
    }

    /// Cover art is looked up by content checksum
    #[inline]
    pub const fn needs_checksum(self) -> bool {
        matches!(self, AssetKind::LegacyCover | AssetKind::PngCover)
    }
}

// ============================================================================
// Preview Policy
// ============================================================================

/// Which previews to show, and in what order to look for them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreviewMode {
    None,
    #[default]
    CoverThenSave,
    SaveThenCover,
    CoverOnly,
    SaveOnly,
}

impl PreviewMode {
    pub const ALL: [PreviewMode; 5] = [
        PreviewMode::None,
        PreviewMode::CoverThenSave,
        PreviewMode::SaveThenCover,
        PreviewMode::CoverOnly,
        PreviewMode::SaveOnly,
    ];

    /// Asset kinds to try, in order
    pub const fn search_order(self) -> &'static [AssetKind] {
        use AssetKind::*;
        match self {
            PreviewMode::CoverThenSave => &[PngCover, LegacyCover, SaveScreenshot],
            PreviewMode::SaveThenCover => &[SaveScreenshot, PngCover, LegacyCover],
            PreviewMode::CoverOnly => &[PngCover, LegacyCover],
            PreviewMode::SaveOnly => &[SaveScreenshot],
            PreviewMode::None => &[],
        }
    }

    /// Whether the user should be told when no image was found
    pub const fn expects_image(self) -> bool {
        matches!(
            self,
            PreviewMode::CoverThenSave | PreviewMode::SaveThenCover | PreviewMode::CoverOnly
        )
    }

    /// Stable index used when persisting the mode
    pub fn index(self) -> i32 {
        Self::ALL.iter().position(|&mode| mode == self).unwrap_or(0) as i32
    }

    /// Mode for a persisted index, wrapping out-of-range values
    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.rem_euclid(Self::ALL.len() as i32) as usize]
    }

    /// The next mode in the cycle
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }
}

// ============================================================================
// Cover State
// ============================================================================

/// What is known about an entry's preview assets.
///
/// Lives as long as the entry; the missing set is never cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverState {
    checksum: Option<u32>,
    missing: [bool; AssetKind::COUNT],
}

impl CoverState {
    pub const fn new() -> Self {
        Self {
            checksum: None,
            missing: [false; AssetKind::COUNT],
        }
    }

    #[inline]
    pub fn checksum(&self) -> Option<u32> {
        self.checksum
    }

    pub fn set_checksum(&mut self, checksum: u32) {
        self.checksum = Some(checksum);
    }

    #[inline]
    pub fn is_missing(&self, kind: AssetKind) -> bool {
        self.missing[kind.index()]
    }

    pub fn mark_missing(&mut self, kind: AssetKind) {
        self.missing[kind.index()] = true;
    }
}

/// A catalog entry the resolver can search previews for
pub trait CoverEntry {
    fn cover(&self) -> &CoverState;
    fn cover_mut(&mut self) -> &mut CoverState;

    /// Compute the content checksum. Potentially slow: reads the whole file.
    fn compute_checksum(&self, fs: &dyn FileSystem) -> io::Result<u32>;

    /// File path of the asset of `kind`, or `None` if it cannot be named
    /// yet (cover kinds need the checksum)
    fn asset_path(&self, kind: AssetKind, paths: &AssetPaths) -> Option<String>;
}

// ============================================================================
// Resolver
// ============================================================================

/// Base directories preview assets live under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    /// Cover art root
    pub romart: String,
    /// Save data root (save-state screenshots)
    pub saves: String,
}

/// Outcome of a preview search
#[derive(Debug)]
pub enum Resolution {
    Found(Image),
    /// Nothing usable; `errors` counts files that existed but failed to decode
    Missing { errors: u32 },
    /// A key was pressed before the search finished
    Cancelled,
}

/// Ordered, memoizing preview search
#[derive(Debug, Clone)]
pub struct CoverResolver {
    paths: AssetPaths,
}

impl CoverResolver {
    pub fn new(paths: AssetPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &AssetPaths {
        &self.paths
    }

    /// Find the best preview for `entry` under `mode`
    pub fn resolve<E, I>(
        &self,
        entry: &mut E,
        mode: PreviewMode,
        fs: &dyn FileSystem,
        input: &mut I,
    ) -> Resolution
    where
        E: CoverEntry + ?Sized,
        I: Input + ?Sized,
    {
        let mut errors = 0;

        for &kind in mode.search_order() {
            if entry.cover().is_missing(kind) {
                continue;
            }

            if input.read().any() {
                debug!("Preview search cancelled by input");
                return Resolution::Cancelled;
            }

            if kind.needs_checksum() && entry.cover().checksum().is_none() {
                match entry.compute_checksum(fs) {
                    Ok(checksum) => entry.cover_mut().set_checksum(checksum),
                    Err(err) => {
                        warn!("Checksum failed, skipping {:?}: {}", kind, err);
                        entry.cover_mut().mark_missing(kind);
                        continue;
                    }
                }
            }

            let Some(path) = entry.asset_path(kind, &self.paths) else {
                entry.cover_mut().mark_missing(kind);
                continue;
            };

            if !matches!(fs.file_size(&path), Some(size) if size > 0) {
                debug!("No {:?} at '{}'", kind, path);
                entry.cover_mut().mark_missing(kind);
                continue;
            }

            match image::load_from_file(fs, &path) {
                Ok(img) => return Resolution::Found(img),
                Err(err) => {
                    info!("Bad {:?} at '{}': {}", kind, path, err);
                    errors += 1;
                    entry.cover_mut().mark_missing(kind);
                }
            }
        }

        Resolution::Missing { errors }
    }
}
