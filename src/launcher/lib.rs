//! # Retro Launcher Core
//!
//! The browsing front-end of a handheld retro console: a row of tabs (one
//! per emulated system), a scrollable game list per tab, and a cover-art
//! preview for the selected game.
//!
//! Hardware is reached only through the traits in [`hal`], so the whole
//! core runs (and is tested) on a host.
//!
//! ## Platform Traits
//!
//! - [`Display`] - Fill, blit, text and battery drawing
//! - [`Input`] - Pressed-key snapshots
//! - [`Settings`] - Persistent integer store
//! - [`FileSystem`] - File probes, bounded reads and writes
//!
//! ## Usage
//!
//! ```ignore
//! use launcher::{CoverResolver, Emulator, EmulatorTab, Gui, Hal, LauncherConfig};
//!
//! let config = LauncherConfig::load("/sd/odroid/launcher.toml")?;
//! let mut gui = Gui::from_config(&config);
//!
//! let nes = Emulator::new("Nintendo Entertainment System", "nes", &["nes"], 16);
//! let name = nes.name.clone();
//! let resolver = CoverResolver::new(config.asset_paths());
//! gui.add_tab(&name, None, None, EmulatorTab::new(nes, &config.paths.roms, resolver));
//!
//! gui.restore_selected_tab(&settings);
//! gui.init_tab(gui.current_index(), &mut hal);
//! gui.redraw(&mut hal);
//!
//! loop {
//!     let keys = hal.input.read();
//!     gui.handle_keys(keys, &mut hal);
//! }
//! ```

#![allow(clippy::new_without_default)]

pub mod bounded;
pub mod catalog;
pub mod config;
pub mod cover;
pub mod gui;
pub mod hal;
pub mod image;
pub mod list;
pub mod render;
pub mod tab;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use bounded::{BoundedString, Text};
pub use catalog::{Emulator, EmulatorTab, RomFile};
pub use config::{ConfigError, LauncherConfig};
pub use cover::{AssetKind, AssetPaths, CoverResolver, CoverState, PreviewMode, Resolution};
pub use gui::{Gui, KeyAction};
pub use hal::{Display, FileSystem, Hal, Input, Keys, Settings, SettingsError};
pub use crate::image::{Image, ImageError};
pub use list::{ListItem, ListModel, ScrollMode};
pub use tab::{TabEvent, TabHandler, TabState};
