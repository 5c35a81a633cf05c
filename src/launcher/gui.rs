//! Tab registry and navigation
//!
//! [`Gui`] is the one context object the navigation loop works through. It
//! owns every tab, remembers which one is selected, and turns cursor moves
//! into tab events and screen updates.
//!
//! Tab lifecycle: registered by [`Gui::add_tab`], initialized lazily the
//! first time it is shown ([`Gui::init_tab`]). Initialization restores the
//! cursor saved under `"Sel." + <first 11 chars of the name>`.

use std::rc::Rc;

use tracing::{debug, info};

use crate::bounded::{KEY_NAME_CHARS, Text};
use crate::config::LauncherConfig;
use crate::cover::PreviewMode;
use crate::hal::{Display, Hal, Keys, Settings, SettingsError, button};
use crate::image::Image;
use crate::list::{ListItem, ScrollMode, Scrolled};
use crate::render::{self, Theme};
use crate::tab::{Tab, TabContext, TabEvent, TabHandler, TabState};

// ============================================================================
// Settings Keys
// ============================================================================

pub const SELECTED_TAB_KEY: &str = "SelectedTab";
pub const THEME_KEY: &str = "Theme";
pub const PREVIEW_KEY: &str = "ShowPreview";
const POSITION_KEY_PREFIX: &str = "Sel.";

/// Settings key holding a tab's cursor position
pub fn position_key(name: &Text) -> String {
    format!("{}{}", POSITION_KEY_PREFIX, name.prefix(KEY_NAME_CHARS))
}

// ============================================================================
// Key Actions
// ============================================================================

/// What a key snapshot did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Nothing bound was pressed (or there are no tabs)
    None,
    /// The current list was scrolled
    Scrolled(Scrolled),
    /// Another tab is now current
    TabChanged(usize),
    /// The preview policy moved to the next mode
    PreviewChanged(PreviewMode),
}

// ============================================================================
// Registry
// ============================================================================

pub struct Gui<H> {
    tabs: Vec<Tab<H>>,
    selected: usize,
    theme: usize,
    preview: PreviewMode,
}

impl<H: TabHandler> Gui<H> {
    pub fn new(theme: usize, preview: PreviewMode) -> Self {
        Self {
            tabs: Vec::new(),
            selected: 0,
            theme,
            preview,
        }
    }

    pub fn from_config(config: &LauncherConfig) -> Self {
        Self::new(config.theme, config.preview)
    }

    /// Register a tab and return its index
    pub fn add_tab(
        &mut self,
        name: &str,
        logo: Option<Rc<Image>>,
        header: Option<Rc<Image>>,
        handler: H,
    ) -> usize {
        let state = TabState::new(name, logo, header);
        let index = self.tabs.len();
        info!("Tab '{}' added at index {}", state.name, index);
        self.tabs.push(Tab { state, handler });
        index
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn tab(&self, index: usize) -> Option<&Tab<H>> {
        self.tabs.get(index)
    }

    pub fn tab_mut(&mut self, index: usize) -> Option<&mut Tab<H>> {
        self.tabs.get_mut(index)
    }

    pub fn current_index(&self) -> usize {
        self.selected
    }

    pub fn current_tab(&self) -> Option<&Tab<H>> {
        self.tabs.get(self.selected)
    }

    /// Select tab `index`, wrapping out-of-range and negative values.
    /// Returns the new index, or `None` if there are no tabs.
    pub fn set_current_tab(&mut self, index: isize) -> Option<usize> {
        if self.tabs.is_empty() {
            return None;
        }
        self.selected = index.rem_euclid(self.tabs.len() as isize) as usize;
        Some(self.selected)
    }

    pub fn theme(&self) -> &'static Theme {
        render::theme(self.theme)
    }

    pub fn set_theme(&mut self, index: usize) {
        self.theme = index % render::THEMES.len();
    }

    pub fn preview(&self) -> PreviewMode {
        self.preview
    }

    pub fn set_preview(&mut self, mode: PreviewMode) {
        self.preview = mode;
    }

    fn dispatch(&mut self, index: usize, event: TabEvent, hal: &mut Hal<'_>) {
        let preview = self.preview;
        if let Some(tab) = self.tabs.get_mut(index) {
            let mut ctx = TabContext {
                tab: &mut tab.state,
                preview,
                hal,
            };
            tab.handler.on_event(event, &mut ctx);
        }
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// First-show initialization. Does nothing for an initialized tab.
    pub fn init_tab(&mut self, index: usize, hal: &mut Hal<'_>) {
        let Some(tab) = self.tabs.get_mut(index) else {
            return;
        };
        if tab.state.initialized {
            return;
        }
        tab.state.initialized = true;

        let key = position_key(&tab.state.name);
        tab.state.list.restore_cursor(hal.settings.get_i32(&key, 0));

        self.dispatch(index, TabEvent::Init, hal);

        if let Some(tab) = self.tabs.get_mut(index) {
            tab.state.list.clamp_cursor();
        }
        self.dispatch(index, TabEvent::Scroll, hal);
    }

    // ------------------------------------------------------------------------
    // List Operations
    // ------------------------------------------------------------------------

    /// Move a tab's cursor. `Scroll` always fires; when the cursor actually
    /// moved the status and list are redrawn and `Redraw` fires too.
    pub fn scroll(&mut self, index: usize, mode: ScrollMode, hal: &mut Hal<'_>) -> Option<Scrolled> {
        let rows = render::list_line_count(&*hal.display);
        let scrolled = self.tabs.get_mut(index)?.state.list.scroll(mode, rows);

        self.dispatch(index, TabEvent::Scroll, hal);

        if scrolled.moved() {
            let theme = self.theme();
            let state = &self.tabs[index].state;
            render::draw_status(&mut *hal.display, state);
            render::draw_list(&mut *hal.display, state, theme);
            self.dispatch(index, TabEvent::Redraw, hal);
        }

        Some(scrolled)
    }

    /// Resize a tab's list. An unchanged size does nothing; otherwise the
    /// cursor is clamped and `Scroll` fires.
    pub fn resize_list(&mut self, index: usize, new_len: usize, hal: &mut Hal<'_>) {
        let Some(tab) = self.tabs.get_mut(index) else {
            return;
        };
        let old_len = tab.state.list.len();
        if !tab.state.list.resize(new_len) {
            return;
        }

        self.dispatch(index, TabEvent::Scroll, hal);
        info!(
            "Resized list '{}' from {} to {} items",
            self.tabs[index].state.name, old_len, new_len
        );
    }

    pub fn sort_list(&mut self, index: usize) {
        if let Some(tab) = self.tabs.get_mut(index) {
            tab.state.list.sort();
        }
    }

    /// Item under a tab's cursor
    pub fn selected_item(&self, index: usize) -> Option<&ListItem> {
        self.tabs.get(index)?.state.list.selected()
    }

    /// Set the transient status of the current tab. `None` keeps a side.
    pub fn set_status(&mut self, left: Option<&str>, right: Option<&str>) {
        if let Some(tab) = self.tabs.get_mut(self.selected) {
            tab.state.set_status(left, right);
        }
    }

    // ------------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------------

    /// Store the current tab's cursor and the selected tab index
    pub fn save_position(&self, settings: &mut dyn Settings, commit: bool) -> Result<(), SettingsError> {
        let Some(tab) = self.current_tab() else {
            return Ok(());
        };

        let key = position_key(&tab.state.name);
        settings.set_i32(&key, tab.state.list.cursor() as i32);
        settings.set_i32(SELECTED_TAB_KEY, self.selected as i32);
        debug!("Saved position {} of tab {}", tab.state.list.cursor(), self.selected);

        if commit {
            settings.commit()?;
        }
        Ok(())
    }

    /// Select the tab that was current when the position was last saved
    pub fn restore_selected_tab(&mut self, settings: &dyn Settings) -> Option<usize> {
        let index = settings.get_i32(SELECTED_TAB_KEY, 0);
        self.set_current_tab(index as isize)
    }

    /// Apply the theme and preview policy saved in `settings`, keeping the
    /// current values where nothing was saved
    pub fn load_preferences(&mut self, settings: &dyn Settings) {
        let theme = settings.get_i32(THEME_KEY, self.theme as i32);
        self.set_theme(theme.rem_euclid(render::THEMES.len() as i32) as usize);
        self.preview = PreviewMode::from_index(settings.get_i32(PREVIEW_KEY, self.preview.index()));
    }

    pub fn save_preferences(&self, settings: &mut dyn Settings) {
        settings.set_i32(THEME_KEY, self.theme as i32);
        settings.set_i32(PREVIEW_KEY, self.preview.index());
    }

    // ------------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------------

    /// Draw the whole current tab, then let its handler draw on top
    pub fn redraw(&mut self, hal: &mut Hal<'_>) {
        let index = self.selected;
        let theme = self.theme();
        let Some(tab) = self.tabs.get(index) else {
            return;
        };

        render::draw_header(&mut *hal.display, &tab.state);
        render::draw_status(&mut *hal.display, &tab.state);
        render::draw_list(&mut *hal.display, &tab.state, theme);
        self.dispatch(index, TabEvent::Redraw, hal);
    }

    pub fn draw_navbar<D: Display + ?Sized>(&self, display: &mut D) {
        render::draw_navbar(display, self.tabs.iter().map(|tab| &tab.state));
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    /// Apply one snapshot of pressed keys to the current tab
    pub fn handle_keys(&mut self, keys: Keys, hal: &mut Hal<'_>) -> KeyAction {
        if self.tabs.is_empty() {
            return KeyAction::None;
        }

        let scroll = if keys.contains(button::UP) {
            Some(ScrollMode::LineUp)
        } else if keys.contains(button::DOWN) {
            Some(ScrollMode::LineDown)
        } else if keys.contains(button::LEFT) {
            Some(ScrollMode::PageUp)
        } else if keys.contains(button::RIGHT) {
            Some(ScrollMode::PageDown)
        } else {
            None
        };

        if let Some(mode) = scroll {
            return match self.scroll(self.selected, mode, hal) {
                Some(scrolled) => KeyAction::Scrolled(scrolled),
                None => KeyAction::None,
            };
        }

        let step = if keys.contains(button::SELECT) {
            -1
        } else if keys.contains(button::START) {
            1
        } else {
            0
        };

        if step != 0 {
            let Some(index) = self.set_current_tab(self.selected as isize + step) else {
                return KeyAction::None;
            };
            self.init_tab(index, hal);
            self.redraw(hal);
            return KeyAction::TabChanged(index);
        }

        if keys.contains(button::MENU) {
            self.preview = self.preview.next();
            info!("Preview mode is now {:?}", self.preview);
            self.redraw(hal);
            return KeyAction::PreviewChanged(self.preview);
        }

        KeyAction::None
    }
}
