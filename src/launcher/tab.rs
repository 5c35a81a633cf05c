//! Tabs and tab events
//!
//! A tab is one named section of the browser (usually one emulator). It
//! owns a list model and two generations of status text, and reacts to a
//! small closed set of events through its [`TabHandler`].

use std::rc::Rc;

use crate::bounded::Text;
use crate::cover::PreviewMode;
use crate::hal::Hal;
use crate::image::Image;
use crate::list::ListModel;

/// Text shown in a freshly added tab until its handler takes over
pub const LOADING_TEXT: &str = "Loading...";

// ============================================================================
// Events
// ============================================================================

/// Events delivered to a tab's handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabEvent {
    /// First time the tab is shown; populate the list here
    Init,
    /// The cursor was (re)applied, even if it did not move
    Scroll,
    /// Status and list were redrawn; draw anything else (previews)
    Redraw,
}

/// What a handler gets to work with while handling an event
pub struct TabContext<'a, 'h> {
    pub tab: &'a mut TabState,
    pub preview: PreviewMode,
    pub hal: &'a mut Hal<'h>,
}

/// Per-tab event handler
pub trait TabHandler {
    fn on_event(&mut self, event: TabEvent, ctx: &mut TabContext<'_, '_>);
}

impl<F> TabHandler for F
where
    F: FnMut(TabEvent, &mut TabContext<'_, '_>),
{
    fn on_event(&mut self, event: TabEvent, ctx: &mut TabContext<'_, '_>) {
        self(event, ctx)
    }
}

// ============================================================================
// Status Lines
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLine {
    pub left: Text,
    pub right: Text,
}

// ============================================================================
// Tab State
// ============================================================================

/// Everything about a tab except its handler
#[derive(Debug, Clone, Default)]
pub struct TabState {
    pub name: Text,
    /// Navbar/header logo, shared with whoever loaded it
    pub logo: Option<Rc<Image>>,
    /// Header banner
    pub header: Option<Rc<Image>>,
    pub list: ListModel,
    /// Base status text
    pub status: StatusLine,
    /// Overlay status text; non-empty sides win over `status`
    pub transient: StatusLine,
    pub initialized: bool,
}

impl TabState {
    pub fn new(name: &str, logo: Option<Rc<Image>>, header: Option<Rc<Image>>) -> Self {
        let mut transient = StatusLine::default();
        transient.left.set(LOADING_TEXT);

        Self {
            name: Text::truncate_from(name),
            logo,
            header,
            list: ListModel::new(),
            status: StatusLine::default(),
            transient,
            initialized: false,
        }
    }

    /// Left status text as displayed: transient if set, else persistent
    pub fn status_left(&self) -> &str {
        if self.transient.left.is_empty() {
            &self.status.left
        } else {
            &self.transient.left
        }
    }

    /// Right status text as displayed: transient if set, else persistent
    pub fn status_right(&self) -> &str {
        if self.transient.right.is_empty() {
            &self.status.right
        } else {
            &self.transient.right
        }
    }

    /// Update the transient overlay. `None` leaves a side untouched.
    pub fn set_status(&mut self, left: Option<&str>, right: Option<&str>) {
        if let Some(left) = left {
            self.transient.left.set(left);
        }
        if let Some(right) = right {
            self.transient.right.set(right);
        }
    }

    /// Update the persistent status. `None` leaves a side untouched.
    pub fn set_persistent_status(&mut self, left: Option<&str>, right: Option<&str>) {
        if let Some(left) = left {
            self.status.left.set(left);
        }
        if let Some(right) = right {
            self.status.right.set(right);
        }
    }
}

/// A registered tab: its state plus the handler that reacts to its events
pub struct Tab<H> {
    pub state: TabState,
    pub handler: H,
}
