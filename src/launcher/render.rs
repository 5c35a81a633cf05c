//! Launcher screen rendering
//!
//! Screen layout (320x240):
//!
//! ```text
//! +------+---------------------------------------+
//! | logo | banner                      [battery] |
//! |      |   status left        status right     |
//! +------+---------------------------------------+  y = 56
//! | list rows (virtualized around the cursor)    |
//! |                                  +-----------+
//! |                                  |  preview  |
//! +----------------------------------+-----------+
//! ```
//!
//! Only the rows that fit on screen are ever drawn, no matter how long the
//! list is. The cursor row sits in the middle.

use crate::hal::{Display, TextAlign};
use crate::image::Image;
use crate::tab::TabState;

// ============================================================================
// Colors (RGB565)
// ============================================================================

pub mod colors {
    pub const BLACK: u16 = 0x0000;
    pub const WHITE: u16 = 0xFFFF;
    pub const GRAY: u16 = 0x8410;
    pub const GREEN: u16 = 0x07E0;
    pub const AQUA: u16 = 0x07FF;
    pub const SNOW: u16 = 0xFFDF;
}

// ============================================================================
// Layout Constants
// ============================================================================

pub const SCREEN_WIDTH: i32 = 320;
pub const SCREEN_HEIGHT: i32 = 240;

pub const LOGO_WIDTH: i32 = 47;
pub const LOGO_HEIGHT: i32 = 51;
pub const BANNER_WIDTH: i32 = 272;
pub const BANNER_HEIGHT: i32 = 32;

pub const LIST_X_OFFSET: i32 = 0;
pub const LIST_Y_OFFSET: i32 = 48 + 8;

pub const STATUS_X: i32 = LOGO_WIDTH + 11;
pub const STATUS_Y: i32 = BANNER_HEIGHT + 1;
pub const BATTERY_X: i32 = -27;
pub const BATTERY_Y: i32 = 3;

pub const COVER_MAX_WIDTH: u32 = 184;
pub const COVER_MAX_HEIGHT: u32 = 184;

// ============================================================================
// Themes
// ============================================================================

/// List color scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Bit position of the background ramp channel (0 blue, 5 green, 11 red,
    /// 16 shifts everything out: plain black)
    pub background_shift: u8,
    pub standard: u16,
    pub selected: u16,
    pub disabled: u16,
}

impl Theme {
    const fn new(background_shift: u8, standard: u16, selected: u16) -> Self {
        Self {
            background_shift,
            standard,
            selected,
            disabled: colors::AQUA,
        }
    }

    /// Background of row `row` out of `rows`: a brightness ramp on one channel
    pub fn row_background(&self, row: usize, rows: usize) -> u16 {
        let level = (16 * row / rows.max(1)) as u32;
        (level << self.background_shift) as u16
    }
}

pub const THEMES: [Theme; 12] = [
    Theme::new(0, colors::GRAY, colors::WHITE),
    Theme::new(0, colors::GRAY, colors::GREEN),
    Theme::new(0, colors::WHITE, colors::GREEN),
    Theme::new(5, colors::GRAY, colors::WHITE),
    Theme::new(5, colors::GRAY, colors::GREEN),
    Theme::new(5, colors::WHITE, colors::GREEN),
    Theme::new(11, colors::GRAY, colors::WHITE),
    Theme::new(11, colors::GRAY, colors::GREEN),
    Theme::new(11, colors::WHITE, colors::GREEN),
    Theme::new(16, colors::GRAY, colors::WHITE),
    Theme::new(16, colors::GRAY, colors::GREEN),
    Theme::new(16, colors::WHITE, colors::GREEN),
];

/// Theme for a (possibly out of range) theme index
pub fn theme(index: usize) -> &'static Theme {
    &THEMES[index % THEMES.len()]
}

// ============================================================================
// Drawing
// ============================================================================

/// Number of list rows that fit below the header
pub fn list_line_count<D: Display + ?Sized>(display: &D) -> usize {
    let height = display.height() - LIST_Y_OFFSET;
    (height / display.font_height().max(1)).max(0) as usize
}

/// Logo and banner, or black where either is missing
pub fn draw_header<D: Display + ?Sized>(display: &mut D, tab: &TabState) {
    let x_pos = LOGO_WIDTH;
    let y_pos = LOGO_HEIGHT;
    let width = display.width();

    display.fill_rect(x_pos, 0, width - x_pos, LIST_Y_OFFSET, colors::BLACK);
    display.fill_rect(0, y_pos, width, LIST_Y_OFFSET - y_pos, colors::BLACK);

    match &tab.logo {
        Some(logo) => display.draw_image(0, 0, LOGO_WIDTH, LOGO_HEIGHT, logo),
        None => display.fill_rect(0, 0, LOGO_WIDTH, LOGO_HEIGHT, colors::BLACK),
    }

    match &tab.header {
        Some(header) => display.draw_image(x_pos + 1, 0, BANNER_WIDTH, BANNER_HEIGHT, header),
        None => display.fill_rect(x_pos + 1, 0, BANNER_WIDTH, BANNER_HEIGHT, colors::BLACK),
    }
}

/// Every tab's logo side by side
pub fn draw_navbar<'a, D, I>(display: &mut D, tabs: I)
where
    D: Display + ?Sized,
    I: IntoIterator<Item = &'a TabState>,
{
    for (i, tab) in tabs.into_iter().enumerate() {
        let x = i as i32 * LOGO_WIDTH;
        match &tab.logo {
            Some(logo) => display.draw_image(x, 0, LOGO_WIDTH, LOGO_HEIGHT, logo),
            None => display.fill_rect(x, 0, LOGO_WIDTH, LOGO_HEIGHT, colors::BLACK),
        }
    }
}

/// Battery indicator and both status texts
pub fn draw_status<D: Display + ?Sized>(display: &mut D, tab: &TabState) {
    let half = (display.width() - STATUS_X) / 2;

    display.draw_battery(BATTERY_X, BATTERY_Y);
    display.draw_text(
        STATUS_X,
        STATUS_Y,
        half,
        tab.status_left(),
        colors::WHITE,
        colors::BLACK,
        TextAlign::Left,
    );
    display.draw_text(
        STATUS_X + half,
        STATUS_Y,
        half,
        tab.status_right(),
        colors::SNOW,
        colors::BLACK,
        TextAlign::Right,
    );
}

/// Draw the visible window of the list centered on the cursor
pub fn draw_list<D: Display + ?Sized>(display: &mut D, tab: &TabState, theme: &Theme) {
    let list = &tab.list;
    let lines = list_line_count(display);
    let width = display.width();
    let cursor = list.cursor() as isize;

    let mut y = LIST_Y_OFFSET;
    let mut color_bg = theme.row_background(0, lines);

    for i in 0..lines {
        let entry = cursor + i as isize - (lines / 2) as isize;
        let item = usize::try_from(entry).ok().and_then(|e| list.get(e));
        let text = item.map_or("", |item| item.text.as_str());

        let color_fg = if item.is_some() && entry == cursor {
            theme.selected
        } else {
            theme.standard
        };
        color_bg = theme.row_background(i, lines);

        y += display.draw_text(LIST_X_OFFSET, y, width, text, color_fg, color_bg, TextAlign::Left);
    }

    if y < display.height() {
        let height = display.height() - y;
        display.fill_rect(0, y, width, height, color_bg);
    }
}

/// Blit a preview image into the bottom-right corner, clipped to the cover box
pub fn draw_preview<D: Display + ?Sized>(display: &mut D, img: &Image) {
    let width = img.width().min(COVER_MAX_WIDTH) as i32;
    let height = img.height().min(COVER_MAX_HEIGHT) as i32;

    display.draw_image(-width, -height, width, height, img);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::ListItem;
    use crate::testing::{DrawOp, RecordingDisplay};
    use std::rc::Rc;

    fn tab_with(names: &[&str], cursor: isize) -> TabState {
        let mut tab = TabState::new("Test", None, None);
        tab.list.resize(names.len());
        for (i, name) in names.iter().enumerate() {
            tab.list.set(i, ListItem::new(name, i));
        }
        tab.list.scroll(crate::list::ScrollMode::Absolute(cursor), 10);
        tab
    }

    #[test]
    fn test_line_count() {
        let display = RecordingDisplay::new();
        assert_eq!(list_line_count(&display), 11);
    }

    #[test]
    fn test_list_is_centered_on_cursor() {
        let mut display = RecordingDisplay::new();
        let tab = tab_with(&["alpha", "beta", "gamma"], 0);
        draw_list(&mut display, &tab, theme(0));

        let rows = display.texts();
        assert_eq!(rows.len(), 11);
        assert!(rows[..5].iter().all(|row| row.text.is_empty()));
        assert_eq!(rows[5].text, "alpha");
        assert_eq!(rows[5].fg, colors::WHITE);
        assert_eq!(rows[6].text, "beta");
        assert_eq!(rows[6].fg, colors::GRAY);
        assert_eq!(rows[7].text, "gamma");
        assert!(rows[8..].iter().all(|row| row.text.is_empty()));
    }

    #[test]
    fn test_list_renders_fixed_rows_for_long_lists() {
        let names: Vec<String> = (0..500).map(|i| format!("game {i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut display = RecordingDisplay::new();
        let tab = tab_with(&refs, 250);
        draw_list(&mut display, &tab, theme(0));

        let rows = display.texts();
        assert_eq!(rows.len(), 11);
        assert_eq!(rows[0].text, "game 245");
        assert_eq!(rows[5].text, "game 250");
        assert_eq!(rows[10].text, "game 255");
    }

    #[test]
    fn test_list_background_ramp_and_fill() {
        let mut display = RecordingDisplay::new();
        let tab = tab_with(&["a"], 0);
        let theme = theme(3);
        draw_list(&mut display, &tab, theme);

        let rows = display.texts();
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.bg, ((16 * i / 11) as u16) << 5);
        }

        // 56 + 11 * 16 = 232, leaving 8 pixels to fill
        let last_bg = ((16 * 10 / 11) as u16) << 5;
        assert_eq!(
            display.ops.last(),
            Some(&DrawOp::Fill { x: 0, y: 232, w: 320, h: 8, color: last_bg })
        );
    }

    #[test]
    fn test_black_themes_shift_out() {
        assert_eq!(theme(9).row_background(10, 11), 0);
        assert_eq!(theme(21).background_shift, 16);
    }

    #[test]
    fn test_status_prefers_transient() {
        let mut display = RecordingDisplay::new();
        let mut tab = TabState::new("Test", None, None);
        tab.set_persistent_status(Some("1/3"), Some("Games: 3"));
        tab.set_status(Some(""), Some("No cover"));
        draw_status(&mut display, &tab);

        assert_eq!(display.ops[0], DrawOp::Battery { x: BATTERY_X, y: BATTERY_Y });
        let texts = display.texts();
        assert_eq!(texts[0].text, "1/3");
        assert_eq!(texts[1].text, "No cover");
    }

    #[test]
    fn test_header_clears_missing_images() {
        let mut display = RecordingDisplay::new();
        let logo = Rc::new(Image::alloc(LOGO_WIDTH as u32, LOGO_HEIGHT as u32).unwrap());
        let tab = TabState::new("Test", Some(logo), None);
        draw_header(&mut display, &tab);

        assert!(display.ops.contains(&DrawOp::Image { x: 0, y: 0, w: LOGO_WIDTH, h: LOGO_HEIGHT }));
        assert!(display.ops.contains(&DrawOp::Fill {
            x: LOGO_WIDTH + 1,
            y: 0,
            w: BANNER_WIDTH,
            h: BANNER_HEIGHT,
            color: colors::BLACK
        }));
    }

    #[test]
    fn test_preview_is_clipped_and_anchored() {
        let mut display = RecordingDisplay::new();
        let img = Image::alloc(200, 100).unwrap();
        draw_preview(&mut display, &img);
        assert_eq!(display.ops, [DrawOp::Image { x: -184, y: -100, w: 184, h: 100 }]);
    }

    #[test]
    fn test_navbar_draws_each_logo() {
        let mut display = RecordingDisplay::new();
        let logo = Rc::new(Image::alloc(1, 1).unwrap());
        let tabs = [
            TabState::new("A", Some(logo.clone()), None),
            TabState::new("B", None, None),
        ];
        draw_navbar(&mut display, &tabs);
        assert_eq!(display.ops[0], DrawOp::Image { x: 0, y: 0, w: LOGO_WIDTH, h: LOGO_HEIGHT });
        assert_eq!(
            display.ops[1],
            DrawOp::Fill { x: LOGO_WIDTH, y: 0, w: LOGO_WIDTH, h: LOGO_HEIGHT, color: colors::BLACK }
        );
    }
}
