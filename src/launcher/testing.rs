//! In-memory collaborators for unit tests

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::io::{self, Cursor, Read};

use crate::hal::{Display, FileSystem, Hal, Input, Keys, MemorySettings, TextAlign};
use crate::image::Image;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRow {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub text: String,
    pub fg: u16,
    pub bg: u16,
    pub align: TextAlign,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    Fill { x: i32, y: i32, w: i32, h: i32, color: u16 },
    Image { x: i32, y: i32, w: i32, h: i32 },
    Text(TextRow),
    Battery { x: i32, y: i32 },
}

/// 320x240 display with a 16 pixel font that records every call
pub struct RecordingDisplay {
    pub ops: Vec<DrawOp>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    pub fn texts(&self) -> Vec<TextRow> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(row) => Some(row.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn images(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Image { .. }))
            .count()
    }
}

impl Display for RecordingDisplay {
    fn width(&self) -> i32 {
        320
    }

    fn height(&self) -> i32 {
        240
    }

    fn font_height(&self) -> i32 {
        16
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u16) {
        self.ops.push(DrawOp::Fill { x, y, w, h, color });
    }

    fn draw_image(&mut self, x: i32, y: i32, w: i32, h: i32, _image: &Image) {
        self.ops.push(DrawOp::Image { x, y, w, h });
    }

    fn draw_text(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        text: &str,
        fg: u16,
        bg: u16,
        align: TextAlign,
    ) -> i32 {
        self.ops.push(DrawOp::Text(TextRow {
            x,
            y,
            width,
            text: text.to_owned(),
            fg,
            bg,
            align,
        }));
        16
    }

    fn draw_battery(&mut self, x: i32, y: i32) {
        self.ops.push(DrawOp::Battery { x, y });
    }
}

/// Input that replays a script of key snapshots, then reports nothing held
#[derive(Default)]
pub struct ScriptedInput {
    pub script: VecDeque<Keys>,
    pub reads: usize,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, keys: Keys) -> Self {
        self.script.push_back(keys);
        self
    }
}

impl Input for ScriptedInput {
    fn read(&mut self) -> Keys {
        self.reads += 1;
        self.script.pop_front().unwrap_or(Keys::NONE)
    }
}

/// File system held in a map, counting size probes and opens
#[derive(Default)]
pub struct MemFs {
    files: RefCell<BTreeMap<String, Vec<u8>>>,
    pub probes: Cell<usize>,
    pub opens: Cell<usize>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, path: &str, data: &[u8]) {
        self.files.borrow_mut().insert(path.to_owned(), data.to_vec());
    }

    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.files.borrow().get(path).cloned()
    }
}

impl FileSystem for MemFs {
    fn file_size(&self, path: &str) -> Option<u64> {
        self.probes.set(self.probes.get() + 1);
        self.files.borrow().get(path).map(|data| data.len() as u64)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        self.opens.set(self.opens.get() + 1);
        match self.files.borrow().get(path) {
            Some(data) => Ok(Box::new(Cursor::new(data.clone()))),
            None => Err(io::Error::new(io::ErrorKind::NotFound, path.to_owned())),
        }
    }

    fn write(&self, path: &str, data: &[u8]) -> io::Result<()> {
        self.add(path, data);
        Ok(())
    }

    fn list_dir(&self, path: &str) -> io::Result<Vec<String>> {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let names: Vec<String> = self
            .files
            .borrow()
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('/'))
            .map(str::to_owned)
            .collect();
        if names.is_empty() {
            return Err(io::Error::new(io::ErrorKind::NotFound, path.to_owned()));
        }
        Ok(names)
    }
}

/// A valid RAW565 file of the given size, every pixel set to `color`
pub fn raw565_file(width: u16, height: u16, color: u16) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&width.to_le_bytes());
    data.extend_from_slice(&height.to_le_bytes());
    for _ in 0..width as usize * height as usize {
        data.extend_from_slice(&color.to_le_bytes());
    }
    data
}

/// One of each collaborator, lent out as a [`Hal`] on demand
pub struct Rig {
    pub display: RecordingDisplay,
    pub input: ScriptedInput,
    pub fs: MemFs,
    pub settings: MemorySettings,
}

impl Rig {
    pub fn new() -> Self {
        Self {
            display: RecordingDisplay::new(),
            input: ScriptedInput::new(),
            fs: MemFs::new(),
            settings: MemorySettings::new(),
        }
    }

    pub fn hal(&mut self) -> Hal<'_> {
        Hal {
            display: &mut self.display,
            input: &mut self.input,
            fs: &self.fs,
            settings: &mut self.settings,
        }
    }
}
