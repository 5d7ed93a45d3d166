//! Where frames come from.

use std::path::{Path, PathBuf};

use anyhow::Context;
use hackmatch_core::{parse_text, Board};
use hackmatch_vision::{render, sample_image, ClassifierTable, Frame};
use log::info;

/// Capture collaborator
pub trait FrameSource {
    fn next_frame(&mut self) -> anyhow::Result<Frame>;
}

/// Samples a screenshot file, re-read on every call
///
/// A file that another program keeps overwriting works as a live feed.
pub struct ImageFileSource {
    path: PathBuf,
    table: ClassifierTable,
    prev_size: Option<(u32, u32)>,
}

impl ImageFileSource {
    pub fn new(path: impl AsRef<Path>, table: ClassifierTable) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            table,
            prev_size: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for ImageFileSource {
    fn next_frame(&mut self) -> anyhow::Result<Frame> {
        let image = image::open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?
            .to_rgb8();
        let size = image.dimensions();
        if self.prev_size != Some(size) {
            info!("Screenshot size: {}x{}", size.0, size.1);
            self.prev_size = Some(size);
        }
        Ok(sample_image(&image, &self.table)?)
    }
}

/// Renders textual boards into frames, one per call
///
/// After the last board it keeps returning the last one.
pub struct TextBoardSource {
    boards: Vec<Board>,
    next: usize,
    table: ClassifierTable,
}

impl TextBoardSource {
    pub fn new(boards: Vec<Board>, table: ClassifierTable) -> Self {
        Self {
            boards,
            next: 0,
            table,
        }
    }

    /// Parse one board in the textual format
    pub fn from_text(text: &str, table: ClassifierTable) -> anyhow::Result<Self> {
        let board = parse_text(text).context("invalid board text")?;
        Ok(Self::new(vec![board], table))
    }

    /// Boards handed out so far
    pub fn served(&self) -> usize {
        self.next
    }
}

impl FrameSource for TextBoardSource {
    fn next_frame(&mut self) -> anyhow::Result<Frame> {
        let index = self.next.min(self.boards.len().saturating_sub(1));
        let board = self
            .boards
            .get(index)
            .context("text source has no boards")?;
        self.next = (self.next + 1).min(self.boards.len());
        Ok(render(board, &self.table))
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> anyhow::Result<Frame> {
        (**self).next_frame()
    }
}
