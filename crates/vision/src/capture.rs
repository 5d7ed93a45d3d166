//! Screenshot sampling
//!
//! The game draws the board at a fixed place for each supported window size.
//! Every cell is sampled as a short horizontal segment of
//! [`SEGMENT_PIXELS`] pixels centered in its column. Blocks scroll up
//! continuously, so the vertical phase of the grid is found per screenshot by
//! scanning the board bottom-up for the first sample that is a piece.

use image::RgbImage;
use log::debug;
use thiserror::Error;

use crate::classifier::ClassifierTable;
use crate::parser::Frame;
use crate::types::{Color, Matrix, Symbol, BOARD_COLS, BOARD_ROWS};

const ROWS: u32 = BOARD_ROWS as u32;
const COLS: u32 = BOARD_COLS as u32;

/// Pixels per sample segment
pub const SEGMENT_PIXELS: u32 = 8;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("unsupported game window size {width}x{height}, must be one of 1920x1080, 1920x1200, 1600x900, 1366x768")]
    UnsupportedSize { width: u32, height: u32 },
    #[error("failed to decode screenshot")]
    Decode(#[from] image::ImageError),
}

/// Board placement for one window size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    /// Side of one block in pixels
    pub block: u32,
    /// Left edge of column 0, top edge of the block area
    pub offset: (u32, u32),
    /// Sample row used when the board is empty and no phase can be detected
    pub default_y_offset: u32,
}

pub const GEOMETRIES: [Geometry; 4] = [
    Geometry {
        width: 1920,
        height: 1080,
        block: 72,
        offset: (440, 151),
        default_y_offset: 56,
    },
    Geometry {
        width: 1920,
        height: 1200,
        block: 72,
        offset: (440, 211),
        default_y_offset: 56,
    },
    Geometry {
        width: 1600,
        height: 900,
        block: 60,
        offset: (367, 126),
        default_y_offset: 46,
    },
    Geometry {
        width: 1366,
        height: 768,
        block: 51,
        offset: (313, 107),
        default_y_offset: 40,
    },
];

impl Geometry {
    pub fn for_size(width: u32, height: u32) -> Result<&'static Geometry, CaptureError> {
        GEOMETRIES
            .iter()
            .find(|g| g.width == width && g.height == height)
            .ok_or(CaptureError::UnsupportedSize { width, height })
    }

    /// Left pixel of the sample segment in `col`
    pub fn sample_x(&self, col: u32) -> u32 {
        self.offset.0 + col * self.block + (self.block - SEGMENT_PIXELS) / 2
    }

    /// Sample row of `row` for a grid phase of `y_offset`
    pub fn sample_y(&self, row: u32, y_offset: u32) -> u32 {
        self.offset.1 + row * self.block + y_offset
    }

    /// Pixel row just below the block area
    pub fn ground(&self) -> u32 {
        self.offset.1 + self.block * ROWS
    }
}

/// Average color of the segment starting at (x, y)
pub fn segment(image: &RgbImage, x: u32, y: u32) -> Option<Color> {
    if y >= image.height() || x + SEGMENT_PIXELS > image.width() {
        return None;
    }
    let pixels: Vec<Color> = (x..x + SEGMENT_PIXELS)
        .map(|px| {
            let [r, g, b] = image.get_pixel(px, y).0;
            Color::new(r, g, b)
        })
        .collect();
    Color::average(&pixels)
}

/// Find the vertical phase of the grid by scanning up from the ground
pub fn find_y_offset(image: &RgbImage, geometry: &Geometry, table: &ClassifierTable) -> Option<u32> {
    for y in (geometry.offset.1 + 1..=geometry.ground()).rev() {
        for col in 0..COLS {
            let x = geometry.sample_x(col);
            let Some(sample) = segment(image, x, y) else {
                continue;
            };
            let symbol = table.classify(sample);
            if !symbol.is_piece() {
                continue;
            }
            let rel = y - geometry.offset.1;
            let (row, y_offset) = (rel / geometry.block, rel % geometry.block);
            debug!(
                "Y offset: {:2}, pixel ({}, {}), board ({}, {}) {}",
                y_offset,
                x,
                y,
                col,
                row,
                symbol.as_str()
            );
            return Some(y_offset);
        }
    }
    None
}

/// Sample a screenshot into a frame of cell colors
///
/// Screenshots carry no cursor or animation signal; both stay `None`.
pub fn sample_image(image: &RgbImage, table: &ClassifierTable) -> Result<Frame, CaptureError> {
    let geometry = Geometry::for_size(image.width(), image.height())?;
    let y_offset = find_y_offset(image, geometry, table).unwrap_or(geometry.default_y_offset);

    let background = table
        .reference(Symbol::Empty)
        .unwrap_or_default();
    let mut colors = Matrix::filled(ROWS as usize, COLS as usize, background);
    for row in 0..ROWS {
        for col in 0..COLS {
            let x = geometry.sample_x(col);
            let y = geometry.sample_y(row, y_offset);
            if let Some(sample) = segment(image, x, y) {
                colors.set(row as usize, col as usize, sample);
            }
        }
    }
    Ok(Frame::new(colors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hackmatch_core::parse_text;
    use crate::parser::{render, BoardParser};

    /// Paint a synthetic screenshot of `frame` at the given geometry
    ///
    /// Each cell becomes a one-pixel line of its color, `y_offset` below the top
    /// of its block and as wide as the block; everything else is `background`.
    fn paint(frame: &Frame, geometry: &Geometry, y_offset: u32, background: Color) -> RgbImage {
        let bg = image::Rgb([background.r, background.g, background.b]);
        let mut img = RgbImage::from_pixel(geometry.width, geometry.height, bg);
        for (row, col, color) in frame.colors.iter() {
            let x0 = geometry.offset.0 + col as u32 * geometry.block;
            let y = geometry.sample_y(row as u32, y_offset);
            if y >= geometry.height {
                continue;
            }
            for x in x0..(x0 + geometry.block).min(geometry.width) {
                img.put_pixel(x, y, image::Rgb([color.r, color.g, color.b]));
            }
        }
        img
    }

    #[test]
    fn test_geometry_lookup() {
        assert_eq!(Geometry::for_size(1920, 1080).unwrap().block, 72);
        assert_eq!(Geometry::for_size(1366, 768).unwrap().offset, (313, 107));
        assert!(matches!(
            Geometry::for_size(800, 600),
            Err(CaptureError::UnsupportedSize {
                width: 800,
                height: 600
            })
        ));
    }

    #[test]
    fn test_sample_positions() {
        let g = Geometry::for_size(1920, 1080).unwrap();
        assert_eq!(g.sample_x(0), 440 + 32);
        assert_eq!(g.sample_x(6), 440 + 6 * 72 + 32);
        assert_eq!(g.sample_y(8, 56), 151 + 8 * 72 + 56);
        assert_eq!(g.ground(), 151 + 9 * 72);
    }

    #[test]
    fn test_segment_bounds() {
        let img = RgbImage::new(10, 10);
        assert!(segment(&img, 2, 9).is_some());
        assert!(segment(&img, 3, 9).is_none());
        assert!(segment(&img, 0, 10).is_none());
    }

    #[test]
    fn test_sample_painted_screenshot() {
        let parser = BoardParser::default();
        let board = parse_text(
            ".......\n.......\n.......\n.......\n.......\n.......\n..p....\ny.g..#.\nrbr*3yb",
        )
        .unwrap();
        let frame = render(&board, parser.table());
        let background = parser.table().reference(Symbol::Empty).unwrap();

        for geometry in &GEOMETRIES {
            let y_offset = geometry.block / 3;
            let img = paint(&frame, geometry, y_offset, background);
            let sampled = sample_image(&img, parser.table()).unwrap();
            let parsed = parser.parse(&sampled.colors).unwrap();
            assert_eq!(parsed, board, "geometry {}x{}", geometry.width, geometry.height);
        }
    }

    #[test]
    fn test_empty_screenshot_uses_default_offset() {
        let table = ClassifierTable::default();
        let g = Geometry::for_size(1600, 900).unwrap();
        let img = RgbImage::from_pixel(1600, 900, image::Rgb([20, 21, 31]));
        assert_eq!(find_y_offset(&img, g, &table), None);
        let frame = sample_image(&img, &table).unwrap();
        assert!(frame.colors.iter().all(|(_, _, c)| *c == Color::new(20, 21, 31)));
    }
}
