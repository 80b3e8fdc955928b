//! Pure calculation functions for puzzle grids.
//!
//! All functions here are pure and testable without any I/O or images.

use serde::{Deserialize, Serialize};

/// Pieces per edge of one sprite sheet.
pub const SPRITE_SIZE: u32 = 5;

/// How an image is divided into square pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PuzzleGrid {
    pub piece_size: u32,
    /// Columns.
    pub h_length: u32,
    /// Rows.
    pub v_length: u32,
    /// Left edge of the centred crop in the source image.
    pub offset_x: u32,
    /// Top edge of the centred crop in the source image.
    pub offset_y: u32,
}

impl PuzzleGrid {
    /// Fit as many whole pieces as possible into `dims`, centring the crop.
    ///
    /// Returns `None` when not even a single piece fits (or `piece_size` is 0).
    ///
    /// ```text
    /// 130x70 image, 20px pieces → 6x3 grid, crop 120x60 at (5, 5)
    /// ```
    pub fn fit(dims: (u32, u32), piece_size: u32) -> Option<Self> {
        if piece_size == 0 {
            return None;
        }
        let (width, height) = dims;
        let h_length = width / piece_size;
        let v_length = height / piece_size;
        if h_length == 0 || v_length == 0 {
            return None;
        }
        Some(Self {
            piece_size,
            h_length,
            v_length,
            offset_x: (width - h_length * piece_size) / 2,
            offset_y: (height - v_length * piece_size) / 2,
        })
    }

    /// Pixel dimensions of the cropped puzzle area.
    pub fn crop_dimensions(&self) -> (u32, u32) {
        (
            self.h_length * self.piece_size,
            self.v_length * self.piece_size,
        )
    }

    pub fn piece_count(&self) -> u32 {
        self.h_length * self.v_length
    }

    /// Sprite sheets covering the grid, row-major.
    ///
    /// Edge sheets are smaller when the grid is not a multiple of `sprite_size`.
    pub fn sprite_tiles(&self, sprite_size: u32) -> Vec<SpriteTile> {
        let cols = self.h_length.div_ceil(sprite_size);
        let rows = self.v_length.div_ceil(sprite_size);
        let mut tiles = Vec::with_capacity((cols * rows) as usize);
        for sy in 0..rows {
            for sx in 0..cols {
                let first_col = sx * sprite_size;
                let first_row = sy * sprite_size;
                tiles.push(SpriteTile {
                    sx,
                    sy,
                    first_col,
                    first_row,
                    cols: sprite_size.min(self.h_length - first_col),
                    rows: sprite_size.min(self.v_length - first_row),
                });
            }
        }
        tiles
    }

    /// Piece map describing where each piece lives inside the sprite sheets.
    pub fn piece_map(&self, sprite_size: u32) -> PieceMap {
        let mut pieces = Vec::with_capacity(self.piece_count() as usize);
        for y in 0..self.v_length {
            for x in 0..self.h_length {
                let sx = x / sprite_size;
                let sy = y / sprite_size;
                pieces.push(PieceEntry {
                    x,
                    y,
                    sprite: sprite_file_name(sx, sy),
                    sprite_x: (x % sprite_size) * self.piece_size,
                    sprite_y: (y % sprite_size) * self.piece_size,
                });
            }
        }
        PieceMap { pieces }
    }
}

/// One sprite sheet: a rectangular block of the piece grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteTile {
    pub sx: u32,
    pub sy: u32,
    pub first_col: u32,
    pub first_row: u32,
    pub cols: u32,
    pub rows: u32,
}

impl SpriteTile {
    pub fn file_name(&self) -> String {
        sprite_file_name(self.sx, self.sy)
    }
}

pub fn sprite_file_name(sx: u32, sy: u32) -> String {
    format!("sprite_{sx}_{sy}.png")
}

/// Location of every piece, keyed by grid coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceMap {
    pub pieces: Vec<PieceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceEntry {
    /// Grid column.
    pub x: u32,
    /// Grid row.
    pub y: u32,
    /// Sprite sheet file holding the piece.
    pub sprite: String,
    /// Pixel offset of the piece inside its sprite sheet.
    pub sprite_x: u32,
    pub sprite_y: u32,
}

/// Width of the bevel drawn on piece covers, at least one pixel.
pub fn cover_border(size: u32) -> u32 {
    (size / 10).max(1)
}

/// Thickness of the board frame border, at least one pixel.
pub fn frame_border(size: u32) -> u32 {
    (size / 4).max(1)
}
