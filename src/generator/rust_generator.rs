//! Pure Rust generator built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with format sniffing |
//! | Centre crop to the grid | `DynamicImage::crop_imm` |
//! | Sprite sheets | `crop_imm` per [`SpriteTile`](super::SpriteTile) → PNG |
//! | Preview | `DynamicImage::thumbnail` (aspect preserved) → PNG |
//! | Covers / frame | `RgbaImage::from_fn` → PNG |

use super::calculations::{PuzzleGrid, SPRITE_SIZE, cover_border, frame_border};
use super::{GeneratorError, PuzzleGenerator};
use crate::config::GeneratorConfig;
use crate::naming::puzzle_name_from_path;
use crate::types::{AssetKind, GeneratedPuzzle, GenerationOptions, SharedAsset};
use image::{DynamicImage, ImageReader, Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

/// Longest edge of the preview image.
const PREVIEW_EDGE: u32 = 300;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
const COVER_SHADE: Rgba<u8> = Rgba([0, 0, 0, 96]);
const COVER_LIGHT: Rgba<u8> = Rgba([255, 255, 255, 96]);
const COVER_SELECTED: Rgba<u8> = Rgba([255, 200, 0, 200]);
const FRAME_COLOR: Rgba<u8> = Rgba([60, 40, 20, 255]);

/// Generator writing PNG output under a scratch directory.
#[derive(Debug, Clone)]
pub struct RustGenerator {
    work_dir: PathBuf,
    default_piece_size: u32,
}

impl RustGenerator {
    pub fn new(work_dir: impl Into<PathBuf>, default_piece_size: u32) -> Self {
        Self {
            work_dir: work_dir.into(),
            default_piece_size,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(&config.work_dir, config.default_piece_size)
    }

    fn shared_dir(&self, kind: AssetKind, size: u32) -> PathBuf {
        let group = match kind {
            AssetKind::Cover => "covers",
            AssetKind::Frame => "frames",
        };
        self.work_dir.join(group).join(size.to_string())
    }
}

fn load_image(path: &Path) -> Result<DynamicImage, GeneratorError> {
    let decode_err = |source| GeneratorError::Decode {
        path: path.to_path_buf(),
        source,
    };
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(decode_err)
}

fn save_png(image: &DynamicImage, path: &Path) -> Result<(), GeneratorError> {
    image.save(path).map_err(|source| GeneratorError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

/// Write sprite sheets and the preview for `grid` into `dir`.
fn write_piece_set(
    cropped: &DynamicImage,
    grid: &PuzzleGrid,
    dir: &Path,
) -> Result<(), GeneratorError> {
    let ps = grid.piece_size;
    for tile in grid.sprite_tiles(SPRITE_SIZE) {
        let sprite = cropped.crop_imm(
            tile.first_col * ps,
            tile.first_row * ps,
            tile.cols * ps,
            tile.rows * ps,
        );
        save_png(&sprite, &dir.join(tile.file_name()))?;
    }
    save_png(
        &cropped.thumbnail(PREVIEW_EDGE, PREVIEW_EDGE),
        &dir.join("preview.png"),
    )
}

/// Square overlay with a bevel: light on the top/left edges, `shade` on the bottom/right.
fn render_cover(size: u32, light: Rgba<u8>, shade: Rgba<u8>) -> RgbaImage {
    let border = cover_border(size);
    RgbaImage::from_fn(size, size, |x, y| {
        if x < border || y < border {
            light
        } else if x >= size - border || y >= size - border {
            shade
        } else {
            TRANSPARENT
        }
    })
}

/// Board frame: a `3·size` square with a solid border and a transparent centre.
fn render_frame(size: u32) -> RgbaImage {
    let side = size * 3;
    let border = frame_border(size);
    RgbaImage::from_fn(side, side, |x, y| {
        let on_edge = x < border || y < border || x >= side - border || y >= side - border;
        if on_edge { FRAME_COLOR } else { TRANSPARENT }
    })
}

fn save_rgba(image: RgbaImage, path: &Path) -> Result<(), GeneratorError> {
    save_png(&DynamicImage::ImageRgba8(image), path)
}

impl PuzzleGenerator for RustGenerator {
    fn create_puzzle(
        &self,
        image: &Path,
        options: &GenerationOptions,
    ) -> Result<GeneratedPuzzle, GeneratorError> {
        let piece_size = options.piece_size.unwrap_or(self.default_piece_size);
        if piece_size == 0 {
            return Err(GeneratorError::ZeroPieceSize);
        }

        let source = load_image(image)?;
        let (width, height) = (source.width(), source.height());
        let grid = PuzzleGrid::fit((width, height), piece_size).ok_or(
            GeneratorError::ImageTooSmall {
                width,
                height,
                piece_size,
            },
        )?;
        let (crop_w, crop_h) = grid.crop_dimensions();
        let cropped = source.crop_imm(grid.offset_x, grid.offset_y, crop_w, crop_h);
        let piece_map = serde_json::to_value(grid.piece_map(SPRITE_SIZE))?;

        let result_dir = self
            .work_dir
            .join("puzzles")
            .join(uuid::Uuid::new_v4().simple().to_string());
        fs::create_dir_all(&result_dir)?;
        if let Err(e) = write_piece_set(&cropped, &grid, &result_dir) {
            // Half-written piece sets are never mirrored; drop them.
            let _ = fs::remove_dir_all(&result_dir);
            return Err(e);
        }

        Ok(GeneratedPuzzle {
            name: options
                .name
                .clone()
                .unwrap_or_else(|| puzzle_name_from_path(image)),
            private: options.private,
            piece_size,
            sprite_size: SPRITE_SIZE,
            h_length: grid.h_length,
            v_length: grid.v_length,
            piece_map,
            result_dir,
        })
    }

    fn create_covers(&self, size: u32) -> Result<SharedAsset, GeneratorError> {
        if size == 0 {
            return Err(GeneratorError::ZeroPieceSize);
        }
        let dir = self.shared_dir(AssetKind::Cover, size);
        fs::create_dir_all(&dir)?;
        save_rgba(
            render_cover(size, COVER_LIGHT, COVER_SHADE),
            &dir.join(AssetKind::Cover.marker_file()),
        )?;
        save_rgba(
            render_cover(size, COVER_SELECTED, COVER_SELECTED),
            &dir.join("selected_covers.png"),
        )?;
        Ok(SharedAsset {
            kind: AssetKind::Cover,
            size,
            result_dir: dir,
        })
    }

    fn create_frame(&self, size: u32) -> Result<SharedAsset, GeneratorError> {
        if size == 0 {
            return Err(GeneratorError::ZeroPieceSize);
        }
        let dir = self.shared_dir(AssetKind::Frame, size);
        fs::create_dir_all(&dir)?;
        save_rgba(render_frame(size), &dir.join(AssetKind::Frame.marker_file()))?;
        Ok(SharedAsset {
            kind: AssetKind::Frame,
            size,
            result_dir: dir,
        })
    }
}
