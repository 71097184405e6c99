/// Sprite template: a greyscale/alpha sheet of 16 square frames,
/// stacked vertically, rasterized at one cell pixel size.
///
/// The red channel carries intensity; alpha is copied as-is by the tint.
/// Two sources:
///   - procedural: frames drawn geometrically at any size
///   - PNG sheet (feature `png-sprites`): width W, height 16·W, rescaled

use std::path::Path;

use thiserror::Error;

use super::orientation::{self, FrameIndex, FRAME_COUNT};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[cfg(feature = "png-sprites")]
    #[error("sprite sheet: {0}")]
    Image(#[from] image::ImageError),

    #[error("sprite sheet must be W x 16W pixels, got {width}x{height}")]
    BadShape { width: u32, height: u32 },

    #[error("PNG sprite sheets need the `png-sprites` feature")]
    Unsupported,
}

/// RGBA pixels of all 16 frames at one size.
#[derive(Clone, Debug)]
pub struct SpriteTemplate {
    size: u32,
    pixels: Vec<u8>,
}

impl SpriteTemplate {
    pub fn size(&self) -> u32 {
        self.size
    }

    /// RGBA bytes of one frame, row-major, `size * size * 4` long.
    pub fn frame(&self, frame: FrameIndex) -> &[u8] {
        let len = (self.size * self.size * 4) as usize;
        let start = frame as usize * len;
        &self.pixels[start..start + len]
    }
}

/// Where template frames come from.
#[derive(Clone, Debug)]
pub enum TemplateSource {
    Procedural,
    #[cfg(feature = "png-sprites")]
    Sheet(image::RgbaImage),
}

impl TemplateSource {
    #[cfg(feature = "png-sprites")]
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let sheet = image::open(path)?.to_rgba8();
        let (width, height) = sheet.dimensions();
        if width == 0 || height != width * FRAME_COUNT as u32 {
            return Err(TemplateError::BadShape { width, height });
        }
        Ok(TemplateSource::Sheet(sheet))
    }

    #[cfg(not(feature = "png-sprites"))]
    pub fn load(_path: &Path) -> Result<Self, TemplateError> {
        Err(TemplateError::Unsupported)
    }

    /// Rasterize all frames at `size` pixels per cell.
    pub fn rasterize(&self, size: u32) -> SpriteTemplate {
        let size = size.max(1);
        match self {
            TemplateSource::Procedural => procedural(size),
            #[cfg(feature = "png-sprites")]
            TemplateSource::Sheet(sheet) => {
                use image::imageops::{self, FilterType};
                let scaled = imageops::resize(sheet, size, size * FRAME_COUNT as u32, FilterType::Triangle);
                SpriteTemplate { size, pixels: scaled.into_raw() }
            }
        }
    }
}

// ── Procedural frames ──

/// Half the body thickness, as a fraction of the cell.
const HALF_WIDTH: f32 = 0.32;
const EGG_RADIUS: f32 = 0.38;
const STUB_HALF: f32 = 0.24;
const EYE_RADIUS: f32 = 0.075;

const EDGE_SHADE: f32 = 110.0;
const STUB_INTENSITY: u8 = 180;
const EYE_INTENSITY: u8 = 30;

fn procedural(size: u32) -> SpriteTemplate {
    let frame_len = (size * size * 4) as usize;
    let mut pixels = vec![0u8; frame_len * FRAME_COUNT];
    for frame in 0..FRAME_COUNT as FrameIndex {
        let out = &mut pixels[frame as usize * frame_len..(frame as usize + 1) * frame_len];
        for py in 0..size {
            for px in 0..size {
                let u = (px as f32 + 0.5) / size as f32;
                let v = (py as f32 + 0.5) / size as f32;
                if let Some(intensity) = shade(frame, u, v) {
                    let i = ((py * size + px) * 4) as usize;
                    out[i] = intensity;
                    out[i + 1] = intensity;
                    out[i + 2] = intensity;
                    out[i + 3] = 255;
                }
            }
        }
    }
    SpriteTemplate { size, pixels }
}

/// Intensity at normalized position (u, v) of a frame, or `None` if transparent.
fn shade(frame: FrameIndex, u: f32, v: f32) -> Option<u8> {
    let (du, dv) = (u - 0.5, v - 0.5);
    match frame {
        orientation::EGG => {
            let d = (du * du + dv * dv).sqrt();
            (d <= EGG_RADIUS).then(|| falloff(d, EGG_RADIUS))
        }
        orientation::STUB => {
            (du.abs() <= STUB_HALF && dv.abs() <= STUB_HALF).then_some(STUB_INTENSITY)
        }
        _ => {
            let d = skeleton_distance(frame, u, v);
            if d > HALF_WIDTH {
                return None;
            }
            if orientation::is_head_frame(frame) && on_eye(frame, du, dv) {
                return Some(EYE_INTENSITY);
            }
            Some(falloff(d, HALF_WIDTH))
        }
    }
}

fn falloff(d: f32, radius: f32) -> u8 {
    (255.0 - (d / radius) * EDGE_SHADE).clamp(0.0, 255.0) as u8
}

/// Distance from (u, v) to the frame's centre line: the cell centre plus
/// one segment to each connected edge midpoint.
fn skeleton_distance(frame: FrameIndex, u: f32, v: f32) -> f32 {
    let (up, down, left, right) = orientation::connected_edges(frame);
    let (du, dv) = (u - 0.5, v - 0.5);
    let mut best = (du * du + dv * dv).sqrt();
    if up && dv <= 0.0 {
        best = best.min(du.abs());
    }
    if down && dv >= 0.0 {
        best = best.min(du.abs());
    }
    if left && du <= 0.0 {
        best = best.min(dv.abs());
    }
    if right && du >= 0.0 {
        best = best.min(dv.abs());
    }
    best
}

/// Eyes sit on the side facing away from the connected edge.
fn on_eye(frame: FrameIndex, du: f32, dv: f32) -> bool {
    let (up, down, left, _right) = orientation::connected_edges(frame);
    // (forward offset, sideways offset) unit vectors of the facing direction
    let (fx, fy) = if down {
        (0.0, -1.0)
    } else if up {
        (0.0, 1.0)
    } else if left {
        (1.0, 0.0)
    } else {
        (-1.0, 0.0)
    };
    let (sx, sy) = (-fy, fx);
    [-1.0f32, 1.0].iter().any(|&side| {
        let ex = fx * 0.12 + sx * 0.14 * side;
        let ey = fy * 0.12 + sy * 0.14 * side;
        let (dx, dy) = (du - ex, dv - ey);
        (dx * dx + dy * dy).sqrt() <= EYE_RADIUS
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_at(t: &SpriteTemplate, frame: FrameIndex, x: u32, y: u32) -> u8 {
        t.frame(frame)[((y * t.size() + x) * 4 + 3) as usize]
    }

    #[test]
    fn procedural_sheet_has_sixteen_frames() {
        let t = TemplateSource::Procedural.rasterize(12);
        assert_eq!(t.size(), 12);
        assert_eq!(t.pixels.len(), 12 * 12 * 4 * FRAME_COUNT);
        for f in 0..FRAME_COUNT as FrameIndex {
            assert!(t.frame(f).chunks(4).any(|px| px[3] > 0), "frame {f} is empty");
        }
    }

    #[test]
    fn straight_frames_reach_their_edges() {
        let t = TemplateSource::Procedural.rasterize(16);
        // vertical: top-centre and bottom-centre opaque, left-centre transparent
        assert_eq!(alpha_at(&t, orientation::STRAIGHT_VERTICAL, 8, 0), 255);
        assert_eq!(alpha_at(&t, orientation::STRAIGHT_VERTICAL, 8, 15), 255);
        assert_eq!(alpha_at(&t, orientation::STRAIGHT_VERTICAL, 0, 8), 0);
        // horizontal is the transpose
        assert_eq!(alpha_at(&t, orientation::STRAIGHT_HORIZONTAL, 0, 8), 255);
        assert_eq!(alpha_at(&t, orientation::STRAIGHT_HORIZONTAL, 8, 0), 0);
    }

    #[test]
    fn corners_are_transparent() {
        let t = TemplateSource::Procedural.rasterize(16);
        for f in 0..FRAME_COUNT as FrameIndex {
            assert_eq!(alpha_at(&t, f, 0, 0), 0, "frame {f}");
            assert_eq!(alpha_at(&t, f, 15, 15), 0, "frame {f}");
        }
    }

    #[test]
    fn head_frames_have_dark_eyes() {
        let t = TemplateSource::Procedural.rasterize(32);
        for f in 11..=14 {
            assert!(t.frame(f).chunks(4).any(|px| px[3] == 255 && px[0] == EYE_INTENSITY), "frame {f}");
        }
        assert!(!t.frame(7).chunks(4).any(|px| px[3] == 255 && px[0] == EYE_INTENSITY));
    }

    #[test]
    fn zero_size_is_clamped() {
        let t = TemplateSource::Procedural.rasterize(0);
        assert_eq!(t.size(), 1);
        assert_eq!(t.frame(15).len(), 4);
    }

    #[cfg(feature = "png-sprites")]
    #[test]
    fn sheet_shape_is_checked() {
        let path = std::env::temp_dir().join(format!("snakegrid-sheet-{}.png", std::process::id()));
        image::RgbaImage::new(4, 60).save(&path).unwrap();
        let err = TemplateSource::load(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(matches!(err, TemplateError::BadShape { width: 4, height: 60 }));
    }

    #[cfg(feature = "png-sprites")]
    #[test]
    fn sheet_is_rescaled_to_cell_size() {
        let sheet = image::RgbaImage::from_pixel(2, 32, image::Rgba([200, 200, 200, 255]));
        let t = TemplateSource::Sheet(sheet).rasterize(6);
        assert_eq!(t.size(), 6);
        assert_eq!(t.frame(15).len(), 6 * 6 * 4);
        let px = &t.frame(3)[..4];
        assert!((198..=202).contains(&px[0]), "intensity {}", px[0]);
        assert_eq!(px[3], 255);
    }
}
