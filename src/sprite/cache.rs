/// Per-colour cache of tinted sprite frames.
///
/// Frames are rasterized at a fixed cell pixel size, never scaled at
/// draw time. A change of cell size therefore invalidates every entry;
/// `resize` regenerates the frames of all active hues before returning,
/// so the next draw always finds them.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::domain::player::Hue;

use super::color::{hue_to_rgb, Rgb};
use super::orientation::{FrameIndex, FRAME_COUNT};
use super::template::{SpriteTemplate, TemplateSource};

/// One tinted RGBA frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub size: u32,
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.size + x) * 4) as usize;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }
}

/// All 16 frames of one hue at one size.
#[derive(Clone, Debug)]
pub struct FrameSet {
    frames: Vec<Frame>,
}

impl FrameSet {
    pub fn frame(&self, index: FrameIndex) -> &Frame {
        &self.frames[index as usize]
    }
}

/// Tint one template frame: RGB = colour × intensity / 255, alpha kept.
/// Transparent template pixels stay fully transparent.
pub fn tint(template: &[u8], size: u32, color: Rgb) -> Frame {
    let (r, g, b) = color;
    let mut pixels = vec![0u8; template.len()];
    for (src, dst) in template.chunks_exact(4).zip(pixels.chunks_exact_mut(4)) {
        let alpha = src[3];
        if alpha == 0 {
            continue;
        }
        let intensity = src[0] as u32;
        let scale = |c: u8| ((c as u32 * intensity + 127) / 255) as u8;
        dst[0] = scale(r);
        dst[1] = scale(g);
        dst[2] = scale(b);
        dst[3] = alpha;
    }
    Frame { size, pixels }
}

pub struct SpriteFrameCache {
    source: TemplateSource,
    cell_px: u32,
    template: SpriteTemplate,
    sets: HashMap<(Hue, u32), FrameSet>,
    /// Number of frame sets generated so far.
    generated: usize,
}

impl SpriteFrameCache {
    pub fn new(source: TemplateSource, cell_px: u32) -> Self {
        let cell_px = cell_px.max(1);
        let template = source.rasterize(cell_px);
        SpriteFrameCache {
            source,
            cell_px,
            template,
            sets: HashMap::new(),
            generated: 0,
        }
    }

    pub fn cell_px(&self) -> u32 {
        self.cell_px
    }

    /// Frames for `hue` at `cell_px`, generating them on a miss.
    /// A different `cell_px` than the current one invalidates the cache.
    pub fn get(&mut self, hue: Hue, cell_px: u32) -> &FrameSet {
        let cell_px = cell_px.max(1);
        if cell_px != self.cell_px {
            self.invalidate(cell_px);
        }
        let hue = hue % 360;
        let template = &self.template;
        let generated = &mut self.generated;
        self.sets.entry((hue, cell_px)).or_insert_with(|| {
            *generated += 1;
            build_set(template, hue)
        })
    }

    /// Switch to a new cell size and regenerate frames for every hue in
    /// `active`. Returns once all of them exist.
    pub fn resize<I>(&mut self, cell_px: u32, active: I)
    where
        I: IntoIterator<Item = Hue>,
    {
        let cell_px = cell_px.max(1);
        if cell_px != self.cell_px {
            self.invalidate(cell_px);
        }
        let hues: HashSet<Hue> = active.into_iter().map(|h| h % 360).collect();
        for hue in hues {
            self.get(hue, cell_px);
        }
    }

    fn invalidate(&mut self, cell_px: u32) {
        debug!(from = self.cell_px, to = cell_px, dropped = self.sets.len(), "sprite cache invalidated");
        self.sets.clear();
        self.cell_px = cell_px;
        self.template = self.source.rasterize(cell_px);
    }

    #[allow(dead_code)]
    pub fn contains(&self, hue: Hue) -> bool {
        self.sets.contains_key(&(hue % 360, self.cell_px))
    }

    #[allow(dead_code)]
    pub fn generated(&self) -> usize {
        self.generated
    }
}

fn build_set(template: &SpriteTemplate, hue: Hue) -> FrameSet {
    let color = hue_to_rgb(hue);
    let frames = (0..FRAME_COUNT as FrameIndex)
        .map(|f| tint(template.frame(f), template.size(), color))
        .collect();
    FrameSet { frames }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tint_scales_by_intensity_and_keeps_alpha() {
        let template = [255, 255, 255, 255, 128, 128, 128, 200, 90, 90, 90, 0];
        let frame = tint(&template, 1, (255, 100, 0));
        assert_eq!(&frame.pixels[0..4], &[255, 100, 0, 255]);
        assert_eq!(&frame.pixels[4..8], &[128, 50, 0, 200]);
        // transparent template pixel stays untouched
        assert_eq!(&frame.pixels[8..12], &[0, 0, 0, 0]);
    }

    #[test]
    fn frames_follow_the_requested_size() {
        let mut cache = SpriteFrameCache::new(TemplateSource::Procedural, 8);
        let set = cache.get(120, 8);
        assert_eq!(set.frame(0).size, 8);
        assert_eq!(set.frame(15).pixels.len(), 8 * 8 * 4);
    }

    #[test]
    fn hits_do_not_regenerate() {
        let mut cache = SpriteFrameCache::new(TemplateSource::Procedural, 6);
        cache.get(10, 6);
        cache.get(10, 6);
        cache.get(370, 6);
        assert_eq!(cache.generated(), 1);
        cache.get(11, 6);
        assert_eq!(cache.generated(), 2);
    }

    #[test]
    fn resize_regenerates_all_active_hues() {
        let mut cache = SpriteFrameCache::new(TemplateSource::Procedural, 6);
        cache.get(0, 6);
        cache.get(200, 6);
        cache.resize(10, [0, 200, 200]);
        assert_eq!(cache.cell_px(), 10);
        assert!(cache.contains(0));
        assert!(cache.contains(200));
        assert_eq!(cache.generated(), 4);
        // already generated at the new size: no further work
        assert_eq!(cache.get(200, 10).frame(3).size, 10);
        assert_eq!(cache.generated(), 4);
    }

    #[test]
    fn size_change_drops_inactive_hues() {
        let mut cache = SpriteFrameCache::new(TemplateSource::Procedural, 6);
        cache.get(50, 6);
        cache.resize(7, [90]);
        assert!(!cache.contains(50));
        assert!(cache.contains(90));
    }

    #[test]
    fn tinted_body_pixels_carry_the_hue() {
        let mut cache = SpriteFrameCache::new(TemplateSource::Procedural, 16);
        let frame = cache.get(240, 16).frame(5).clone();
        // centre of a straight vertical segment: pure blue, scaled
        let [r, g, b, a] = frame.pixel(8, 8);
        assert_eq!((r, g, a), (0, 0, 255));
        assert!(b > 200);
    }
}
