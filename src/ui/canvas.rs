/// Pixel canvas: the drawing surface behind the terminal renderer.
///
/// The world speaks to it through `Canvas` (draw a sprite frame, clear a
/// cell, draw a perk). Sprite frames come from the per-hue cache at the
/// current cell pixel size; the canvas never scales them.

use tracing::info;

use crate::domain::coord::{Coord, GridSize};
use crate::domain::perk::PerkKind;
use crate::domain::player::Hue;
use crate::sim::event::WorldEvent;
use crate::sprite::cache::{Frame, SpriteFrameCache};
use crate::sprite::color::Rgb;
use crate::sprite::orientation::FrameIndex;

pub const BACKGROUND: Rgb = (22, 22, 35);
pub const BORDER: Rgb = (70, 70, 95);

pub trait Canvas {
    /// Clear the cell, then draw the sprite frame tinted with `hue`.
    fn draw_frame(&mut self, cell: Coord, frame: FrameIndex, hue: Hue);
    fn clear_cell(&mut self, cell: Coord);
    fn draw_perk(&mut self, cell: Coord, kind: PerkKind, owned: bool);
}

/// Issue draw instructions in order. Returns true if a full repaint
/// was requested; the caller then clears and redraws the whole world.
pub fn dispatch(events: &[WorldEvent], canvas: &mut dyn Canvas) -> bool {
    let mut repaint = false;
    for event in events {
        match *event {
            WorldEvent::DrawFrame { cell, frame, hue } => canvas.draw_frame(cell, frame, hue),
            WorldEvent::ClearCell(cell) => canvas.clear_cell(cell),
            WorldEvent::DrawPerk { cell, kind, owned } => canvas.draw_perk(cell, kind, owned),
            WorldEvent::Repaint => repaint = true,
            WorldEvent::StaleReference { .. } => {}
        }
    }
    repaint
}

/// Largest whole cell size that fits the grid plus border into the area.
pub fn cell_px_for(area_w: u32, area_h: u32, grid: GridSize, border: u32) -> u32 {
    if grid.width == 0 || grid.height == 0 {
        return 1;
    }
    let w = area_w.saturating_sub(2 * border) / grid.width as u32;
    let h = area_h.saturating_sub(2 * border) / grid.height as u32;
    w.min(h).max(1)
}

pub struct PixelCanvas {
    grid: GridSize,
    cell_px: u32,
    border: u32,
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
    sprites: SpriteFrameCache,
}

impl PixelCanvas {
    pub fn new(sprites: SpriteFrameCache, border: u32) -> Self {
        let cell_px = sprites.cell_px();
        PixelCanvas {
            grid: GridSize::new(0, 0),
            cell_px,
            border,
            width: 0,
            height: 0,
            pixels: Vec::new(),
            sprites,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_px(&self) -> u32 {
        self.cell_px
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        if x < self.width && y < self.height {
            self.pixels[y as usize * self.width as usize + x as usize]
        } else {
            BACKGROUND
        }
    }

    /// Size the canvas for `grid` at `cell_px`, clipped to the `visible`
    /// pixel area, and regenerate sprite frames for every active hue.
    /// Everything previously drawn is lost.
    pub fn layout<I>(&mut self, grid: GridSize, cell_px: u32, visible: (u32, u32), active: I)
    where
        I: IntoIterator<Item = Hue>,
    {
        let cell_px = cell_px.max(1);
        if cell_px != self.cell_px || grid != self.grid {
            info!(width = grid.width, height = grid.height, cell_px, "canvas layout");
        }
        self.sprites.resize(cell_px, active);
        self.grid = grid;
        self.cell_px = cell_px;
        self.width = self.span(grid.width, cell_px).min(visible.0 as u64) as u32;
        self.height = self.span(grid.height, cell_px).min(visible.1 as u64) as u32;
        self.clear_all();
    }

    /// Full pixel extent of `cells` cells plus both borders.
    fn span(&self, cells: u16, cell_px: u32) -> u64 {
        cells as u64 * cell_px as u64 + 2 * self.border as u64
    }

    /// Background everywhere, border around the grid.
    pub fn clear_all(&mut self) {
        self.pixels.clear();
        self.pixels.resize(self.width as usize * self.height as usize, BACKGROUND);
        let b = self.border;
        let (right, bottom) = (self.width.saturating_sub(b), self.height.saturating_sub(b));
        for y in 0..self.height {
            for x in 0..self.width {
                if x < b || y < b || x >= right || y >= bottom {
                    self.pixels[(y * self.width + x) as usize] = BORDER;
                }
            }
        }
    }

    /// Top-left pixel of a cell, or `None` when the cell is outside the
    /// grid or not entirely on the canvas.
    fn origin(&self, cell: Coord) -> Option<(u32, u32)> {
        if !self.grid.contains(cell) {
            return None;
        }
        let x0 = self.border as u64 + cell.x as u64 * self.cell_px as u64;
        let y0 = self.border as u64 + cell.y as u64 * self.cell_px as u64;
        let fits = |start: u64, limit: u32| start + self.cell_px as u64 <= limit as u64;
        (fits(x0, self.width) && fits(y0, self.height)).then(|| (x0 as u32, y0 as u32))
    }

    fn fill_cell(&mut self, (x0, y0): (u32, u32), color: Rgb) {
        for y in y0..y0 + self.cell_px {
            let row = y as usize * self.width as usize;
            self.pixels[row + x0 as usize..row + (x0 + self.cell_px) as usize].fill(color);
        }
    }
}

/// Alpha-blend a tinted frame over the canvas at (x0, y0).
fn blit(pixels: &mut [Rgb], stride: u32, (x0, y0): (u32, u32), frame: &Frame) {
    for fy in 0..frame.size {
        for fx in 0..frame.size {
            let [r, g, b, a] = frame.pixel(fx, fy);
            if a == 0 {
                continue;
            }
            let i = ((y0 + fy) * stride + x0 + fx) as usize;
            let (dr, dg, db) = pixels[i];
            let mix = |s: u8, d: u8| ((s as u32 * a as u32 + d as u32 * (255 - a as u32) + 127) / 255) as u8;
            pixels[i] = (mix(r, dr), mix(g, dg), mix(b, db));
        }
    }
}

impl Canvas for PixelCanvas {
    fn draw_frame(&mut self, cell: Coord, frame: FrameIndex, hue: Hue) {
        let Some(origin) = self.origin(cell) else { return };
        self.fill_cell(origin, BACKGROUND);
        let set = self.sprites.get(hue, self.cell_px);
        blit(&mut self.pixels, self.width, origin, set.frame(frame));
    }

    fn clear_cell(&mut self, cell: Coord) {
        if let Some(origin) = self.origin(cell) {
            self.fill_cell(origin, BACKGROUND);
        }
    }

    /// Filled disc of radius cell/4, centred. Unknown kinds draw nothing.
    fn draw_perk(&mut self, cell: Coord, kind: PerkKind, owned: bool) {
        let Some((x0, y0)) = self.origin(cell) else { return };
        self.fill_cell((x0, y0), BACKGROUND);
        let Some(color) = kind.color(owned) else { return };
        let size = self.cell_px as f32;
        let radius = (size / 4.0).max(0.5);
        for py in 0..self.cell_px {
            for px in 0..self.cell_px {
                let dx = px as f32 + 0.5 - size / 2.0;
                let dy = py as f32 + 0.5 - size / 2.0;
                if dx * dx + dy * dy <= radius * radius {
                    self.pixels[((y0 + py) * self.width + x0 + px) as usize] = color;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::color::hue_to_rgb;
    use crate::sprite::template::TemplateSource;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Canvas for Recorder {
        fn draw_frame(&mut self, cell: Coord, frame: FrameIndex, hue: Hue) {
            self.calls.push(format!("frame {cell} {frame} {hue}"));
        }
        fn clear_cell(&mut self, cell: Coord) {
            self.calls.push(format!("clear {cell}"));
        }
        fn draw_perk(&mut self, cell: Coord, kind: PerkKind, owned: bool) {
            self.calls.push(format!("perk {cell} {kind:?} {owned}"));
        }
    }

    const UNCLIPPED: (u32, u32) = (u32::MAX, u32::MAX);

    fn canvas(cell_px: u32) -> PixelCanvas {
        let mut c = PixelCanvas::new(SpriteFrameCache::new(TemplateSource::Procedural, cell_px), 1);
        c.layout(GridSize::new(4, 3), cell_px, UNCLIPPED, [0]);
        c
    }

    #[test]
    fn dispatch_preserves_order_and_skips_stale() {
        let events = [
            WorldEvent::ClearCell(Coord::new(1, 2)),
            WorldEvent::StaleReference { player: 3, body: None },
            WorldEvent::DrawFrame { cell: Coord::new(1, 1), frame: 6, hue: 40 },
            WorldEvent::DrawPerk { cell: Coord::new(0, 0), kind: PerkKind::Food, owned: false },
        ];
        let mut rec = Recorder::default();
        assert!(!dispatch(&events, &mut rec));
        assert_eq!(rec.calls, vec!["clear (1, 2)", "frame (1, 1) 6 40", "perk (0, 0) Food false"]);
        assert!(dispatch(&[WorldEvent::Repaint], &mut rec));
    }

    #[test]
    fn cell_size_uses_the_tighter_axis() {
        let grid = GridSize::new(10, 5);
        assert_eq!(cell_px_for(102, 200, grid, 1), 10);
        assert_eq!(cell_px_for(400, 32, grid, 1), 6);
        assert_eq!(cell_px_for(3, 3, grid, 1), 1);
        assert_eq!(cell_px_for(100, 100, GridSize::new(0, 0), 1), 1);
    }

    #[test]
    fn layout_sizes_canvas_with_border() {
        let c = canvas(8);
        assert_eq!((c.width(), c.height()), (4 * 8 + 2, 3 * 8 + 2));
        assert_eq!(c.pixel(0, 0), BORDER);
        assert_eq!(c.pixel(1, 1), BACKGROUND);
    }

    #[test]
    fn frame_is_drawn_in_its_cell_with_the_hue() {
        let mut c = canvas(8);
        c.draw_frame(Coord::new(1, 0), 6, 240);
        // horizontal straight through the middle of cell (1, 0)
        let (r, g, b) = c.pixel(1 + 8 + 4, 1 + 4);
        assert_eq!((r, g), (0, 0));
        assert!(b > 150);
        // neighbouring cell untouched
        assert_eq!(c.pixel(1 + 4, 1 + 4), BACKGROUND);

        c.clear_cell(Coord::new(1, 0));
        assert_eq!(c.pixel(1 + 8 + 4, 1 + 4), BACKGROUND);
    }

    #[test]
    fn perks_draw_discs_and_unknown_kinds_draw_nothing() {
        let mut c = canvas(8);
        c.draw_perk(Coord::new(2, 2), PerkKind::Mine, true);
        let centre = (1 + 2 * 8 + 4, 1 + 2 * 8 + 4);
        assert_eq!(c.pixel(centre.0, centre.1), (0x6b, 0, 0));
        assert_eq!(c.pixel(1 + 2 * 8, 1 + 2 * 8), BACKGROUND);

        c.draw_perk(Coord::new(2, 2), PerkKind::Unknown(77), false);
        assert_eq!(c.pixel(centre.0, centre.1), BACKGROUND);
    }

    #[test]
    fn cells_outside_grid_are_ignored() {
        let mut c = canvas(4);
        c.draw_frame(Coord::new(9, 9), 0, 10);
        c.draw_perk(Coord::new(4, 0), PerkKind::Food, false);
        c.clear_cell(Coord::new(0, 3));
        assert!((0..c.height()).all(|y| (0..c.width()).all(|x| {
            let p = c.pixel(x, y);
            p == BACKGROUND || p == BORDER
        })));
    }

    #[test]
    fn relayout_regenerates_frames_at_new_size() {
        let mut c = canvas(4);
        c.layout(GridSize::new(4, 3), 6, UNCLIPPED, [120]);
        assert_eq!(c.cell_px(), 6);
        c.draw_frame(Coord::new(0, 0), 5, 120);
        // vertical straight: centre column of cell (0, 0) is green
        let (r, g, b) = c.pixel(1 + 3, 1 + 3);
        assert_eq!((r, b), (0, 0));
        assert!(g > 150 && g <= hue_to_rgb(120).1);
    }

    #[test]
    fn canvas_is_clipped_to_the_visible_area() {
        let mut c = PixelCanvas::new(SpriteFrameCache::new(TemplateSource::Procedural, 8), 1);
        c.layout(GridSize::new(4, 3), 8, (20, 12), [0]);
        assert_eq!((c.width(), c.height()), (20, 12));

        c.draw_perk(Coord::new(1, 0), PerkKind::Food, false);
        assert_ne!(c.pixel(1 + 8 + 4, 1 + 4), BACKGROUND);

        // (2, 0) would straddle the right edge, (0, 1) the bottom edge
        c.draw_perk(Coord::new(2, 0), PerkKind::Food, false);
        c.draw_frame(Coord::new(0, 1), 5, 0);
        assert_eq!(c.pixel(17, 4), BACKGROUND);
        assert_eq!(c.pixel(4, 10), BACKGROUND);
    }

    #[test]
    fn largest_wire_grid_lays_out_within_the_terminal() {
        use crate::net::game::GameEvent;
        use crate::sim::session::GameSession;

        let size = GridSize::new(u16::MAX, u16::MAX);
        let create = GameEvent::Create { size, name: String::from("huge"), self_id: 1 };
        let mut session = GameSession::new();
        let events = session.handle(&create.encode().unwrap()).unwrap();

        let mut c = PixelCanvas::new(SpriteFrameCache::new(TemplateSource::Procedural, 1), 1);
        assert!(dispatch(&events, &mut c));
        let cell_px = cell_px_for(200, 100, size, 1);
        assert_eq!(cell_px, 1);
        c.layout(size, cell_px, (200, 100), session.active_hues());
        assert_eq!((c.width(), c.height()), (200, 100));
        dispatch(&session.repaint(), &mut c);

        c.draw_perk(Coord::new(u16::MAX - 1, u16::MAX - 1), PerkKind::Food, false);
        c.draw_perk(Coord::new(3, 3), PerkKind::Food, false);
        assert_eq!(c.pixel(199, 99), BORDER);
        assert_ne!(c.pixel(4, 4), BACKGROUND);
    }
}
