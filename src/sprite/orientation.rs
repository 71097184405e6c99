/// Orientation resolver: which of the 16 sprite frames represents a
/// body segment, given its neighbours on a toroidal grid.
///
/// Each segment has two classifications:
///   - `behind`: direction of travel from the tail-side neighbour into the cell
///   - `ahead`:  direction of travel from the cell into the head-side neighbour
///
/// A classification is `None` when the neighbour is absent (body end)
/// or not a single-step neighbour (teleport / respawn discontinuity).
///
/// Frame layout:
///   0        egg (one-cell body)
///   1..=4    turns
///   5, 6     straight vertical / horizontal
///   7..=10   end caps: tail, or a body cut off behind a teleport
///   11..=14  head caps
///   15       stub: no usable neighbour on either side

use crate::domain::coord::{Coord, GridSize};
use crate::domain::player::Body;

pub type FrameIndex = u8;

pub const FRAME_COUNT: usize = 16;

pub const EGG: FrameIndex = 0;
pub const STRAIGHT_VERTICAL: FrameIndex = 5;
pub const STRAIGHT_HORIZONTAL: FrameIndex = 6;
pub const STUB: FrameIndex = 15;

/// Single-step relation between two cells. `Up` means the cell nearer
/// the head sits one row above (y decreasing, with wraparound).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Heading {
    None,
    Up,
    Down,
    Left,
    Right,
}

/// Unit step along one axis: -1, 0, +1, or not a step.
/// The direct step is tested before the wrapped one, which decides
/// the two-cell-wide axis where both readings are possible.
fn axis_step(delta: i32, axis_len: u16) -> Option<i8> {
    let wrap = axis_len as i32 - 1;
    match delta {
        0 => Some(0),
        -1 => Some(-1),
        1 => Some(1),
        d if d == wrap => Some(-1),
        d if d == -wrap => Some(1),
        _ => None,
    }
}

/// Classify the step from `rhs` (tail side) to `lhs` (head side).
pub fn classify(lhs: Coord, rhs: Coord, size: GridSize) -> Heading {
    let dx = lhs.x as i32 - rhs.x as i32;
    let dy = lhs.y as i32 - rhs.y as i32;
    match (axis_step(dx, size.width), axis_step(dy, size.height)) {
        (Some(-1), Some(0)) => Heading::Left,
        (Some(1), Some(0)) => Heading::Right,
        (Some(0), Some(-1)) => Heading::Up,
        (Some(0), Some(1)) => Heading::Down,
        _ => Heading::None,
    }
}

fn classify_pair(lhs: Option<Coord>, rhs: Option<Coord>, size: GridSize) -> Heading {
    match (lhs, rhs) {
        (Some(l), Some(r)) => classify(l, r, size),
        _ => Heading::None,
    }
}

/// Frame for a segment from its normalized classification.
pub fn frame_from(behind: Heading, ahead: Heading, is_head: bool) -> FrameIndex {
    use Heading::*;
    match (behind, ahead, is_head) {
        (None, None, _) => STUB,

        (Down, Right, false) | (Left, Up, false) => 1,
        (Down, Left, false) | (Right, Up, false) => 2,
        (Up, Right, false) | (Left, Down, false) => 3,
        (Up, Left, false) | (Right, Down, false) => 4,

        (Up, Up, false) | (Down, Down, false) => STRAIGHT_VERTICAL,
        (Left, Left, false) | (Right, Right, false) => STRAIGHT_HORIZONTAL,

        (None, Up, false) => 7,
        (None, Down, false) => 8,
        (None, Left, false) => 9,
        (None, Right, false) => 10,

        (Down, None, false) => 7,
        (Up, None, false) => 8,
        (Right, None, false) => 9,
        (Left, None, false) => 10,

        (Up, None, true) => 11,
        (Down, None, true) => 12,
        (Left, None, true) => 13,
        (Right, None, true) => 14,

        // U-turns, and a head with a head-side neighbour. Neither
        // occurs on a well-formed body.
        _ => STUB,
    }
}

/// Frame for the segment at `index` of `body`.
pub fn frame_for(body: &Body, index: usize, size: GridSize) -> FrameIndex {
    if index == 0 && body.len() == 1 {
        return EGG;
    }
    let forward = index.checked_sub(1).and_then(|i| body.get(i));
    let current = body.get(index);
    let backward = body.get(index + 1);

    let behind = classify_pair(current, backward, size);
    let ahead = classify_pair(forward, current, size);
    frame_from(behind, ahead, index == 0)
}

/// Which cell edges a frame's sprite connects to, as (up, down, left, right).
/// Used to draw the procedural template.
pub fn connected_edges(frame: FrameIndex) -> (bool, bool, bool, bool) {
    match frame {
        1 => (true, false, false, true),
        2 => (true, false, true, false),
        3 => (false, true, false, true),
        4 => (false, true, true, false),
        STRAIGHT_VERTICAL => (true, true, false, false),
        STRAIGHT_HORIZONTAL => (false, false, true, true),
        7 | 12 => (true, false, false, false),
        8 | 11 => (false, true, false, false),
        9 | 14 => (false, false, true, false),
        10 | 13 => (false, false, false, true),
        _ => (false, false, false, false),
    }
}

pub fn is_head_frame(frame: FrameIndex) -> bool {
    (11..=14).contains(&frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coord::Direction;
    use proptest::prelude::*;

    fn body(cells: &[(u16, u16)]) -> Body {
        cells.iter().map(|&(x, y)| Coord::new(x, y)).collect()
    }

    fn frames(b: &Body, size: GridSize) -> Vec<FrameIndex> {
        (0..b.len()).map(|i| frame_for(b, i, size)).collect()
    }

    const TEN: GridSize = GridSize::new(10, 10);

    #[test]
    fn single_cell_is_an_egg() {
        assert_eq!(frame_for(&body(&[(5, 5)]), 0, TEN), EGG);
    }

    #[test]
    fn wrapped_horizontal_run_is_straight() {
        // Moving right across the x=9 → x=0 seam.
        let b = body(&[(0, 5), (9, 5), (8, 5)]);
        assert_eq!(classify(Coord::new(0, 5), Coord::new(9, 5), TEN), Heading::Right);
        assert_eq!(frames(&b, TEN), vec![14, STRAIGHT_HORIZONTAL, 10]);
    }

    #[test]
    fn wraparound_matches_unwrapped_classification() {
        for w in 3..12u16 {
            let size = GridSize::new(w, 7);
            for y in 0..7 {
                // right across the seam == right inside the grid
                assert_eq!(classify(Coord::new(0, y), Coord::new(w - 1, y), size), Heading::Right);
                assert_eq!(classify(Coord::new(2, y), Coord::new(1, y), size), Heading::Right);
                assert_eq!(classify(Coord::new(w - 1, y), Coord::new(0, y), size), Heading::Left);
                assert_eq!(classify(Coord::new(1, y), Coord::new(2, y), size), Heading::Left);
            }
        }
        let size = GridSize::new(7, 5);
        assert_eq!(classify(Coord::new(3, 4), Coord::new(3, 0), size), Heading::Up);
        assert_eq!(classify(Coord::new(3, 0), Coord::new(3, 4), size), Heading::Down);
    }

    #[test]
    fn non_adjacent_cells_do_not_classify() {
        assert_eq!(classify(Coord::new(2, 2), Coord::new(4, 2), TEN), Heading::None);
        assert_eq!(classify(Coord::new(2, 2), Coord::new(3, 3), TEN), Heading::None);
        assert_eq!(classify(Coord::new(2, 2), Coord::new(2, 2), TEN), Heading::None);
        assert_eq!(classify(Coord::new(0, 0), Coord::new(9, 9), TEN), Heading::None);
    }

    #[test]
    fn two_wide_axis_prefers_direct_step() {
        let size = GridSize::new(2, 10);
        assert_eq!(classify(Coord::new(1, 3), Coord::new(0, 3), size), Heading::Right);
        assert_eq!(classify(Coord::new(0, 3), Coord::new(1, 3), size), Heading::Left);
    }

    #[test]
    fn vertical_snake_moving_up() {
        let b = body(&[(3, 2), (3, 3), (3, 4)]);
        assert_eq!(frames(&b, TEN), vec![11, STRAIGHT_VERTICAL, 7]);
    }

    #[test]
    fn turns_use_one_frame_per_corner_shape() {
        // came down, then turned right
        let b = body(&[(4, 3), (3, 3), (3, 2)]);
        assert_eq!(frame_for(&b, 1, TEN), 1);
        // came right, then turned up: same corner shape (left + top edges)
        let b = body(&[(3, 2), (3, 3), (2, 3)]);
        assert_eq!(frame_for(&b, 1, TEN), 2);
        // came up, then turned right
        let b = body(&[(4, 3), (3, 3), (3, 4)]);
        assert_eq!(frame_for(&b, 1, TEN), 3);
        // came up, then turned left
        let b = body(&[(2, 3), (3, 3), (3, 4)]);
        assert_eq!(frame_for(&b, 1, TEN), 4);
    }

    #[test]
    fn teleported_body_gets_caps_and_stubs() {
        // head jumped from (2,2) to (8,8)
        let b = body(&[(8, 8), (2, 2), (2, 3)]);
        assert_eq!(frame_for(&b, 0, TEN), STUB);
        // (2,2): behind = came up from (2,3), nothing usable ahead
        assert_eq!(frame_for(&b, 1, TEN), 8);
        // tail, ahead = up
        assert_eq!(frame_for(&b, 2, TEN), 7);

        let severed = body(&[(1, 1), (5, 5), (9, 1)]);
        assert_eq!(frame_for(&severed, 1, TEN), STUB);
        assert_eq!(frame_for(&severed, 2, TEN), STUB);
    }

    #[test]
    fn every_frame_is_reachable() {
        use Heading::*;
        let dirs = [None, Up, Down, Left, Right];
        let mut seen = [false; FRAME_COUNT];
        seen[EGG as usize] = true;
        for &b in &dirs {
            for &a in &dirs {
                for head in [false, true] {
                    let f = frame_from(b, a, head) as usize;
                    assert!(f < FRAME_COUNT);
                    seen[f] = true;
                }
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn u_turn_falls_back_to_stub() {
        assert_eq!(frame_from(Heading::Up, Heading::Down, false), STUB);
        assert_eq!(frame_from(Heading::Left, Heading::Right, false), STUB);
    }

    #[test]
    fn caps_face_their_neighbour() {
        for frame in 7..=14 {
            let (u, d, l, r) = connected_edges(frame);
            assert_eq!([u, d, l, r].iter().filter(|&&e| e).count(), 1, "frame {frame}");
        }
        assert!(is_head_frame(11));
        assert!(!is_head_frame(7));
    }

    // ── Properties ──

    fn heading_of(dir: Direction) -> Heading {
        match dir {
            Direction::Up => Heading::Up,
            Direction::Down => Heading::Down,
            Direction::Left => Heading::Left,
            Direction::Right => Heading::Right,
        }
    }

    fn opposite(h: Heading) -> Heading {
        match h {
            Heading::Up => Heading::Down,
            Heading::Down => Heading::Up,
            Heading::Left => Heading::Right,
            Heading::Right => Heading::Left,
            Heading::None => Heading::None,
        }
    }

    /// A grid of at least 3x3 and a cell inside it.
    fn grid_and_cell() -> impl Strategy<Value = (GridSize, Coord)> {
        (3u16..=u16::MAX, 3u16..=u16::MAX).prop_flat_map(|(w, h)| {
            (Just(GridSize::new(w, h)), (0..w, 0..h).prop_map(|(x, y)| Coord::new(x, y)))
        })
    }

    fn direction() -> impl Strategy<Value = Direction> {
        prop::sample::select(Direction::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn adjacent_cells_classify_the_same_everywhere(
            (size, cell) in grid_and_cell(),
            dir in direction(),
        ) {
            let next = cell.step(dir, size);
            prop_assert_eq!(classify(next, cell, size), heading_of(dir));
            prop_assert_eq!(classify(cell, next, size), opposite(heading_of(dir)));
        }

        #[test]
        fn straight_run_is_straight_across_any_seam(
            (size, start) in grid_and_cell(),
            dir in direction(),
            len in 3usize..12,
        ) {
            // tail at `start`, head `len - 1` steps further along `dir`
            let mut cells = vec![start];
            for _ in 1..len {
                let last = cells[cells.len() - 1];
                cells.push(last.step(dir, size));
            }
            cells.reverse();
            let b: Body = cells.into_iter().collect();
            let straight = match dir {
                Direction::Up | Direction::Down => STRAIGHT_VERTICAL,
                Direction::Left | Direction::Right => STRAIGHT_HORIZONTAL,
            };
            for i in 1..len - 1 {
                prop_assert_eq!(frame_for(&b, i, size), straight);
            }
            prop_assert!(is_head_frame(frame_for(&b, 0, size)));
        }
    }
}
