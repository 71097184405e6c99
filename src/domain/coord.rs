/// Grid geometry: cells, grid size and toroidal movement.
///
/// Coordinates are unsigned 16-bit on the wire and in memory.
/// The grid wraps on both axes: stepping past an edge lands on the
/// opposite edge of the same row/column.

use std::fmt;

/// A cell position. Used directly as a map key (no string keys).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Coord {
    pub x: u16,
    pub y: u16,
}

impl Coord {
    pub const fn new(x: u16, y: u16) -> Self {
        Coord { x, y }
    }

    /// Neighbouring cell in `dir`, wrapping around the grid edges.
    pub fn step(self, dir: Direction, size: GridSize) -> Coord {
        let (w, h) = (size.width.max(1), size.height.max(1));
        match dir {
            Direction::Up => Coord::new(self.x, if self.y == 0 { h - 1 } else { self.y - 1 }),
            Direction::Down => Coord::new(self.x, if self.y + 1 >= h { 0 } else { self.y + 1 }),
            Direction::Left => Coord::new(if self.x == 0 { w - 1 } else { self.x - 1 }, self.y),
            Direction::Right => Coord::new(if self.x + 1 >= w { 0 } else { self.x + 1 }, self.y),
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct GridSize {
    pub width: u16,
    pub height: u16,
}

impl GridSize {
    pub const fn new(width: u16, height: u16) -> Self {
        GridSize { width, height }
    }

    pub fn contains(&self, c: Coord) -> bool {
        c.x < self.width && c.y < self.height
    }
}

/// Cardinal direction. Wire values: 0=up, 1=down, 2=left, 3=right.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn wire_value(self) -> u8 {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Direction::Up),
            1 => Some(Direction::Down),
            2 => Some(Direction::Left),
            3 => Some(Direction::Right),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_wraps_on_every_edge() {
        let size = GridSize::new(10, 8);
        assert_eq!(Coord::new(0, 3).step(Direction::Left, size), Coord::new(9, 3));
        assert_eq!(Coord::new(9, 3).step(Direction::Right, size), Coord::new(0, 3));
        assert_eq!(Coord::new(4, 0).step(Direction::Up, size), Coord::new(4, 7));
        assert_eq!(Coord::new(4, 7).step(Direction::Down, size), Coord::new(4, 0));
    }

    #[test]
    fn step_inside_grid() {
        let size = GridSize::new(10, 10);
        let c = Coord::new(5, 5);
        assert_eq!(c.step(Direction::Up, size), Coord::new(5, 4));
        assert_eq!(c.step(Direction::Down, size), Coord::new(5, 6));
        assert_eq!(c.step(Direction::Left, size), Coord::new(4, 5));
        assert_eq!(c.step(Direction::Right, size), Coord::new(6, 5));
    }

    #[test]
    fn direction_wire_values() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_wire(dir.wire_value()), Some(dir));
        }
        assert_eq!(Direction::from_wire(4), None);
    }
}
