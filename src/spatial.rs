use macroquad::prelude::*;

/// Tiled horizontal flip flag.
pub const FLIP_H: u32 = 0x8000_0000;
/// Tiled vertical flip flag.
pub const FLIP_V: u32 = 0x4000_0000;
/// Tiled diagonal flip flag.
pub const FLIP_D: u32 = 0x2000_0000;
/// GID bits left once the flip flags are masked off.
pub const GID_MASK: u32 = 0x1FFF_FFFF;

/// A position in tile coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TilePos {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl TilePos {
    /// Tile `(x, y)`.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring tile in `dir`.
    #[inline]
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Clamp into `[0, width) x [0, height)`.
    pub fn clamp_to(self, width: i32, height: i32) -> Self {
        Self::new(
            self.x.clamp(0, (width - 1).max(0)),
            self.y.clamp(0, (height - 1).max(0)),
        )
    }

    /// Inside `[0, width) x [0, height)`.
    #[inline]
    pub fn in_bounds(self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.x < width && self.y >= 0 && self.y < height
    }
}

impl From<(i32, i32)> for TilePos {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// One of the four cardinal directions an entity can walk in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards row 0.
    Up,
    /// Towards the last row.
    Down,
    /// Towards column 0.
    Left,
    /// Towards the last column.
    Right,
}

impl Direction {
    /// Every direction, in input priority order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit tile delta, `y` growing downwards.
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Row-major index of `pos`, or `None` when it lies outside the grid.
#[inline]
pub fn grid_index(pos: TilePos, width: u32, height: u32) -> Option<usize> {
    if pos.in_bounds(width as i32, height as i32) {
        Some(pos.y as usize * width as usize + pos.x as usize)
    } else {
        None
    }
}

/// Tile containing pixel `p`; negative pixels map to negative tiles.
#[inline]
pub fn pixel_to_tile(p: Vec2, tile_w: u32, tile_h: u32) -> TilePos {
    TilePos::new(
        (p.x.floor() as i32).div_euclid(tile_w as i32),
        (p.y.floor() as i32).div_euclid(tile_h as i32),
    )
}

/// Top-left pixel of `pos`.
#[inline]
pub fn tile_to_pixel(pos: TilePos, tile_w: u32, tile_h: u32) -> Vec2 {
    vec2(
        (pos.x * tile_w as i32) as f32,
        (pos.y * tile_h as i32) as f32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_index_is_row_major_and_rejects_outside() {
        assert_eq!(grid_index(TilePos::new(2, 1), 4, 3), Some(6));
        assert_eq!(grid_index(TilePos::new(4, 0), 4, 3), None);
        assert_eq!(grid_index(TilePos::new(0, -1), 4, 3), None);
    }

    #[test]
    fn pixel_to_tile_floors_negative_coordinates() {
        assert_eq!(pixel_to_tile(vec2(-1.0, 33.0), 32, 32), TilePos::new(-1, 1));
        assert_eq!(tile_to_pixel(TilePos::new(2, 3), 16, 8), vec2(32.0, 24.0));
    }

    #[test]
    fn clamp_keeps_positions_on_the_map() {
        assert_eq!(TilePos::new(-1, 0).clamp_to(20, 20), TilePos::new(0, 0));
        assert_eq!(TilePos::new(20, 5).clamp_to(20, 20), TilePos::new(19, 5));
    }
}
