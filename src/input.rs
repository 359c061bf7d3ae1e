use macroquad::prelude::*;

use crate::spatial::Direction;

/// Already-normalized directional state from whatever input device is in use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionInput {
    /// Up is held.
    pub up: bool,
    /// Down is held.
    pub down: bool,
    /// Left is held.
    pub left: bool,
    /// Right is held.
    pub right: bool,
}

impl DirectionInput {
    /// Nothing pressed.
    pub const NONE: DirectionInput = DirectionInput {
        up: false,
        down: false,
        left: false,
        right: false,
    };

    /// Only `dir` pressed.
    pub fn only(dir: Direction) -> Self {
        let mut input = Self::NONE;
        match dir {
            Direction::Up => input.up = true,
            Direction::Down => input.down = true,
            Direction::Left => input.left = true,
            Direction::Right => input.right = true,
        }
        input
    }

    /// Sample WASD and the arrow keys. Needs a live Macroquad context.
    pub fn from_keyboard() -> Self {
        Self {
            up: is_key_down(KeyCode::W) || is_key_down(KeyCode::Up),
            down: is_key_down(KeyCode::S) || is_key_down(KeyCode::Down),
            left: is_key_down(KeyCode::A) || is_key_down(KeyCode::Left),
            right: is_key_down(KeyCode::D) || is_key_down(KeyCode::Right),
        }
    }

    /// First pressed direction in priority order up, down, left, right.
    pub fn direction(self) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| match d {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        })
    }

    /// Per-axis delta for free scrolling; later keys win on each axis.
    pub fn axis(self) -> (i32, i32) {
        let mut dx = 0;
        let mut dy = 0;
        if self.up {
            dy = -1;
        }
        if self.down {
            dy = 1;
        }
        if self.left {
            dx = -1;
        }
        if self.right {
            dx = 1;
        }
        (dx, dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_is_up_down_left_right() {
        let all = DirectionInput {
            up: true,
            down: true,
            left: true,
            right: true,
        };
        assert_eq!(all.direction(), Some(Direction::Up));
        let lr = DirectionInput {
            left: true,
            right: true,
            ..DirectionInput::NONE
        };
        assert_eq!(lr.direction(), Some(Direction::Left));
        assert_eq!(DirectionInput::NONE.direction(), None);
        assert_eq!(DirectionInput::only(Direction::Right).direction(), Some(Direction::Right));
    }

    #[test]
    fn axis_combines_both_axes() {
        let input = DirectionInput {
            up: true,
            right: true,
            ..DirectionInput::NONE
        };
        assert_eq!(input.axis(), (1, -1));
    }
}
