//! Animated sprites in the Liberated Pixel Cup sheet layout.
//!
//! <https://lpc.opengameart.org/static/lpc-style-guide/styleguide.html>
//!
//! * Each row is a complete animation cycle of 64x64 cells.
//! * Rows come in groups of four facings: away, left, forward, right.
//! * Row groups, top down: spellcast, thrust, walk, slash, shoot.
//! * `hurt` is the bottom row and only has one facing.
//! * `idle` is not on the sheet; it is the first `walk` frame.

use macroquad::prelude::*;
use std::fmt;
use std::str::FromStr;

use crate::atlas::{crop, TileImage};
use crate::error::SpriteError;
use crate::spatial::Direction;

/// LPC cell width in pixels.
pub const CELL_W: u32 = 64;
/// LPC cell height in pixels.
pub const CELL_H: u32 = 64;

/// LPC animations, in sheet order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Animation {
    /// 7 frames.
    Spellcast,
    /// 8 frames.
    Thrust,
    /// 9 frames; frame 0 doubles as the standing pose.
    Walk,
    /// 6 frames.
    Slash,
    /// 13 frames.
    Shoot,
    /// 6 frames, one row shared by every facing.
    Hurt,
    /// The first walk frame of each facing.
    Idle,
}

impl Animation {
    /// Every animation.
    pub const ALL: [Animation; 7] = [
        Animation::Spellcast,
        Animation::Thrust,
        Animation::Walk,
        Animation::Slash,
        Animation::Shoot,
        Animation::Hurt,
        Animation::Idle,
    ];

    /// Animations stored as four rows on the sheet, in sheet order.
    const ROW_GROUPS: [Animation; 5] = [
        Animation::Spellcast,
        Animation::Thrust,
        Animation::Walk,
        Animation::Slash,
        Animation::Shoot,
    ];

    /// Frames per facing.
    pub const fn frame_count(self) -> usize {
        match self {
            Animation::Spellcast => 7,
            Animation::Thrust => 8,
            Animation::Walk => 9,
            Animation::Slash => 6,
            Animation::Shoot => 13,
            Animation::Hurt => 6,
            Animation::Idle => 1,
        }
    }

    /// Lowercase name, as accepted by `FromStr`.
    pub const fn name(self) -> &'static str {
        match self {
            Animation::Spellcast => "spellcast",
            Animation::Thrust => "thrust",
            Animation::Walk => "walk",
            Animation::Slash => "slash",
            Animation::Shoot => "shoot",
            Animation::Hurt => "hurt",
            Animation::Idle => "idle",
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Animation {
    type Err = SpriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Animation::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| SpriteError::UnknownName {
                kind: "animation",
                name: s.to_owned(),
            })
    }
}

/// Which way a sprite faces. Order matches the sheet rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Back to the viewer, walking up.
    Away,
    /// Walking left.
    Left,
    /// Facing the viewer, walking down.
    Forward,
    /// Walking right.
    Right,
}

impl Facing {
    /// Every facing.
    pub const ALL: [Facing; 4] = [Facing::Away, Facing::Left, Facing::Forward, Facing::Right];

    /// Lowercase name, as accepted by `FromStr`.
    pub const fn name(self) -> &'static str {
        match self {
            Facing::Away => "away",
            Facing::Left => "left",
            Facing::Forward => "forward",
            Facing::Right => "right",
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

impl From<Direction> for Facing {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Up => Facing::Away,
            Direction::Down => Facing::Forward,
            Direction::Left => Facing::Left,
            Direction::Right => Facing::Right,
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Facing {
    type Err = SpriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Facing::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| SpriteError::UnknownName {
                kind: "facing",
                name: s.to_owned(),
            })
    }
}

type FrameTable = [[Vec<TileImage>; 4]; 7];

/// An LPC character sheet sliced into frames, plus the frame being shown.
pub struct AnimatedSprite {
    frames: FrameTable,
    animation: Animation,
    facing: Facing,
    frame: usize,
}

impl AnimatedSprite {
    /// Slice an LPC sheet. Starts on the first `walk` frame, facing forward.
    pub fn new(sheet: &Image) -> Result<Self, SpriteError> {
        let (width, height) = (sheet.width as u32, sheet.height as u32);
        let widest = Animation::ALL.iter().map(|a| a.frame_count()).max().unwrap_or(1) as u32;
        let needed_width = widest * CELL_W;
        let needed_height = (Animation::ROW_GROUPS.len() as u32 * 4 + 1) * CELL_H;
        if width < needed_width || height < needed_height {
            return Err(SpriteError::SheetTooSmall {
                width,
                height,
                needed_width,
                needed_height,
            });
        }

        let row = |y: u32, count: usize| -> Vec<TileImage> {
            (0..count as u32)
                .map(|i| TileImage::new(crop(sheet, i * CELL_W, y, CELL_W, CELL_H)))
                .collect()
        };

        let mut frames: FrameTable = std::array::from_fn(|_| std::array::from_fn(|_| Vec::new()));

        let mut y = 0;
        for anim in Animation::ROW_GROUPS {
            for facing in Facing::ALL {
                frames[anim.index()][facing.index()] = row(y, anim.frame_count());
                y += CELL_H;
            }
        }

        // One shared row for every facing.
        let hurt = row(height - CELL_H, Animation::Hurt.frame_count());
        for facing in Facing::ALL {
            frames[Animation::Hurt.index()][facing.index()] = hurt.clone();
        }

        for facing in Facing::ALL {
            let first_walk = frames[Animation::Walk.index()][facing.index()][0].clone();
            frames[Animation::Idle.index()][facing.index()] = vec![first_walk];
        }

        Ok(Self {
            frames,
            animation: Animation::Walk,
            facing: Facing::Forward,
            frame: 0,
        })
    }

    /// Current animation.
    #[inline]
    pub fn animation(&self) -> Animation {
        self.animation
    }

    /// Current facing.
    #[inline]
    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Index into the current animation and facing.
    #[inline]
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Cell size in pixels.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (CELL_W, CELL_H)
    }

    /// Where the feet are relative to the cell's top-left corner.
    #[inline]
    pub fn feet(&self) -> Vec2 {
        vec2((CELL_W / 2) as f32, (CELL_H - 2) as f32)
    }

    fn frames_now(&self) -> &[TileImage] {
        &self.frames[self.animation.index()][self.facing.index()]
    }

    fn check_frame(&mut self) {
        if self.frame >= self.frames_now().len() {
            self.frame = 0;
        }
    }

    /// Switch animation, keeping the frame index when it is still valid.
    pub fn set_animation(&mut self, animation: Animation) {
        self.animation = animation;
        self.check_frame();
    }

    /// Switch facing, keeping the frame index when it is still valid.
    pub fn set_facing(&mut self, facing: Facing) {
        self.facing = facing;
        self.check_frame();
    }

    /// Switch animation by its sheet name, e.g. `"slash"`.
    pub fn set_animation_by_name(&mut self, name: &str) -> Result<(), SpriteError> {
        self.set_animation(name.parse()?);
        Ok(())
    }

    /// Switch facing by name, e.g. `"left"`.
    pub fn set_facing_by_name(&mut self, name: &str) -> Result<(), SpriteError> {
        self.set_facing(name.parse()?);
        Ok(())
    }

    /// Advance one frame, wrapping to 0.
    pub fn next_frame(&mut self) {
        self.frame += 1;
        self.check_frame();
    }

    /// The frame to draw now.
    pub fn current_image(&self) -> &TileImage {
        &self.frames_now()[self.frame]
    }

    /// All frames of one animation and facing.
    pub fn frames(&self, animation: Animation, facing: Facing) -> &[TileImage] {
        &self.frames[animation.index()][facing.index()]
    }
}
