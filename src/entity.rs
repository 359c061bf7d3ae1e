use macroquad::math::{ivec2, IVec2};
use macroquad::prelude::*;
use tracing::debug;

use crate::config::WalkConfig;
use crate::error::ConfigError;
use crate::input::DirectionInput;
use crate::map::TileMap;
use crate::render::Surface;
use crate::spatial::{Direction, TilePos};
use crate::sprite::{AnimatedSprite, Animation, Facing};
use crate::ticker::Ticker;

/// What an entity walks on.
pub trait Terrain {
    /// Map size in tiles.
    fn map_size(&self) -> (i32, i32);
    /// Tile size in pixels.
    fn tile_size(&self) -> (i32, i32);
    /// Whether `pos` cannot be walked onto. Nothing is blocked by default.
    fn is_blocked(&self, _pos: TilePos) -> bool {
        false
    }
}

impl Terrain for TileMap {
    fn map_size(&self) -> (i32, i32) {
        (self.width() as i32, self.height() as i32)
    }

    fn tile_size(&self) -> (i32, i32) {
        let (w, h) = TileMap::tile_size(self);
        (w as i32, h as i32)
    }
}

/// A map whose non-zero tiles on one layer cannot be walked onto.
pub struct BlockingLayer<'a> {
    map: &'a TileMap,
    layer: &'a str,
}

impl TileMap {
    /// Treat every non-zero tile of `layer` as a wall.
    pub fn blocking<'a>(&'a self, layer: &'a str) -> BlockingLayer<'a> {
        BlockingLayer { map: self, layer }
    }
}

impl Terrain for BlockingLayer<'_> {
    fn map_size(&self) -> (i32, i32) {
        Terrain::map_size(self.map)
    }

    fn tile_size(&self) -> (i32, i32) {
        Terrain::tile_size(self.map)
    }

    fn is_blocked(&self, pos: TilePos) -> bool {
        self.map.is_blocked(self.layer, pos)
    }
}

/// What an [`Entity`] is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    /// Idle, sampling input every poll interval.
    Waiting,
    /// One tile move in progress.
    Walking {
        /// Tile being walked onto.
        target: TilePos,
        /// Direction of travel.
        direction: Direction,
    },
}

/// Emitted when an entity finishes moving from one tile to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepEvent {
    /// Tile the entity left.
    pub from: TilePos,
    /// Tile the entity arrived on.
    pub to: TilePos,
}

/// An animated sprite that walks the map one tile at a time.
pub struct Entity {
    pos: TilePos,
    /// Drawing offset for inter-tile animation, in pixels.
    offset: IVec2,
    sprite: AnimatedSprite,
    state: WalkState,
    config: WalkConfig,
    poll: Ticker,
    step: Ticker,
}

impl Entity {
    /// Place an idle entity at `(0, 0)`.
    ///
    /// Fails when `config` has a non-positive interval or step, which would
    /// leave the entity stuck mid-walk.
    pub fn new(sprite: AnimatedSprite, config: WalkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut entity = Self {
            pos: TilePos::default(),
            offset: IVec2::ZERO,
            sprite,
            state: WalkState::Waiting,
            poll: Ticker::new(config.poll_interval),
            step: Ticker::new(config.step_interval),
            config,
        };
        entity.enter_waiting();
        Ok(entity)
    }

    /// Current tile; updated when a walk completes.
    #[inline]
    pub fn position(&self) -> TilePos {
        self.pos
    }

    /// Pixel offset from the current tile while walking.
    #[inline]
    pub fn offset(&self) -> IVec2 {
        self.offset
    }

    /// Whether the entity is idle or mid-walk.
    #[inline]
    pub fn state(&self) -> WalkState {
        self.state
    }

    /// The sprite drawn for this entity.
    #[inline]
    pub fn sprite(&self) -> &AnimatedSprite {
        &self.sprite
    }

    /// Mutable access, e.g. to change animation from a trigger.
    #[inline]
    pub fn sprite_mut(&mut self) -> &mut AnimatedSprite {
        &mut self.sprite
    }

    /// Jump to `pos` with no inter-tile offset.
    pub fn teleport(&mut self, pos: TilePos) {
        self.pos = pos;
        self.offset = IVec2::ZERO;
    }

    /// Pixel position of the entity's tile corner, including the walk offset.
    pub fn pixel_position(&self, tile_w: u32, tile_h: u32) -> Vec2 {
        vec2(
            (self.pos.x * tile_w as i32 + self.offset.x) as f32,
            (self.pos.y * tile_h as i32 + self.offset.y) as f32,
        )
    }

    fn enter_waiting(&mut self) {
        self.state = WalkState::Waiting;
        self.poll.reset();
        self.sprite.set_animation(Animation::Idle);
    }

    fn enter_walking(&mut self, direction: Direction, terrain: &(impl Terrain + ?Sized)) {
        self.sprite.set_animation(Animation::Walk);
        self.sprite.set_facing(Facing::from(direction));
        self.step.reset();

        let (w, h) = terrain.map_size();
        let mut target = self.pos.step(direction).clamp_to(w, h);
        if target != self.pos && terrain.is_blocked(target) {
            target = self.pos;
        }

        debug!(
            from_x = self.pos.x,
            from_y = self.pos.y,
            to_x = target.x,
            to_y = target.y,
            ?direction,
            "walk"
        );
        self.state = WalkState::Walking { target, direction };
    }

    /// Advance the controller by `dt` seconds.
    ///
    /// Returns the completed move, if any, so the caller can fire tile triggers.
    pub fn update(
        &mut self,
        dt: f32,
        input: DirectionInput,
        terrain: &(impl Terrain + ?Sized),
    ) -> Option<StepEvent> {
        match self.state {
            WalkState::Waiting => {
                if self.poll.advance(dt) {
                    if let Some(direction) = input.direction() {
                        self.enter_walking(direction, terrain);
                    }
                }
                None
            }
            WalkState::Walking { target, direction } => {
                if target == self.pos {
                    self.enter_waiting();
                    return None;
                }

                if self.step.advance(dt) {
                    let (dx, dy) = direction.delta();
                    self.offset += ivec2(dx, dy) * self.config.step_pixels;
                    self.sprite.next_frame();
                }

                let (tw, th) = terrain.tile_size();
                if self.offset.x.abs() >= tw || self.offset.y.abs() >= th {
                    let from = self.pos;
                    self.teleport(target);
                    self.enter_waiting();
                    return Some(StepEvent { from, to: target });
                }
                None
            }
        }
    }

    /// Draw the current frame with the sprite's feet at the bottom centre of the
    /// tile whose top-left corner is `tile_origin` on screen.
    ///
    /// `tile_w`/`tile_h` are the on-screen tile size and `scale` the camera's
    /// scale factor; the sprite and its walk offset are stretched to match.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, tile_origin: Vec2, tile_w: u32, tile_h: u32, scale: u32) {
        let s = scale.max(1) as f32;
        let anchor = tile_origin + vec2(tile_w as f32 / 2.0, tile_h as f32);
        let dest = anchor + (self.offset.as_vec2() - self.sprite.feet()) * s;
        if scale > 1 {
            surface.blit_scaled(self.sprite.current_image(), dest, s);
        } else {
            surface.blit(self.sprite.current_image(), dest);
        }
    }
}
