//! Tile and map enter/exit triggers.
//!
//! Nothing here fires on its own: the caller reports movement through
//! [`TriggerTable::enter_tile`], [`TriggerTable::exit_tile`] (or
//! [`TriggerTable::actor_moved`]) and the map-level `enter_map`/`exit_map`.

use std::collections::HashMap;
use tracing::trace;

use crate::spatial::TilePos;

/// Callback taking the tile position and the actor involved.
pub type TileCallback<A> = Box<dyn FnMut(TilePos, &mut A)>;

/// Reacts to an actor entering or leaving a specific tile.
pub trait TriggerHandler<A> {
    /// Called after an actor arrives on the tile.
    fn on_enter(&mut self, _pos: TilePos, _actor: &mut A) {}
    /// Called before an actor leaves the tile.
    fn on_exit(&mut self, _pos: TilePos, _actor: &mut A) {}
}

/// A [`TriggerHandler`] made of two optional closures.
pub struct Trigger<A> {
    on_enter: Option<TileCallback<A>>,
    on_exit: Option<TileCallback<A>>,
}

impl<A> Trigger<A> {
    /// A trigger that does nothing.
    pub fn new() -> Self {
        Self {
            on_enter: None,
            on_exit: None,
        }
    }

    /// Run `f` when an actor enters.
    pub fn on_enter(mut self, f: impl FnMut(TilePos, &mut A) + 'static) -> Self {
        self.on_enter = Some(Box::new(f));
        self
    }

    /// Run `f` when an actor leaves.
    pub fn on_exit(mut self, f: impl FnMut(TilePos, &mut A) + 'static) -> Self {
        self.on_exit = Some(Box::new(f));
        self
    }
}

impl<A> Default for Trigger<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> TriggerHandler<A> for Trigger<A> {
    fn on_enter(&mut self, pos: TilePos, actor: &mut A) {
        if let Some(f) = self.on_enter.as_mut() {
            f(pos, actor);
        }
    }

    fn on_exit(&mut self, pos: TilePos, actor: &mut A) {
        if let Some(f) = self.on_exit.as_mut() {
            f(pos, actor);
        }
    }
}

/// Per-tile triggers plus map-wide enter/exit callbacks, for actors of type `A`.
pub struct TriggerTable<A> {
    triggers: HashMap<TilePos, Box<dyn TriggerHandler<A>>>,
    on_map_enter: Vec<TileCallback<A>>,
    on_map_exit: Vec<TileCallback<A>>,
}

impl<A> Default for TriggerTable<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> TriggerTable<A> {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            triggers: HashMap::new(),
            on_map_enter: Vec::new(),
            on_map_exit: Vec::new(),
        }
    }

    /// Install `handler` at `pos`, replacing whatever was there.
    pub fn add_trigger(&mut self, pos: TilePos, handler: impl TriggerHandler<A> + 'static) {
        if self.triggers.insert(pos, Box::new(handler)).is_some() {
            trace!(x = pos.x, y = pos.y, "trigger replaced");
        }
    }

    /// Callbacks run in registration order by [`enter_map`](Self::enter_map). There
    /// is no way to remove them.
    pub fn add_on_map_enter(&mut self, f: impl FnMut(TilePos, &mut A) + 'static) {
        self.on_map_enter.push(Box::new(f));
    }

    /// Callbacks run in registration order by [`exit_map`](Self::exit_map).
    pub fn add_on_map_exit(&mut self, f: impl FnMut(TilePos, &mut A) + 'static) {
        self.on_map_exit.push(Box::new(f));
    }

    /// Run every map-enter callback.
    pub fn enter_map(&mut self, pos: TilePos, actor: &mut A) {
        trace!(x = pos.x, y = pos.y, callbacks = self.on_map_enter.len(), "enter map");
        for f in &mut self.on_map_enter {
            f(pos, actor);
        }
    }

    /// Run every map-exit callback.
    pub fn exit_map(&mut self, pos: TilePos, actor: &mut A) {
        trace!(x = pos.x, y = pos.y, callbacks = self.on_map_exit.len(), "exit map");
        for f in &mut self.on_map_exit {
            f(pos, actor);
        }
    }

    /// Fire the enter handler at `pos`, if there is one.
    pub fn enter_tile(&mut self, pos: TilePos, actor: &mut A) {
        if let Some(t) = self.triggers.get_mut(&pos) {
            trace!(x = pos.x, y = pos.y, "enter tile trigger");
            t.on_enter(pos, actor);
        }
    }

    /// Fire the exit handler at `pos`, if there is one.
    pub fn exit_tile(&mut self, pos: TilePos, actor: &mut A) {
        if let Some(t) = self.triggers.get_mut(&pos) {
            trace!(x = pos.x, y = pos.y, "exit tile trigger");
            t.on_exit(pos, actor);
        }
    }

    /// Exit `from`, then enter `to`.
    pub fn actor_moved(&mut self, from: TilePos, to: TilePos, actor: &mut A) {
        self.exit_tile(from, actor);
        self.enter_tile(to, actor);
    }

    /// Whether a trigger is installed at `pos`.
    #[inline]
    pub fn contains(&self, pos: TilePos) -> bool {
        self.triggers.contains_key(&pos)
    }

    /// Number of tile triggers.
    #[inline]
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    /// `true` when no tile has a trigger.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Actor {
        log: Vec<String>,
    }

    fn p(x: i32, y: i32) -> TilePos {
        TilePos::new(x, y)
    }

    #[test]
    fn re_adding_a_trigger_overwrites_it() {
        let mut table = TriggerTable::<Actor>::new();
        table.add_trigger(p(3, 4), Trigger::new().on_enter(|_, a: &mut Actor| a.log.push("first".into())));
        table.add_trigger(p(3, 4), Trigger::new().on_enter(|_, a: &mut Actor| a.log.push("second".into())));
        assert_eq!(table.len(), 1);

        let mut actor = Actor::default();
        table.enter_tile(p(3, 4), &mut actor);
        assert_eq!(actor.log, vec!["second"]);
    }

    #[test]
    fn missing_trigger_is_a_no_op() {
        let mut table = TriggerTable::<Actor>::new();
        table.add_trigger(p(3, 4), Trigger::new().on_enter(|_, a: &mut Actor| a.log.push("x".into())));

        let mut actor = Actor::default();
        table.enter_tile(p(5, 5), &mut actor);
        table.exit_tile(p(5, 5), &mut actor);
        assert!(actor.log.is_empty());
    }

    #[test]
    fn absent_callbacks_are_skipped() {
        let mut table = TriggerTable::<Actor>::new();
        table.add_trigger(
            p(24, 24),
            Trigger::new().on_exit(|pos, a: &mut Actor| a.log.push(format!("leaving {},{}", pos.x, pos.y))),
        );

        let mut actor = Actor::default();
        table.enter_tile(p(24, 24), &mut actor);
        assert!(actor.log.is_empty());
        table.actor_moved(p(24, 24), p(25, 24), &mut actor);
        assert_eq!(actor.log, vec!["leaving 24,24"]);
    }

    #[test]
    fn map_callbacks_run_in_registration_order() {
        let mut table = TriggerTable::<Actor>::new();
        table.add_on_map_enter(|_, a: &mut Actor| a.log.push("one".into()));
        table.add_on_map_enter(|pos, a: &mut Actor| a.log.push(format!("two at {},{}", pos.x, pos.y)));
        table.add_on_map_exit(|_, a: &mut Actor| a.log.push("bye".into()));

        let mut actor = Actor::default();
        table.enter_map(p(12, 7), &mut actor);
        table.exit_map(p(12, 7), &mut actor);
        assert_eq!(actor.log, vec!["one", "two at 12,7", "bye"]);
    }

    struct Garden;

    impl TriggerHandler<Actor> for Garden {
        fn on_enter(&mut self, _pos: TilePos, actor: &mut Actor) {
            actor.log.push("GET OUT OF MY GARDEN".into());
        }
    }

    #[test]
    fn custom_handlers_work_alongside_closures() {
        let mut table = TriggerTable::<Actor>::new();
        for y in 12..15 {
            for x in 22..28 {
                table.add_trigger(p(x, y), Garden);
            }
        }
        assert_eq!(table.len(), 18);

        let mut actor = Actor::default();
        table.actor_moved(p(21, 12), p(22, 12), &mut actor);
        table.actor_moved(p(22, 12), p(23, 12), &mut actor);
        assert_eq!(actor.log.len(), 2);
        assert!(table.contains(p(27, 14)));
        assert!(!table.contains(p(28, 14)));
    }
}
