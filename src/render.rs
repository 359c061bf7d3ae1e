//! Drawing targets for tiles and sprites.

use macroquad::prelude::*;
use std::collections::HashMap;

use crate::atlas::{ImageKey, TileImage};

/// Frames an unused texture survives in a [`ScreenSurface`] by default.
pub const DEFAULT_MAX_IDLE_FRAMES: u64 = 120;

/// Anything the camera and sprites can be drawn onto.
pub trait Surface {
    /// Draw `image` unscaled with its top-left corner at `dest` (screen pixels).
    fn blit(&mut self, image: &TileImage, dest: Vec2);

    /// Draw `image` stretched `scale` times. Surfaces that cannot resample
    /// draw it at native size.
    fn blit_scaled(&mut self, image: &TileImage, dest: Vec2, scale: f32) {
        let _ = scale;
        self.blit(image, dest);
    }
}

/// Values keyed by [`ImageKey`] that are forgotten once they go unused for
/// more than `max_idle` frames.
///
/// Scaled tiles get fresh keys every time a camera's scale changes, so without
/// eviction their textures would pile up.
pub struct TextureCache<T> {
    entries: HashMap<ImageKey, (T, u64)>,
    frame: u64,
    max_idle: u64,
}

impl<T> TextureCache<T> {
    /// An empty cache keeping entries for `max_idle` unused frames.
    pub fn new(max_idle: u64) -> Self {
        Self {
            entries: HashMap::new(),
            frame: 0,
            max_idle,
        }
    }

    /// Look up `key`, building the value with `make` on a miss, and mark it used
    /// this frame.
    pub fn get_or_insert_with(&mut self, key: ImageKey, make: impl FnOnce() -> T) -> &T {
        let frame = self.frame;
        let entry = self.entries.entry(key).or_insert_with(|| (make(), frame));
        entry.1 = frame;
        &entry.0
    }

    /// Close the current frame and evict stale entries. Returns how many went.
    pub fn end_frame(&mut self) -> usize {
        self.frame += 1;
        let (frame, max_idle) = (self.frame, self.max_idle);
        let before = self.entries.len();
        // whole frames since the entry was last used
        self.entries.retain(|_, (_, last)| frame - *last - 1 <= max_idle);
        before - self.entries.len()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Cached entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is cached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Draws through Macroquad, uploading each [`TileImage`] to the GPU once.
///
/// Requires a live Macroquad context. Call [`end_frame`](Self::end_frame) once
/// per frame so textures nobody draws any more are released.
pub struct ScreenSurface {
    textures: TextureCache<Texture2D>,
}

impl Default for ScreenSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenSurface {
    /// A surface that evicts textures after [`DEFAULT_MAX_IDLE_FRAMES`].
    pub fn new() -> Self {
        Self::with_max_idle_frames(DEFAULT_MAX_IDLE_FRAMES)
    }

    /// A surface that evicts textures unused for more than `max_idle` frames.
    pub fn with_max_idle_frames(max_idle: u64) -> Self {
        Self {
            textures: TextureCache::new(max_idle),
        }
    }

    fn texture(&mut self, image: &TileImage) -> &Texture2D {
        self.textures.get_or_insert_with(image.key(), || {
            let tex = Texture2D::from_image(image.image());
            tex.set_filter(FilterMode::Nearest);
            tex
        })
    }

    /// Release textures that have not been drawn recently.
    pub fn end_frame(&mut self) {
        self.textures.end_frame();
    }

    /// Drop every cached texture, e.g. after switching maps.
    pub fn clear(&mut self) {
        self.textures.clear();
    }

    /// Textures currently uploaded.
    #[inline]
    pub fn cached(&self) -> usize {
        self.textures.len()
    }
}

impl Surface for ScreenSurface {
    fn blit(&mut self, image: &TileImage, dest: Vec2) {
        let tex = self.texture(image);
        draw_texture(tex, dest.x, dest.y, WHITE);
    }

    fn blit_scaled(&mut self, image: &TileImage, dest: Vec2, scale: f32) {
        let size = vec2(image.width() as f32, image.height() as f32) * scale;
        let tex = self.texture(image);
        draw_texture_ex(
            tex,
            dest.x,
            dest.y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(size),
                ..Default::default()
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ImageKey {
        TileImage::new(Image {
            bytes: vec![0; 4],
            width: 1,
            height: 1,
        })
        .key()
    }

    #[test]
    fn builds_each_key_once() {
        let mut cache = TextureCache::new(4);
        let k = key();
        let mut builds = 0;
        for _ in 0..3 {
            cache.get_or_insert_with(k, || {
                builds += 1;
                7
            });
        }
        assert_eq!(builds, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn unused_entries_are_evicted_after_max_idle_frames() {
        let mut cache = TextureCache::new(1);
        let (old, live) = (key(), key());
        cache.get_or_insert_with(old, || 1);
        cache.get_or_insert_with(live, || 2);
        assert_eq!(cache.end_frame(), 0);

        // one idle frame is tolerated
        cache.get_or_insert_with(live, || 2);
        assert_eq!(cache.end_frame(), 0);
        assert_eq!(cache.len(), 2);

        cache.get_or_insert_with(live, || 2);
        assert_eq!(cache.end_frame(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(*cache.get_or_insert_with(live, || 99), 2);
        assert_eq!(*cache.get_or_insert_with(old, || 3), 3);
    }

    #[test]
    fn scale_changes_do_not_pile_up_entries() {
        let mut cache = TextureCache::new(0);
        for _ in 0..10 {
            // every rescale produces new keys for the same tiles
            for _ in 0..4 {
                cache.get_or_insert_with(key(), || ());
            }
            cache.end_frame();
        }
        // only the last rescale's tiles are left
        assert_eq!(cache.len(), 4);
        cache.end_frame();
        assert!(cache.is_empty());
    }
}
