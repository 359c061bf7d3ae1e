//! Walk an LPC character around a Tiled map.
//!
//! cargo run --example walk -- assets/map.tmx assets/hero.png [config.json]

use anyhow::Context;
use macroquad::prelude::*;
use macroquad_tilewalk::{
    load_image, AnimatedSprite, Config, DirectionInput, Entity, ScreenSurface, TextBox, TileCamera, TileMap, TilePos,
    Trigger, TriggerTable,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const WALLS: &str = "Unwalkable";

fn window_conf() -> Conf {
    Conf {
        window_title: "Tile Walk".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

const FONT_SIZE: u16 = 24;

fn measure(text: &str) -> f32 {
    measure_text(text, None, FONT_SIZE, 1.0).width
}

/// What triggers get to touch.
struct Hud {
    log: TextBox,
}

impl Hud {
    fn say(&mut self, text: &str) {
        self.log.add_text(text, measure);
    }
}

async fn run() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let map_path = PathBuf::from(args.next().unwrap_or_else(|| "assets/map.tmx".into()));
    let sheet_path = PathBuf::from(args.next().unwrap_or_else(|| "assets/hero.png".into()));
    let config = match args.next() {
        Some(p) => Config::from_path(Path::new(&p)).with_context(|| format!("reading config {p}"))?,
        None => Config::default(),
    };

    let map = TileMap::load_with(&map_path, &config.load)
        .with_context(|| format!("loading map {}", map_path.display()))?;
    let sheet = load_image(&sheet_path)?;
    let sprite = AnimatedSprite::new(&sheet).context("slicing sprite sheet")?;
    info!(layers = map.layer_names().count(), tiles = map.tile_count(), "map ready");

    let mut camera = TileCamera::new(&map);
    camera.set_scale(config.scale, config.scale_algorithm)?;
    camera.set_viewport(Rect::new(0.0, 0.0, screen_width(), screen_height()));

    let mut hero = Entity::new(sprite, config.walk)?;
    let start = TilePos::new(map.width() as i32 / 2, map.height() as i32 / 2);
    hero.teleport(start);

    let mut hud = Hud {
        log: TextBox::new(screen_width() / 3.0, 4.0 * FONT_SIZE as f32, FONT_SIZE as f32),
    };
    let mut triggers = TriggerTable::<Hud>::new();
    triggers.add_on_map_enter(|pos, hud: &mut Hud| {
        hud.say(&format!("Welcome! You start at {},{}. Walk with WASD or the arrow keys.", pos.x, pos.y))
    });
    triggers.add_trigger(
        TilePos::new(start.x + 2, start.y),
        Trigger::new()
            .on_enter(|_, hud: &mut Hud| hud.say("You found the secret tile. Nothing happens, but it feels important."))
            .on_exit(|_, hud: &mut Hud| hud.say("You leave the secret tile behind.")),
    );
    triggers.enter_map(start, &mut hud);

    let terrain = map.blocking(WALLS);
    let mut surface = ScreenSurface::new();
    let (tile_w, tile_h) = camera.scaled_tile_size();
    let (scale, _) = camera.scale();

    loop {
        if is_key_pressed(KeyCode::Escape) {
            triggers.exit_map(hero.position(), &mut hud);
            break;
        }

        if let Some(step) = hero.update(get_frame_time(), DirectionInput::from_keyboard(), &terrain) {
            triggers.actor_moved(step.from, step.to, &mut hud);
        }

        let pos = hero.position();
        let offset = hero.offset();
        camera.set_position(pos.x, pos.y);
        camera.set_offset(offset.x, offset.y);

        clear_background(BLACK);
        camera.draw_all(&map, &mut surface);
        hero.draw(&mut surface, camera.tile_to_screen(pos), tile_w as u32, tile_h as u32, scale);
        surface.end_frame();

        let mut y = 40.0;
        for line in hud.log.lines() {
            draw_text(line, 20.0, y, FONT_SIZE as f32, WHITE);
            y += hud.log.line_height();
        }
        draw_text(&format!("FPS: {}", get_fps()), screen_width() - 135.0, 40.0, 30.0, RED);

        next_frame().await;
    }
    Ok(())
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        error!("{e:#}");
    }
}
