//! Free-scroll a map one pixel at a time with the arrow keys or WASD.
//!
//! cargo run --example smooth_scroll -- assets/map.json [config.json]

use anyhow::Context;
use macroquad::prelude::*;
use macroquad_tilewalk::{TileCamera, Config, DirectionInput, ScreenSurface, Ticker, TileMap};
use std::path::{Path, PathBuf};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn window_conf() -> Conf {
    Conf {
        window_title: "Smooth Scroll".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

async fn run() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let map_path = PathBuf::from(args.next().unwrap_or_else(|| "assets/map.json".into()));
    let config = match args.next() {
        Some(p) => Config::from_path(Path::new(&p)).with_context(|| format!("reading config {p}"))?,
        None => Config::default(),
    };

    let map = TileMap::load_with(&map_path, &config.load)
        .with_context(|| format!("loading map {}", map_path.display()))?;

    let mut camera = TileCamera::new(&map);
    camera.set_scale(config.scale, config.scale_algorithm)?;
    camera.set_viewport(Rect::new(64.0, 64.0, screen_width() - 128.0, screen_height() - 128.0));
    camera.set_position(map.width() as i32 / 2, map.height() as i32 / 2);
    // first tile of the first tileset fills the void around the map
    camera.set_edge(1);

    let mut scroll = Ticker::new(config.scroll_interval);
    let mut surface = ScreenSurface::new();

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        if scroll.advance(get_frame_time()) {
            let (dx, dy) = DirectionInput::from_keyboard().axis();
            camera.add_offset(dx, dy);
        }

        clear_background(DARKGRAY);
        camera.draw_all(&map, &mut surface);

        surface.end_frame();

        let focus = camera.focus_rect();
        draw_rectangle_lines(focus.x, focus.y, focus.w, focus.h, 2.0, YELLOW);

        let pos = camera.position();
        let (ox, oy) = camera.offset();
        draw_text(&format!("tile {},{}  offset {ox},{oy}", pos.x, pos.y), 20.0, 40.0, 30.0, WHITE);

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
