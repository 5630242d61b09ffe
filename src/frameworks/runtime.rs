// Framework bootstrap for the headless client runtime: logging, environment
// and the default port adapters used when no real surface is attached.

use crate::domain::layers::Rect;
use crate::domain::ports::{
    AudioTrigger, Canvas, ChargeIndicator, ImageHandle, QuadStyle, Rgba, Shell,
};
use crate::domain::sprites::{numbered_frame_paths, slice_sheet};
use crate::frameworks::config;
use crate::interface_adapters::net::run_client;
use crate::use_cases::context::{ClientContext, ClientMode};
use crate::use_cases::control::{ButtonImages, Controls};
use crate::use_cases::session::Client;
use crate::use_cases::view::ViewAssets;
use tokio::sync::mpsc;

// Fixed handles for the built-in artwork.
const WIFI_HANDLES: [ImageHandle; 5] = [
    ImageHandle(1),
    ImageHandle(2),
    ImageHandle(3),
    ImageHandle(4),
    ImageHandle(5),
];
const HEART_HANDLE: ImageHandle = ImageHandle(6);
const BUTTON_HANDLES: ButtonImages = ButtonImages {
    up: ImageHandle(7),
    down: ImageHandle(8),
    left: ImageHandle(9),
    right: ImageHandle(10),
    fire: ImageHandle(11),
    engine: ImageHandle(12),
};
const EXPLOSION_SHEET: ImageHandle = ImageHandle(13);
const BIGEXPLOSION_SHEET: ImageHandle = ImageHandle(14);

pub fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Shell adapter that traces screen transitions instead of driving a page.
#[derive(Debug, Default)]
pub struct LoggingShell;

impl Shell for LoggingShell {
    fn set_disconnected_visible(&mut self, visible: bool) {
        tracing::info!(visible, "disconnected banner");
    }

    fn set_playfield_visible(&mut self, visible: bool) {
        tracing::info!(visible, "playfield");
    }

    fn set_orientation_hint_visible(&mut self, visible: bool) {
        tracing::debug!(visible, "orientation hint");
    }

    fn show_charge_panel(&mut self, panel: ChargeIndicator) {
        tracing::info!(panel = ?panel, "charge panel shown");
    }

    fn hide_charge_panel(&mut self, panel: ChargeIndicator) {
        tracing::info!(panel = ?panel, "charge panel hidden");
    }

    fn set_charge_remaining(&mut self, remaining: u32) {
        tracing::debug!(remaining, "charge countdown");
    }

    fn clear_wait_barrier(&mut self) {
        tracing::info!("reload complete");
    }

    fn display_ready_message(&mut self) {
        tracing::info!("robot ready");
    }

    fn enter_lobby(&mut self) {
        tracing::info!("entering lobby");
    }

    fn enter_driving(&mut self) {
        tracing::info!("entering driving view");
    }

    fn enter_summary(&mut self) {
        tracing::info!("entering summary");
    }

    fn enter_login(&mut self) {
        tracing::info!("back to login");
    }
}

/// Audio adapter that traces effect names.
#[derive(Debug, Default)]
pub struct LoggingAudio;

impl AudioTrigger for LoggingAudio {
    fn play(&mut self, effect: &str) {
        tracing::debug!(effect, "audio");
    }
}

/// Canvas that discards all drawing, for running without a surface.
#[derive(Debug, Default)]
pub struct NullCanvas;

impl Canvas for NullCanvas {
    fn clear(&mut self, _rect: Rect) {}
    fn fill_rect(&mut self, _rect: Rect, _color: Rgba) {}
    fn draw_image(&mut self, _image: ImageHandle, _src: Rect, _dst: Rect) {}
    fn fill_quad(&mut self, _corners: [[f32; 2]; 4], _style: QuadStyle) {}
    fn fill_circle(&mut self, _cx: f32, _cy: f32, _radius: f32, _color: &str) {}
    fn stroke_text(&mut self, _text: &str, _x: f32, _y: f32) {}
    fn push_clip(&mut self, _rect: Rect) {}
    fn pop_clip(&mut self) {}
}

/// Builds the standard asset set: HUD artwork plus both explosion sheets.
pub fn default_assets() -> ViewAssets {
    ViewAssets {
        heart: HEART_HANDLE,
        wifi_levels: WIFI_HANDLES,
    }
}

/// Artwork a real surface must load for the fixed handles.
pub fn asset_manifest() -> Vec<(ImageHandle, String)> {
    let mut manifest = vec![
        (HEART_HANDLE, "/images/heart.png".to_string()),
        (BUTTON_HANDLES.up, "/images/btn_up.png".to_string()),
        (BUTTON_HANDLES.down, "/images/btn_down.png".to_string()),
        (BUTTON_HANDLES.left, "/images/btn_left.png".to_string()),
        (BUTTON_HANDLES.right, "/images/btn_right.png".to_string()),
        (BUTTON_HANDLES.fire, "/images/btn_fire.png".to_string()),
        (BUTTON_HANDLES.engine, "/images/btn_engine.png".to_string()),
        (EXPLOSION_SHEET, "/images/explosion_sheet.png".to_string()),
        (
            BIGEXPLOSION_SHEET,
            "/images/bigexplosion_sheet.png".to_string(),
        ),
    ];
    let wifi_paths = numbered_frame_paths(0, WIFI_HANDLES.len(), 1, "/images/wifi", ".png");
    for (handle, path) in WIFI_HANDLES.iter().zip(wifi_paths) {
        manifest.push((*handle, path));
    }
    manifest
}

/// Assembles a client from the environment.
pub fn build_client(
    commands_capacity: usize,
) -> (
    Client<LoggingShell, LoggingAudio>,
    ViewAssets,
    mpsc::Sender<crate::interface_adapters::protocol::OutboundCommand>,
    mpsc::Receiver<crate::interface_adapters::protocol::OutboundCommand>,
) {
    let mode = if config::start_in_lobby() {
        ClientMode::Lobby
    } else {
        ClientMode::Driving
    };
    let mut ctx = ClientContext::new(config::session_id(), config::username(), mode);
    ctx.tilt_controls = config::tilt_controls();

    let controls = Controls::new(BUTTON_HANDLES, ctx.tilt_controls);
    let explosion_frames = slice_sheet(
        EXPLOSION_SHEET,
        config::EXPLOSION_FRAMES,
        config::SPRITE_FRAME,
        config::SPRITE_FRAME,
        config::EXPLOSION_COLS,
    );
    let bigexplosion_frames = slice_sheet(
        BIGEXPLOSION_SHEET,
        config::BIGEXPLOSION_FRAMES,
        config::SPRITE_FRAME,
        config::SPRITE_FRAME,
        config::BIGEXPLOSION_COLS,
    );

    let client = Client::new(
        ctx,
        controls,
        LoggingShell,
        LoggingAudio,
        explosion_frames,
        bigexplosion_frames,
        config::surface_width(),
        config::surface_height(),
    );
    let (commands_tx, commands_rx) = mpsc::channel(commands_capacity);
    (client, default_assets(), commands_tx, commands_rx)
}

/// Full bootstrap: logging, environment, client assembly and the connection
/// loop, run until the session ends for good.
pub async fn run_with_config() {
    init_runtime();
    for (handle, path) in asset_manifest() {
        tracing::debug!(handle = handle.0, %path, "artwork expected by the surface");
    }

    let url = config::server_url();
    let (client, assets, commands_tx, commands_rx) = build_client(config::COMMAND_CHANNEL_CAPACITY);
    // No input source in the headless runtime; the loop tolerates the
    // closed channel.
    drop(commands_tx);

    run_client(url, client, NullCanvas, assets, commands_rx).await;
}
