use std::env;
use std::time::Duration;

/// WebSocket endpoint of the game server.
pub fn server_url() -> String {
    env::var("ROBOT_SERVER_URL").unwrap_or_else(|_| "ws://127.0.0.1:3001/ws".to_string())
}

/// Session id issued out of band and relayed in the greeting frame.
pub fn session_id() -> String {
    env::var("ROBOT_SESSION_ID").unwrap_or_default()
}

pub fn username() -> String {
    env::var("ROBOT_USERNAME").unwrap_or_else(|_| "guest".to_string())
}

pub fn tilt_controls() -> bool {
    env::var("ROBOT_TILT_CONTROLS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Start on the lobby roster instead of the driving view.
pub fn start_in_lobby() -> bool {
    env::var("ROBOT_START_IN_LOBBY")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn surface_width() -> f32 {
    env::var("ROBOT_SURFACE_WIDTH")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(640.0)
}

pub fn surface_height() -> f32 {
    env::var("ROBOT_SURFACE_HEIGHT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(480.0)
}

pub const COMMAND_CHANNEL_CAPACITY: usize = 64;

// Session protocol cadence.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(1);
pub const RECONNECT_DELAY: Duration = Duration::from_millis(1000);

// Latency display: a new reading repaints the HUD only when it differs from
// the shown one by more than this many milliseconds.
pub const PING_JITTER_THRESHOLD: u32 = 10;

// Animation cadence.
pub const EXPLOSION_TICK: Duration = Duration::from_millis(5);
pub const BEAM_TICK: Duration = Duration::from_millis(5);
pub const DAMAGE_TICK: Duration = Duration::from_millis(15);
pub const DAMAGE_TIMEOUT: Duration = Duration::from_millis(900);

// Charging overlay staleness.
pub const CHARGE_WATCHDOG_PERIOD: Duration = Duration::from_millis(500);
pub const CHARGE_STALE_AFTER: Duration = Duration::from_millis(1200);

// Laser projection.
pub const FOV_DEGREES: f32 = 45.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 1000.0;
pub const NUM_DASHES: usize = 3;
pub const DASH_LEN: f32 = 0.5;
pub const BEAM_INCREMENT: f32 = 0.1;
pub const MAX_BEAM_DISTANCE: f32 = 10.0;
pub const BEAM_THICKNESS: f32 = 4.0;
pub const BLUR_THICKNESS: f32 = 16.0;
pub const TURRET_X_OFFSET: f32 = 10.0;
pub const TURRET_Y_OFFSET: f32 = 10.0;

// Control surface layout.
pub const BUTTON_SIZE: f32 = 80.0;
pub const BUTTON_MARGIN: f32 = 5.0;

// Tilt angles below this are treated as level.
pub const TILT_DEAD_ZONE_DEGREES: f32 = 15.0;

// Sprite sheets.
pub const SPRITE_FRAME: f32 = 128.0;
pub const EXPLOSION_FRAMES: usize = 126;
pub const EXPLOSION_COLS: usize = 11;
pub const BIGEXPLOSION_FRAMES: usize = 238;
pub const BIGEXPLOSION_COLS: usize = 15;
