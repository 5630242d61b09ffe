use crate::domain::roster::Roster;

/// Which surface the client is currently presenting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMode {
    /// In-game driving view with the rendered HUD.
    Driving,
    /// Pre-game lobby with the player and robot rosters.
    Lobby,
}

/// Mutable session state shared by every frame handler.
#[derive(Debug)]
pub struct ClientContext {
    /// Server-issued id relayed back in the greeting on every (re)connect.
    pub session_id: String,
    pub username: String,
    /// Id of the robot this client drives, once assigned.
    pub robot_id: Option<String>,
    pub robot_color: Option<String>,
    /// High-water mark of reported life, drawn as the full heart row.
    pub max_life: u32,
    pub life: u32,
    /// Raw signal strength 0..=100 from the last info frame.
    pub wifi: u32,
    /// Bucketed strength 0..=4 selecting the wifi icon.
    pub wifi_level: u32,
    /// Last latency drawn on the HUD; `None` until the first report lands.
    pub ping: Option<u32>,
    /// Set while munitions are reloading; gates all input.
    pub loading: bool,
    /// Set after a fatal hit until the game-over frame; gates all input.
    pub waiting: bool,
    pub tilt_controls: bool,
    /// Latched in the lobby once the game starts; a close after this is
    /// final and must not trigger reconnection.
    pub game_ready: bool,
    pub mode: ClientMode,
    pub roster: Roster,
}

impl ClientContext {
    pub fn new(session_id: String, username: String, mode: ClientMode) -> Self {
        Self {
            session_id,
            username,
            robot_id: None,
            robot_color: None,
            max_life: 0,
            life: 0,
            wifi: 0,
            wifi_level: 0,
            ping: None,
            loading: false,
            waiting: false,
            tilt_controls: false,
            game_ready: false,
            mode,
            roster: Roster::default(),
        }
    }

    /// Wifi buckets map 0..=100 onto the five signal icons, capped at 4.
    pub fn set_wifi(&mut self, wifi: u32) {
        self.wifi = wifi;
        self.wifi_level = (wifi / 20).min(4);
    }

    pub fn set_life(&mut self, life: u32) {
        self.life = life;
        if life > self.max_life {
            self.max_life = life;
        }
    }
}
