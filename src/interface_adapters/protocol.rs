// Wire codec for the game server's text frames.
//
// Frames are sparse JSON objects whose shape determines their meaning: there
// is no type tag, the first recognized top-level key wins, checked in a fixed
// priority order. Anything that is not a JSON object is a plain diagnostic
// string.

use crate::domain::roster::{PlayerEntry, RobotEntry};
use serde::Deserialize;
use serde_json::{Value, json};

/// One complete text frame, after classification.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Plain diagnostic text; logged verbatim, mutates nothing.
    Diagnostic(String),
    /// A structured frame that decoded into a typed event.
    Event(ServerEvent),
    /// Object-shaped but carrying no recognized key, or a recognized key
    /// with a malformed payload; logged, then discarded.
    Unrecognized(String),
}

/// Typed inbound server events, one per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Info {
        speed: f32,
        wifi: u32,
        life: u32,
        stage: Option<String>,
    },
    Hit {
        target_id: String,
        source_id: String,
        fatal: bool,
    },
    GameOver,
    Loaded {
        pending: u32,
    },
    Ping {
        count: u32,
    },
    PingUpdate {
        player_name: String,
        ms: u32,
    },
    Charging {
        robot_id: String,
        remaining: u32,
        full: bool,
        depleted: bool,
        life: u32,
    },
    PlayersList(Vec<PlayerEntry>),
    RobotsList(Vec<RobotEntry>),
    NameChanged,
    NewPlayer,
    NewRobot,
    IdentityReassigned {
        id: String,
        address: String,
    },
    OwnerChanged {
        id: String,
        owner: Option<String>,
    },
    PlayerRemoved {
        name: String,
    },
    RobotRemoved {
        id: String,
    },
    ReadyState {
        robot_id: String,
        start_game: bool,
    },
    ReadyAck,
    GameStarted,
    ColorChanged {
        id: String,
        color: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct IdRef {
    id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct NameRef {
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct InfoDto {
    #[serde(default)]
    speed: f32,
    #[serde(default)]
    wifi: u32,
    #[serde(default)]
    life: u32,
    #[serde(default)]
    stage: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct HitDto {
    hit: IdRef,
    source: IdRef,
    #[serde(default)]
    fatal: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct LoadedDto {
    #[serde(default)]
    pending: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct PingDto {
    #[serde(default)]
    count: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct PingUpdateDto {
    updateping: u32,
    player: NameRef,
}

#[derive(Debug, Clone, Deserialize)]
struct ChargingBody {
    id: String,
    #[serde(default)]
    life: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct ChargingDto {
    charging: ChargingBody,
    #[serde(default)]
    remaining: u32,
    #[serde(default)]
    full: bool,
    #[serde(default)]
    depleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct PlayerDto {
    name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    ping: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
struct PlayersDto {
    players: Vec<PlayerDto>,
}

#[derive(Debug, Clone, Deserialize)]
struct RobotDto {
    id: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RobotsDto {
    robots: Vec<RobotDto>,
}

#[derive(Debug, Clone, Deserialize)]
struct NewIdBody {
    id: String,
    address: String,
}

#[derive(Debug, Clone, Deserialize)]
struct NewIdDto {
    newid: NewIdBody,
}

#[derive(Debug, Clone, Deserialize)]
struct ChangeOwnerBody {
    id: String,
    #[serde(default)]
    owner: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChangeOwnerDto {
    changeowner: ChangeOwnerBody,
}

#[derive(Debug, Clone, Deserialize)]
struct RemovePlayerDto {
    removeplayer: NameRef,
}

#[derive(Debug, Clone, Deserialize)]
struct RemoveRobotDto {
    removerobot: IdRef,
}

#[derive(Debug, Clone, Deserialize)]
struct SetReadyDto {
    setready: IdRef,
    #[serde(default)]
    startgame: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct SetColorBody {
    id: String,
    color: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SetColorDto {
    setcolor: SetColorBody,
}

impl From<PlayerDto> for PlayerEntry {
    fn from(p: PlayerDto) -> Self {
        Self {
            name: p.name,
            address: p.address,
            ping: p.ping,
        }
    }
}

impl From<RobotDto> for RobotEntry {
    fn from(r: RobotDto) -> Self {
        Self {
            id: r.id,
            address: r.address,
            owner: r.owner,
            color: r.color,
        }
    }
}

/// Classifies one inbound text frame. A frame is treated as structured data
/// only when its first character is `{` and its last is `}`.
pub fn classify_frame(text: &str) -> Frame {
    if !(text.starts_with('{') && text.ends_with('}')) {
        return Frame::Diagnostic(text.to_string());
    }
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => return Frame::Unrecognized(text.to_string()),
    };
    let Some(object) = value.as_object() else {
        return Frame::Unrecognized(text.to_string());
    };

    // Fixed dispatch priority; the first matching key wins and the rest of
    // the object is ignored.
    let dispatch: &[(&str, fn(&Value) -> Option<ServerEvent>)] = &[
        ("speed", decode_info),
        ("hit", decode_hit),
        ("stopgame", |_| Some(ServerEvent::GameOver)),
        ("loaded", decode_loaded),
        ("ping", decode_ping),
        ("updateping", decode_ping_update),
        ("charging", decode_charging),
        ("players", decode_players),
        ("robots", decode_robots),
        ("changename", |_| Some(ServerEvent::NameChanged)),
        ("newplayer", |_| Some(ServerEvent::NewPlayer)),
        ("newrobot", |_| Some(ServerEvent::NewRobot)),
        ("newid", decode_new_id),
        ("changeowner", decode_change_owner),
        ("removeplayer", decode_remove_player),
        ("removerobot", decode_remove_robot),
        ("setready", decode_set_ready),
        ("ready", |_| Some(ServerEvent::ReadyAck)),
        ("startgame", |_| Some(ServerEvent::GameStarted)),
        ("setcolor", decode_set_color),
    ];

    for (key, decode) in dispatch {
        if object.contains_key(*key) {
            return match decode(&value) {
                Some(event) => Frame::Event(event),
                None => Frame::Unrecognized(text.to_string()),
            };
        }
    }
    Frame::Unrecognized(text.to_string())
}

fn decode_info(value: &Value) -> Option<ServerEvent> {
    let dto: InfoDto = serde_json::from_value(value.clone()).ok()?;
    Some(ServerEvent::Info {
        speed: dto.speed,
        wifi: dto.wifi,
        life: dto.life,
        stage: dto.stage,
    })
}

fn decode_hit(value: &Value) -> Option<ServerEvent> {
    let dto: HitDto = serde_json::from_value(value.clone()).ok()?;
    Some(ServerEvent::Hit {
        target_id: dto.hit.id,
        source_id: dto.source.id,
        fatal: dto.fatal,
    })
}

fn decode_loaded(value: &Value) -> Option<ServerEvent> {
    let dto: LoadedDto = serde_json::from_value(value.clone()).ok()?;
    Some(ServerEvent::Loaded {
        pending: dto.pending,
    })
}

fn decode_ping(value: &Value) -> Option<ServerEvent> {
    let dto: PingDto = serde_json::from_value(value.clone()).ok()?;
    Some(ServerEvent::Ping { count: dto.count })
}

fn decode_ping_update(value: &Value) -> Option<ServerEvent> {
    let dto: PingUpdateDto = serde_json::from_value(value.clone()).ok()?;
    Some(ServerEvent::PingUpdate {
        player_name: dto.player.name,
        ms: dto.updateping,
    })
}

fn decode_charging(value: &Value) -> Option<ServerEvent> {
    let dto: ChargingDto = serde_json::from_value(value.clone()).ok()?;
    Some(ServerEvent::Charging {
        robot_id: dto.charging.id,
        remaining: dto.remaining,
        full: dto.full,
        depleted: dto.depleted,
        life: dto.charging.life,
    })
}

fn decode_players(value: &Value) -> Option<ServerEvent> {
    let dto: PlayersDto = serde_json::from_value(value.clone()).ok()?;
    Some(ServerEvent::PlayersList(
        dto.players.into_iter().map(PlayerEntry::from).collect(),
    ))
}

fn decode_robots(value: &Value) -> Option<ServerEvent> {
    let dto: RobotsDto = serde_json::from_value(value.clone()).ok()?;
    Some(ServerEvent::RobotsList(
        dto.robots.into_iter().map(RobotEntry::from).collect(),
    ))
}

fn decode_new_id(value: &Value) -> Option<ServerEvent> {
    let dto: NewIdDto = serde_json::from_value(value.clone()).ok()?;
    Some(ServerEvent::IdentityReassigned {
        id: dto.newid.id,
        address: dto.newid.address,
    })
}

fn decode_change_owner(value: &Value) -> Option<ServerEvent> {
    let dto: ChangeOwnerDto = serde_json::from_value(value.clone()).ok()?;
    Some(ServerEvent::OwnerChanged {
        id: dto.changeowner.id,
        owner: dto.changeowner.owner,
    })
}

fn decode_remove_player(value: &Value) -> Option<ServerEvent> {
    let dto: RemovePlayerDto = serde_json::from_value(value.clone()).ok()?;
    Some(ServerEvent::PlayerRemoved {
        name: dto.removeplayer.name,
    })
}

fn decode_remove_robot(value: &Value) -> Option<ServerEvent> {
    let dto: RemoveRobotDto = serde_json::from_value(value.clone()).ok()?;
    Some(ServerEvent::RobotRemoved {
        id: dto.removerobot.id,
    })
}

fn decode_set_ready(value: &Value) -> Option<ServerEvent> {
    let dto: SetReadyDto = serde_json::from_value(value.clone()).ok()?;
    Some(ServerEvent::ReadyState {
        robot_id: dto.setready.id,
        start_game: dto.startgame,
    })
}

fn decode_set_color(value: &Value) -> Option<ServerEvent> {
    let dto: SetColorDto = serde_json::from_value(value.clone()).ok()?;
    Some(ServerEvent::ColorChanged {
        id: dto.setcolor.id,
        color: dto.setcolor.color,
    })
}

/// Encodes an event back into its wire frame. Decoding the result yields an
/// equal event, field for field.
pub fn encode_frame(event: &ServerEvent) -> String {
    let value = match event {
        ServerEvent::Info {
            speed,
            wifi,
            life,
            stage,
        } => json!({ "speed": speed, "wifi": wifi, "life": life, "stage": stage }),
        ServerEvent::Hit {
            target_id,
            source_id,
            fatal,
        } => json!({ "hit": { "id": target_id }, "source": { "id": source_id }, "fatal": fatal }),
        ServerEvent::GameOver => json!({ "stopgame": true }),
        ServerEvent::Loaded { pending } => json!({ "loaded": true, "pending": pending }),
        ServerEvent::Ping { count } => json!({ "ping": true, "count": count }),
        ServerEvent::PingUpdate { player_name, ms } => {
            json!({ "updateping": ms, "player": { "name": player_name } })
        }
        ServerEvent::Charging {
            robot_id,
            remaining,
            full,
            depleted,
            life,
        } => json!({
            "charging": { "id": robot_id, "life": life },
            "remaining": remaining,
            "full": full,
            "depleted": depleted,
        }),
        ServerEvent::PlayersList(players) => {
            let players: Vec<Value> = players
                .iter()
                .map(|p| json!({ "name": p.name, "address": p.address, "ping": p.ping }))
                .collect();
            json!({ "players": players })
        }
        ServerEvent::RobotsList(robots) => {
            let robots: Vec<Value> = robots
                .iter()
                .map(|r| {
                    json!({
                        "id": r.id,
                        "address": r.address,
                        "owner": r.owner,
                        "color": r.color,
                    })
                })
                .collect();
            json!({ "robots": robots })
        }
        ServerEvent::NameChanged => json!({ "changename": true }),
        ServerEvent::NewPlayer => json!({ "newplayer": true }),
        ServerEvent::NewRobot => json!({ "newrobot": true }),
        ServerEvent::IdentityReassigned { id, address } => {
            json!({ "newid": { "id": id, "address": address } })
        }
        ServerEvent::OwnerChanged { id, owner } => {
            json!({ "changeowner": { "id": id, "owner": owner } })
        }
        ServerEvent::PlayerRemoved { name } => json!({ "removeplayer": { "name": name } }),
        ServerEvent::RobotRemoved { id } => json!({ "removerobot": { "id": id } }),
        ServerEvent::ReadyState {
            robot_id,
            start_game,
        } => json!({ "setready": { "id": robot_id }, "startgame": start_game }),
        ServerEvent::ReadyAck => json!({ "ready": true }),
        ServerEvent::GameStarted => json!({ "startgame": true }),
        ServerEvent::ColorChanged { id, color } => {
            json!({ "setcolor": { "id": id, "color": color } })
        }
    };
    value.to_string()
}

/// Outbound commands, mostly single ASCII characters sent as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundCommand {
    Forward,
    Backward,
    Left,
    Right,
    Stop,
    Fire,
    /// Fire mode selector, 1 through 3.
    FireMode(u8),
    /// Liveness poll sent by the heartbeat timer.
    Heartbeat,
    QueryPlayers,
    QueryRobots,
    TakeRobot(String),
    LeaveRobot(String),
    /// Handshake envelope relaying the server-issued session id.
    Greetings(String),
    /// Echo of an inbound ping with the counter already incremented.
    PingEcho {
        count: u32,
    },
}

impl OutboundCommand {
    pub fn encode(&self) -> String {
        match self {
            OutboundCommand::Forward => "f".to_string(),
            OutboundCommand::Backward => "b".to_string(),
            OutboundCommand::Left => "l".to_string(),
            OutboundCommand::Right => "r".to_string(),
            OutboundCommand::Stop => "s".to_string(),
            OutboundCommand::Fire => " ".to_string(),
            OutboundCommand::FireMode(mode) => mode.to_string(),
            OutboundCommand::Heartbeat => "?".to_string(),
            OutboundCommand::QueryPlayers => "P".to_string(),
            OutboundCommand::QueryRobots => "R".to_string(),
            OutboundCommand::TakeRobot(id) => format!("T{id}"),
            OutboundCommand::LeaveRobot(id) => format!("L{id}"),
            OutboundCommand::Greetings(session_id) => {
                json!({ "greetings": session_id }).to_string()
            }
            OutboundCommand::PingEcho { count } => {
                json!({ "ping": true, "count": count }).to_string()
            }
        }
    }
}
