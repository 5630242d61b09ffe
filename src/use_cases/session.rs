// Session state machine. Owns every piece of client state and reacts to the
// three kinds of stimulus the connection loop feeds it: socket lifecycle
// events, inbound frames and due timers. All methods run on the loop's task.

use crate::domain::layers::LayerStack;
use crate::domain::ports::{AudioTrigger, Canvas, MotionSource, Shell};
use crate::domain::sprites::SpriteSlice;
use crate::frameworks::config;
use crate::interface_adapters::protocol::{
    Frame, OutboundCommand, ServerEvent, classify_frame,
};
use crate::use_cases::animation::{Animations, FiringMode};
use crate::use_cases::charging::ChargeOverlay;
use crate::use_cases::context::{ClientContext, ClientMode};
use crate::use_cases::control::{Controls, InputGate, Key};
use crate::use_cases::lobby;
use crate::use_cases::timers::{TimerId, TimerTag, TimerWheel};
use crate::use_cases::view::{self, View};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// What the connection loop should do after a timer fired.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerOutcome {
    None,
    Send(OutboundCommand),
    /// The reconnect delay elapsed; dial again.
    Reconnect,
}

#[derive(Debug, Default)]
struct ConnectionState {
    has_connection: bool,
    waiting_reconnect: bool,
    heartbeat: Option<TimerId>,
    reconnect: Option<TimerId>,
}

pub struct Client<S: Shell, A: AudioTrigger> {
    pub ctx: ClientContext,
    pub timers: TimerWheel,
    pub layers: LayerStack,
    pub view: View,
    pub anims: Animations,
    pub controls: Controls,
    pub charging: ChargeOverlay,
    pub shell: S,
    pub audio: A,
    explosion_frames: Vec<SpriteSlice>,
    bigexplosion_frames: Vec<SpriteSlice>,
    conn: ConnectionState,
}

impl<S: Shell, A: AudioTrigger> Client<S, A> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ctx: ClientContext,
        controls: Controls,
        shell: S,
        audio: A,
        explosion_frames: Vec<SpriteSlice>,
        bigexplosion_frames: Vec<SpriteSlice>,
        width: f32,
        height: f32,
    ) -> Self {
        let mut layers = LayerStack::new(width, height);
        let view = view::build(&mut layers);
        let mut controls = controls;
        controls.reposition(width, height);
        Self {
            ctx,
            timers: TimerWheel::new(),
            layers,
            view,
            anims: Animations::new(),
            controls,
            charging: ChargeOverlay::new(),
            shell,
            audio,
            explosion_frames,
            bigexplosion_frames,
            conn: ConnectionState::default(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.has_connection
    }

    /// True once a reconnect is pending or scheduled; the loop keeps running
    /// timers while disconnected as long as this holds.
    pub fn wants_reconnect(&self) -> bool {
        self.conn.reconnect.is_some()
    }

    pub fn needs_redraw(&self) -> bool {
        self.layers.has_damage()
    }

    /// Repaints the damaged region through the view painter.
    pub fn redraw(&mut self, canvas: &mut dyn Canvas, assets: &view::ViewAssets) {
        view::redraw(
            &mut self.layers,
            canvas,
            &self.ctx,
            &mut self.controls,
            &self.anims,
            assets,
        );
    }

    /// Surface resize or orientation change.
    pub fn on_resize(&mut self, canvas: &mut dyn Canvas, width: f32, height: f32) {
        view::handle_resize(
            &self.view,
            &mut self.layers,
            canvas,
            &mut self.controls,
            width,
            height,
        );
    }

    /// Socket opened. Restores the UI if this was a reconnect and produces
    /// the opening chatter: the greeting, plus roster queries in the lobby.
    /// The driving heartbeat starts here, once, and survives reconnects.
    pub fn on_open(&mut self, now: Instant) -> Vec<OutboundCommand> {
        if self.conn.waiting_reconnect {
            self.shell.set_disconnected_visible(false);
            if self.ctx.mode == ClientMode::Driving {
                self.shell.set_playfield_visible(true);
                self.shell.set_orientation_hint_visible(true);
            }
            self.conn.waiting_reconnect = false;
        }
        self.conn.has_connection = true;

        let mut commands = vec![OutboundCommand::Greetings(self.ctx.session_id.clone())];
        match self.ctx.mode {
            ClientMode::Lobby => {
                commands.push(OutboundCommand::QueryPlayers);
                commands.push(OutboundCommand::QueryRobots);
            }
            ClientMode::Driving => {
                if self.conn.heartbeat.is_none() {
                    self.conn.heartbeat = Some(self.timers.start_interval(
                        TimerTag::Heartbeat,
                        config::HEARTBEAT_INTERVAL,
                        now,
                    ));
                }
            }
        }
        commands
    }

    /// Socket error. Only schedules a retry when a reconnect cycle is
    /// already in progress; the close that follows a live connection does
    /// its own scheduling.
    pub fn on_error(&mut self, now: Instant) {
        warn!("websocket error");
        if self.conn.waiting_reconnect {
            self.schedule_reconnect(now);
        }
    }

    /// Socket closed. Brings up the disconnected banner and schedules the
    /// retry, except in a lobby whose game already started: that close is
    /// the handover to the driving view and must stay final.
    pub fn on_close(&mut self, now: Instant) {
        info!("websocket closed");
        self.conn.has_connection = false;
        if self.ctx.mode == ClientMode::Lobby && self.ctx.game_ready {
            return;
        }
        if self.ctx.mode == ClientMode::Driving {
            self.shell.set_playfield_visible(false);
            self.shell.set_orientation_hint_visible(false);
        }
        self.shell.set_disconnected_visible(true);
        self.conn.waiting_reconnect = true;
        self.schedule_reconnect(now);
    }

    fn schedule_reconnect(&mut self, now: Instant) {
        if self.conn.reconnect.is_none() {
            self.conn.reconnect = Some(self.timers.start_timeout(
                TimerTag::Reconnect,
                config::RECONNECT_DELAY,
                now,
            ));
        }
    }

    /// One due timer.
    pub fn on_timer(&mut self, tag: TimerTag, now: Instant) -> TimerOutcome {
        match tag {
            TimerTag::Heartbeat => {
                // The interval survives reconnects; sends are simply skipped
                // while the connection is down.
                if self.conn.has_connection && !self.conn.waiting_reconnect {
                    TimerOutcome::Send(OutboundCommand::Heartbeat)
                } else {
                    TimerOutcome::None
                }
            }
            TimerTag::Reconnect => {
                self.conn.reconnect = None;
                TimerOutcome::Reconnect
            }
            TimerTag::EffectTick(id) => {
                self.anims.on_tick(id, &mut self.layers, &mut self.timers);
                TimerOutcome::None
            }
            TimerTag::DamageTimeout(id) => {
                self.anims
                    .on_damage_timeout(id, &mut self.layers, &mut self.timers);
                TimerOutcome::None
            }
            TimerTag::ChargeWatchdog => {
                self.charging
                    .on_watchdog(&mut self.shell, &mut self.timers, now);
                TimerOutcome::None
            }
        }
    }

    /// One inbound text frame.
    pub fn on_frame(&mut self, text: &str, now: Instant) -> Vec<OutboundCommand> {
        match classify_frame(text) {
            Frame::Diagnostic(msg) => {
                info!(server = %msg, "server says");
                Vec::new()
            }
            Frame::Unrecognized(msg) => {
                warn!(frame = %msg, "unrecognized frame");
                Vec::new()
            }
            Frame::Event(ServerEvent::Ping { count }) => {
                vec![OutboundCommand::PingEcho { count: count + 1 }]
            }
            Frame::Event(event) => match self.ctx.mode {
                ClientMode::Driving => self.on_driving_event(event, now),
                ClientMode::Lobby => lobby::apply(event, &mut self.ctx, &mut self.shell),
            },
        }
    }

    fn on_driving_event(&mut self, event: ServerEvent, now: Instant) -> Vec<OutboundCommand> {
        match event {
            ServerEvent::Info {
                wifi, life, stage, ..
            } => match stage.as_deref() {
                Some("INIT") => {
                    // The game went back to its setup phase; rejoin the
                    // lobby and pull the rosters.
                    self.ctx.mode = ClientMode::Lobby;
                    self.shell.enter_lobby();
                    vec![OutboundCommand::QueryPlayers, OutboundCommand::QueryRobots]
                }
                Some("SUMMARY") => {
                    self.shell.enter_summary();
                    Vec::new()
                }
                _ => {
                    self.ctx.set_wifi(wifi);
                    self.ctx.set_life(life);
                    self.layers.mark_damaged(None);
                    Vec::new()
                }
            },
            ServerEvent::Hit {
                target_id,
                source_id,
                fatal,
            } => {
                if self.ctx.robot_id.as_deref() == Some(target_id.as_str()) {
                    self.anims
                        .trigger_damage_flash(&mut self.layers, &mut self.timers, now);
                    self.audio.play("damage");
                    if fatal {
                        self.ctx.waiting = true;
                    }
                }
                if self.ctx.robot_id.as_deref() == Some(source_id.as_str()) {
                    let frames = if fatal {
                        self.bigexplosion_frames.clone()
                    } else {
                        self.explosion_frames.clone()
                    };
                    self.anims
                        .trigger_explosion(frames, &mut self.layers, &mut self.timers, now);
                    self.audio
                        .play(if fatal { "bigexplosion" } else { "explosion" });
                }
                Vec::new()
            }
            ServerEvent::GameOver => {
                self.shell.enter_summary();
                Vec::new()
            }
            ServerEvent::Loaded { pending } => {
                if pending == 0 && self.ctx.waiting {
                    self.ctx.waiting = false;
                    self.shell.clear_wait_barrier();
                }
                Vec::new()
            }
            ServerEvent::PingUpdate { player_name, ms } => {
                if player_name == self.ctx.username {
                    let previous = self.ctx.ping.replace(ms);
                    let relevant = match previous {
                        None => true,
                        Some(previous) => {
                            previous.abs_diff(ms) > config::PING_JITTER_THRESHOLD
                        }
                    };
                    if relevant {
                        self.layers.mark_damaged(None);
                    }
                }
                Vec::new()
            }
            ServerEvent::Charging {
                robot_id,
                remaining,
                full,
                depleted,
                life,
            } => {
                if self.ctx.robot_id.as_deref() == Some(robot_id.as_str()) {
                    self.ctx.set_life(life);
                    self.layers.mark_damaged(None);
                    self.charging.on_charging(
                        remaining,
                        full,
                        depleted,
                        &mut self.shell,
                        &mut self.timers,
                        now,
                    );
                }
                Vec::new()
            }
            other => {
                debug!(event = ?other, "event ignored in driving mode");
                Vec::new()
            }
        }
    }

    fn gate(&self) -> InputGate {
        InputGate {
            connected: self.conn.has_connection,
            loading: self.ctx.loading,
            waiting: self.ctx.waiting,
        }
    }

    /// Pointer press on the play surface.
    pub fn on_press(&mut self, x: f32, y: f32, now: Instant) -> Vec<OutboundCommand> {
        let gate = self.gate();
        let outcome = self.controls.press(x, y, gate);
        if outcome.fired {
            self.fire(now);
        }
        outcome.commands
    }

    pub fn on_release(&mut self) -> Vec<OutboundCommand> {
        self.controls
            .release(self.conn.has_connection)
            .into_iter()
            .collect()
    }

    pub fn on_key_down(&mut self, key: Key, now: Instant) -> Vec<OutboundCommand> {
        let gate = self.gate();
        let outcome = self.controls.key_down(key, gate);
        if outcome.fired {
            self.fire(now);
        }
        for command in &outcome.commands {
            if let OutboundCommand::FireMode(selector) = command
                && let Some(mode) = FiringMode::from_selector(*selector)
            {
                self.anims.set_firing_mode(mode);
            }
        }
        outcome.commands
    }

    pub fn on_key_up(&mut self, key: Key) -> Vec<OutboundCommand> {
        self.controls
            .key_up(key, self.conn.has_connection)
            .into_iter()
            .collect()
    }

    /// Polls the motion source and turns the current tilt into a drive
    /// command. No-op until the device produced a sample.
    pub fn on_motion(&mut self, source: &dyn MotionSource) -> Option<OutboundCommand> {
        let sample = source.sample()?;
        self.controls.tilt_command(sample, self.gate())
    }

    fn fire(&mut self, now: Instant) {
        // The beam is single-instance but the shot always makes noise.
        let _ = self
            .anims
            .trigger_laser(&mut self.layers, &mut self.timers, now);
        self.audio.play("laser");
    }
}
