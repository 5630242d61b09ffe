// On-screen control buttons and keyboard input, translated into outbound
// drive commands. All input is gated on the same four conditions: buttons
// enabled, connection up, not reloading, not waiting after a fatal hit.

use crate::domain::layers::Rect;
use crate::domain::ports::{Canvas, ImageHandle, MotionSample};
use crate::frameworks::config;
use crate::interface_adapters::protocol::OutboundCommand;

/// Conditions sampled at input time that decide whether a press or key is
/// allowed to produce a command.
#[derive(Debug, Clone, Copy)]
pub struct InputGate {
    pub connected: bool,
    pub loading: bool,
    pub waiting: bool,
}

impl InputGate {
    fn blocks(&self, buttons_disabled: bool) -> bool {
        buttons_disabled || !self.connected || self.loading || self.waiting
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Space,
    F1,
    F2,
    F3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeldButton {
    Up,
    Down,
    Left,
    Right,
    Fire,
    Engine,
}

impl HeldButton {
    fn is_directional(self) -> bool {
        matches!(
            self,
            HeldButton::Up | HeldButton::Down | HeldButton::Left | HeldButton::Right
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ControlButton {
    pub rect: Rect,
    pub image: ImageHandle,
}

impl ControlButton {
    fn new(image: ImageHandle) -> Self {
        Self {
            rect: Rect::new(0.0, 0.0, config::BUTTON_SIZE, config::BUTTON_SIZE),
            image,
        }
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.rect.x = x;
        self.rect.y = y;
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        let src = Rect::new(0.0, 0.0, self.rect.w, self.rect.h);
        canvas.draw_image(self.image, src, self.rect);
    }
}

/// Image handles for the button artwork.
#[derive(Debug, Clone, Copy)]
pub struct ButtonImages {
    pub up: ImageHandle,
    pub down: ImageHandle,
    pub left: ImageHandle,
    pub right: ImageHandle,
    pub fire: ImageHandle,
    pub engine: ImageHandle,
}

/// What one press produced: zero or more commands, plus whether the trigger
/// was pulled (the caller starts the beam and sound on that).
#[derive(Debug, Clone, PartialEq)]
pub struct InputOutcome {
    pub commands: Vec<OutboundCommand>,
    pub fired: bool,
}

impl InputOutcome {
    fn none() -> Self {
        Self {
            commands: Vec::new(),
            fired: false,
        }
    }
}

#[derive(Debug)]
pub struct Controls {
    pub btn_up: ControlButton,
    pub btn_down: ControlButton,
    pub btn_left: ControlButton,
    pub btn_right: ControlButton,
    pub btn_fire: ControlButton,
    /// Only drawn and hit-tested in tilt mode.
    pub btn_engine: ControlButton,
    held: Option<HeldButton>,
    /// True until the HUD has been laid out and drawn at least once.
    pub buttons_disabled: bool,
    pub engines_on: bool,
    pub tilt_controls: bool,
}

impl Controls {
    pub fn new(images: ButtonImages, tilt_controls: bool) -> Self {
        Self {
            btn_up: ControlButton::new(images.up),
            btn_down: ControlButton::new(images.down),
            btn_left: ControlButton::new(images.left),
            btn_right: ControlButton::new(images.right),
            btn_fire: ControlButton::new(images.fire),
            btn_engine: ControlButton::new(images.engine),
            held: None,
            buttons_disabled: true,
            engines_on: false,
            tilt_controls,
        }
    }

    /// Anchors the buttons to the bottom corners of the surface.
    pub fn reposition(&mut self, width: f32, height: f32) {
        let size = config::BUTTON_SIZE;
        let margin = config::BUTTON_MARGIN;
        if self.tilt_controls {
            self.btn_engine
                .move_to(width - size - margin, height - size - margin);
        } else {
            let column = width - size * 2.0 - margin;
            self.btn_up.move_to(column, height - size * 2.0 - margin);
            self.btn_down.move_to(column, height - size - margin);
            let row = height - size * 3.0 / 2.0 - margin;
            self.btn_left.move_to(width - size * 17.0 / 6.0 - margin, row);
            self.btn_right.move_to(width - size * 7.0 / 6.0 - margin, row);
        }
        self.btn_fire.move_to(margin, height - size - margin);
    }

    /// Pointer press at surface coordinates. A directional press sends its
    /// drive command and is remembered until release; the fire button is
    /// checked independently of mode.
    pub fn press(&mut self, x: f32, y: f32, gate: InputGate) -> InputOutcome {
        if gate.blocks(self.buttons_disabled) {
            return InputOutcome::none();
        }
        let mut outcome = InputOutcome::none();
        if self.tilt_controls {
            if self.btn_engine.rect.contains(x, y) {
                self.engines_on = true;
                self.held = Some(HeldButton::Engine);
            }
        } else if self.btn_up.rect.contains(x, y) {
            outcome.commands.push(OutboundCommand::Forward);
            self.held = Some(HeldButton::Up);
        } else if self.btn_down.rect.contains(x, y) {
            outcome.commands.push(OutboundCommand::Backward);
            self.held = Some(HeldButton::Down);
        } else if self.btn_left.rect.contains(x, y) {
            outcome.commands.push(OutboundCommand::Left);
            self.held = Some(HeldButton::Left);
        } else if self.btn_right.rect.contains(x, y) {
            outcome.commands.push(OutboundCommand::Right);
            self.held = Some(HeldButton::Right);
        }
        if self.btn_fire.rect.contains(x, y) {
            outcome.commands.push(OutboundCommand::Fire);
            outcome.fired = true;
            self.held = Some(HeldButton::Fire);
        }
        outcome
    }

    /// Pointer release. A held directional button sends the stop command,
    /// connection permitting; tilt engines always cut out.
    pub fn release(&mut self, connected: bool) -> Option<OutboundCommand> {
        let stop = match self.held {
            Some(held) if held.is_directional() && connected => Some(OutboundCommand::Stop),
            _ => None,
        };
        self.held = None;
        self.engines_on = false;
        stop
    }

    pub fn key_down(&mut self, key: Key, gate: InputGate) -> InputOutcome {
        if gate.blocks(self.buttons_disabled) {
            return InputOutcome::none();
        }
        let mut outcome = InputOutcome::none();
        match key {
            Key::Up => outcome.commands.push(OutboundCommand::Forward),
            Key::Down => outcome.commands.push(OutboundCommand::Backward),
            Key::Left => outcome.commands.push(OutboundCommand::Left),
            Key::Right => outcome.commands.push(OutboundCommand::Right),
            Key::F1 => outcome.commands.push(OutboundCommand::FireMode(1)),
            Key::F2 => outcome.commands.push(OutboundCommand::FireMode(2)),
            Key::F3 => outcome.commands.push(OutboundCommand::FireMode(3)),
            Key::Space => {
                outcome.commands.push(OutboundCommand::Fire);
                outcome.fired = true;
            }
        }
        outcome
    }

    /// Key release; only the arrows send the stop command, and they do so
    /// regardless of the press-time gate, connection permitting.
    pub fn key_up(&mut self, key: Key, connected: bool) -> Option<OutboundCommand> {
        match key {
            Key::Up | Key::Down | Key::Left | Key::Right if connected => {
                Some(OutboundCommand::Stop)
            }
            _ => None,
        }
    }

    /// Tilt drive: while the engine button is held, pitch and roll pick the
    /// direction. The dominant axis wins; the dead zone sends nothing.
    pub fn tilt_command(&self, sample: MotionSample, gate: InputGate) -> Option<OutboundCommand> {
        if !self.tilt_controls || !self.engines_on || gate.blocks(self.buttons_disabled) {
            return None;
        }
        let pitch = sample.beta;
        let roll = sample.gamma;
        if pitch.abs() < config::TILT_DEAD_ZONE_DEGREES
            && roll.abs() < config::TILT_DEAD_ZONE_DEGREES
        {
            return None;
        }
        if pitch.abs() >= roll.abs() {
            Some(if pitch < 0.0 {
                OutboundCommand::Forward
            } else {
                OutboundCommand::Backward
            })
        } else {
            Some(if roll < 0.0 {
                OutboundCommand::Left
            } else {
                OutboundCommand::Right
            })
        }
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        if self.tilt_controls {
            self.btn_engine.draw(canvas);
        } else {
            self.btn_up.draw(canvas);
            self.btn_down.draw(canvas);
            self.btn_left.draw(canvas);
            self.btn_right.draw(canvas);
        }
        self.btn_fire.draw(canvas);
    }
}
