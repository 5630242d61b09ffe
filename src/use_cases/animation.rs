// Frame-by-frame effects: explosion sprite playback, the damage flash and
// the fired laser beam. Every effect owns a layer in the stack and a timer in
// the wheel; ticks arrive through the connection loop, never concurrently.

use crate::domain::geometry::{Mat4, Vec3};
use crate::domain::layers::{EffectId, LayerId, LayerKind, LayerStack, Rect};
use crate::domain::ports::{Canvas, QuadStyle, Rgba};
use crate::domain::sprites::SpriteSlice;
use crate::frameworks::config;
use crate::use_cases::timers::{TimerId, TimerTag, TimerWheel};
use std::collections::HashMap;
use tokio::time::Instant;

/// Where the beam appears to originate on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiringMode {
    FromBelow,
    FromAbove,
    /// Alternates between a left and a right turret on successive shots.
    FromTurretsAbove,
}

impl FiringMode {
    /// Mode selectors 1 through 3 as sent on the wire.
    pub fn from_selector(selector: u8) -> Option<Self> {
        match selector {
            1 => Some(FiringMode::FromBelow),
            2 => Some(FiringMode::FromAbove),
            3 => Some(FiringMode::FromTurretsAbove),
            _ => None,
        }
    }
}

/// One dash of the laser beam, travelling away from the camera along z.
#[derive(Debug, Clone, Copy)]
pub struct Dash {
    pub distance: f32,
    pub dash_len: f32,
    pub finished: bool,
    start: f32,
    ticks: u32,
}

impl Dash {
    pub fn new(distance: f32, dash_len: f32) -> Self {
        Self {
            distance,
            dash_len,
            finished: false,
            start: distance,
            ticks: 0,
        }
    }

    /// Advances the dash one tick; it finishes once its trailing edge reaches
    /// the maximum distance. The position is recomputed from the tick count
    /// so the finishing tick does not depend on accumulated rounding.
    pub fn advance(&mut self, increment: f32, max_distance: f32) {
        if self.finished {
            return;
        }
        self.ticks += 1;
        self.distance = self.start + increment * self.ticks as f32;
        if self.distance - self.dash_len >= max_distance {
            self.finished = true;
        }
    }

    /// Projects the dash's quad through the perspective matrix. `None` when
    /// the dash is finished or its leading edge has not cleared the near
    /// plane yet.
    pub fn project(
        &self,
        matrix: &Mat4,
        near: f32,
        thickness: f32,
        x_offset: f32,
        y_offset: f32,
    ) -> Option<[Vec3; 4]> {
        if self.finished {
            return None;
        }
        let z_lead = self.distance + 0.1;
        if z_lead <= near {
            return None;
        }
        let z_trail = (self.distance - self.dash_len) + 0.1;
        let corners = [
            Vec3::new(-thickness + x_offset, y_offset, z_lead),
            Vec3::new(thickness + x_offset, y_offset, z_lead),
            Vec3::new(thickness + x_offset, y_offset, z_trail),
            Vec3::new(-thickness + x_offset, y_offset, z_trail),
        ];
        Some(corners.map(|c| matrix.transform_point(c.clip_z(near))))
    }
}

#[derive(Debug)]
struct Explosion {
    frames: Vec<SpriteSlice>,
    dst: Rect,
    count: usize,
    layer: LayerId,
    timer: TimerId,
}

#[derive(Debug)]
struct DamageFlash {
    alpha: f32,
    direction: f32,
    layer: LayerId,
    timer: TimerId,
    timeout: TimerId,
}

#[derive(Debug)]
struct LaserBeam {
    dashes: Vec<Dash>,
    matrix: Mat4,
    layer: LayerId,
    timer: TimerId,
    viewport: Rect,
    origin_x: f32,
    origin_y: f32,
    x_offset: f32,
    y_offset: f32,
}

#[derive(Debug)]
enum Effect {
    Explosion(Explosion),
    Damage(DamageFlash),
    Laser(LaserBeam),
}

/// All running effects plus the re-entrancy guards that keep the damage
/// flash and the beam single-instance.
#[derive(Debug)]
pub struct Animations {
    effects: HashMap<EffectId, Effect>,
    next_effect: u64,
    animating_damage: bool,
    animating_beam: bool,
    turret_left_shot: bool,
    firing_mode: FiringMode,
}

impl Default for Animations {
    fn default() -> Self {
        Self {
            effects: HashMap::new(),
            next_effect: 0,
            animating_damage: false,
            animating_beam: false,
            turret_left_shot: false,
            firing_mode: FiringMode::FromTurretsAbove,
        }
    }
}

impl Animations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn firing_mode(&self) -> FiringMode {
        self.firing_mode
    }

    pub fn set_firing_mode(&mut self, mode: FiringMode) {
        self.firing_mode = mode;
    }

    pub fn is_animating_damage(&self) -> bool {
        self.animating_damage
    }

    pub fn is_animating_beam(&self) -> bool {
        self.animating_beam
    }

    pub fn is_running(&self, id: EffectId) -> bool {
        self.effects.contains_key(&id)
    }

    fn alloc_id(&mut self) -> EffectId {
        self.next_effect += 1;
        EffectId(self.next_effect)
    }

    /// Starts an explosion playing the given sprite frames over a centered
    /// region covering 80% of the surface. Any number may run at once.
    pub fn trigger_explosion(
        &mut self,
        frames: Vec<SpriteSlice>,
        layers: &mut LayerStack,
        timers: &mut TimerWheel,
        now: Instant,
    ) -> EffectId {
        let id = self.alloc_id();
        let layer = layers.insert_bottom(LayerKind::Effect(id), layers.surface_rect());
        let dst = Rect::new(
            layers.width() * 0.1,
            layers.height() * 0.1,
            layers.width() * 0.8,
            layers.height() * 0.8,
        );
        let timer = timers.start_interval(TimerTag::EffectTick(id), config::EXPLOSION_TICK, now);
        self.effects.insert(
            id,
            Effect::Explosion(Explosion {
                frames,
                dst,
                count: 0,
                layer,
                timer,
            }),
        );
        id
    }

    /// Starts the full-screen red damage flash. At most one runs at a time;
    /// a second trigger while one is active is ignored.
    pub fn trigger_damage_flash(
        &mut self,
        layers: &mut LayerStack,
        timers: &mut TimerWheel,
        now: Instant,
    ) -> Option<EffectId> {
        if self.animating_damage {
            return None;
        }
        self.animating_damage = true;
        let id = self.alloc_id();
        let layer = layers.insert_bottom(LayerKind::Effect(id), layers.surface_rect());
        let timer = timers.start_interval(TimerTag::EffectTick(id), config::DAMAGE_TICK, now);
        let timeout = timers.start_timeout(TimerTag::DamageTimeout(id), config::DAMAGE_TIMEOUT, now);
        self.effects.insert(
            id,
            Effect::Damage(DamageFlash {
                alpha: 0.0,
                direction: 1.0,
                layer,
                timer,
                timeout,
            }),
        );
        Some(id)
    }

    /// Fires the laser: three dashes racing away from the camera, projected
    /// into a clipped strip at the bottom center of the surface. At most one
    /// beam runs at a time.
    pub fn trigger_laser(
        &mut self,
        layers: &mut LayerStack,
        timers: &mut TimerWheel,
        now: Instant,
    ) -> Option<EffectId> {
        if self.animating_beam {
            return None;
        }
        self.animating_beam = true;

        let (x_offset, y_offset) = match self.firing_mode {
            FiringMode::FromBelow => (0.0, -config::TURRET_Y_OFFSET),
            FiringMode::FromAbove => (0.0, config::TURRET_Y_OFFSET),
            FiringMode::FromTurretsAbove => {
                let x = if self.turret_left_shot {
                    -config::TURRET_X_OFFSET
                } else {
                    config::TURRET_X_OFFSET
                };
                self.turret_left_shot = !self.turret_left_shot;
                (x, config::TURRET_Y_OFFSET)
            }
        };

        let width = layers.width();
        let height = layers.height();
        let matrix = Mat4::perspective(
            config::FOV_DEGREES,
            width / height,
            config::NEAR_PLANE,
            config::FAR_PLANE,
        );

        let pause_len = config::DASH_LEN / 2.0;
        let dashes = (0..config::NUM_DASHES)
            .map(|i| Dash::new(-(i as f32) * (config::DASH_LEN + pause_len), config::DASH_LEN))
            .collect();

        let strip = config::BEAM_THICKNESS + config::BLUR_THICKNESS;
        let origin_x = width / 2.0 - strip;
        let origin_y = height / 2.0;
        let viewport = Rect::new(origin_x, origin_y, strip * 2.0, height / 2.0);

        let id = self.alloc_id();
        let layer = layers.insert(LayerKind::Effect(id), layers.surface_rect());
        let timer = timers.start_interval(TimerTag::EffectTick(id), config::BEAM_TICK, now);
        self.effects.insert(
            id,
            Effect::Laser(LaserBeam {
                dashes,
                matrix,
                layer,
                timer,
                viewport,
                origin_x,
                origin_y,
                x_offset,
                y_offset,
            }),
        );
        Some(id)
    }

    /// Advances one effect by one tick. Finished effects close their layer,
    /// cancel their timers, damage the full surface and release their
    /// single-instance guard.
    pub fn on_tick(&mut self, id: EffectId, layers: &mut LayerStack, timers: &mut TimerWheel) {
        let Some(effect) = self.effects.get_mut(&id) else {
            return;
        };
        match effect {
            Effect::Explosion(explosion) => {
                // The counter walks one past the last frame; the extra tick
                // paints nothing and the one after it tears the layer down.
                if explosion.count == explosion.frames.len() {
                    timers.cancel(explosion.timer);
                    layers.close(explosion.layer);
                    layers.mark_damaged(None);
                    self.effects.remove(&id);
                } else {
                    explosion.count += 1;
                    layers.mark_damaged(Some(explosion.dst));
                }
            }
            Effect::Damage(flash) => {
                // Triangle wave between the thresholds; only the hard
                // timeout ends the flash.
                let next = flash.alpha + 0.1 * flash.direction;
                if next > 0.9 {
                    flash.direction = -1.0;
                } else if next < 0.1 {
                    flash.direction = 1.0;
                }
                flash.alpha = next;
                layers.mark_damaged(None);
            }
            Effect::Laser(beam) => {
                for dash in &mut beam.dashes {
                    dash.advance(config::BEAM_INCREMENT, config::MAX_BEAM_DISTANCE);
                }
                if beam.dashes.iter().all(|dash| dash.finished) {
                    timers.cancel(beam.timer);
                    layers.close(beam.layer);
                    layers.mark_damaged(None);
                    self.effects.remove(&id);
                    self.animating_beam = false;
                } else {
                    layers.mark_damaged(Some(beam.viewport));
                }
            }
        }
    }

    /// Ends the damage flash; its tick only oscillates the alpha, so this
    /// timeout is the sole terminator.
    pub fn on_damage_timeout(
        &mut self,
        id: EffectId,
        layers: &mut LayerStack,
        timers: &mut TimerWheel,
    ) {
        let Some(Effect::Damage(flash)) = self.effects.get(&id) else {
            return;
        };
        timers.cancel(flash.timer);
        layers.close(flash.layer);
        layers.mark_damaged(None);
        self.effects.remove(&id);
        self.animating_damage = false;
    }

    /// Paints one effect's layer during a redraw pass. `rect` is the layer's
    /// own rectangle as handed to the painter.
    pub fn paint(&self, id: EffectId, rect: Rect, canvas: &mut dyn Canvas) {
        let Some(effect) = self.effects.get(&id) else {
            return;
        };
        match effect {
            Effect::Explosion(explosion) => {
                if let Some(frame) = explosion.frames.get(explosion.count) {
                    frame.render(canvas, explosion.dst);
                }
            }
            Effect::Damage(flash) => {
                canvas.fill_rect(rect, Rgba::new(250, 10, 10, flash.alpha));
            }
            Effect::Laser(beam) => {
                canvas.push_clip(beam.viewport);
                let passes = [
                    (config::BEAM_THICKNESS, Rgba::opaque(255, 50, 50)),
                    (config::BEAM_THICKNESS / 5.0, Rgba::opaque(255, 120, 120)),
                ];
                for (thickness, fill) in passes {
                    for dash in &beam.dashes {
                        let Some(projected) = dash.project(
                            &beam.matrix,
                            config::NEAR_PLANE,
                            thickness,
                            beam.x_offset,
                            beam.y_offset,
                        ) else {
                            continue;
                        };
                        let corners =
                            projected.map(|v| [beam.origin_x + v.x, beam.origin_y + v.y]);
                        canvas.fill_quad(
                            corners,
                            QuadStyle {
                                fill,
                                blur: config::BLUR_THICKNESS,
                                additive: true,
                            },
                        );
                    }
                }
                canvas.pop_clip();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ImageHandle;
    use crate::domain::ports::test_support::{CanvasOp, RecordingCanvas};
    use crate::domain::sprites::slice_sheet;

    fn stack() -> LayerStack {
        LayerStack::new(800.0, 600.0)
    }

    fn three_frames() -> Vec<SpriteSlice> {
        slice_sheet(ImageHandle(1), 3, 128.0, 128.0, 3)
    }

    #[test]
    fn explosion_steps_through_frames_then_closes_its_layer() {
        let now = Instant::now();
        let mut layers = stack();
        let mut timers = TimerWheel::new();
        let mut anims = Animations::new();

        let id = anims.trigger_explosion(three_frames(), &mut layers, &mut timers, now);
        assert_eq!(layers.len(), 1);

        // Three ticks to walk past the last frame, a fourth to tear down.
        for _ in 0..3 {
            anims.on_tick(id, &mut layers, &mut timers);
        }
        assert!(anims.is_running(id));
        anims.on_tick(id, &mut layers, &mut timers);
        assert!(!anims.is_running(id));
        assert!(layers.has_damage());
        assert_eq!(timers.next_deadline(), None);

        let mut canvas = RecordingCanvas::default();
        layers.redraw(&mut canvas, |_, _, _| {});
        assert!(layers.is_empty());
    }

    #[test]
    fn explosion_paints_the_current_frame_into_the_inset_region() {
        let now = Instant::now();
        let mut layers = stack();
        let mut timers = TimerWheel::new();
        let mut anims = Animations::new();

        let id = anims.trigger_explosion(three_frames(), &mut layers, &mut timers, now);
        anims.on_tick(id, &mut layers, &mut timers);

        let mut canvas = RecordingCanvas::default();
        anims.paint(id, layers.surface_rect(), &mut canvas);
        match &canvas.ops[0] {
            CanvasOp::DrawImage(_, src, dst) => {
                // Second frame of a three-column sheet.
                assert_eq!(src.x, 128.0);
                assert_eq!(*dst, Rect::new(80.0, 60.0, 640.0, 480.0));
            }
            other => panic!("expected an image draw, got {other:?}"),
        }
    }

    #[test]
    fn damage_flash_is_single_instance() {
        let now = Instant::now();
        let mut layers = stack();
        let mut timers = TimerWheel::new();
        let mut anims = Animations::new();

        assert!(
            anims
                .trigger_damage_flash(&mut layers, &mut timers, now)
                .is_some()
        );
        assert!(
            anims
                .trigger_damage_flash(&mut layers, &mut timers, now)
                .is_none()
        );
    }

    #[test]
    fn damage_flash_oscillates_without_ending_on_its_own() {
        let now = Instant::now();
        let mut layers = stack();
        let mut timers = TimerWheel::new();
        let mut anims = Animations::new();

        let id = anims
            .trigger_damage_flash(&mut layers, &mut timers, now)
            .unwrap();
        // Well past a full rise and fall; the wave alone never stops it.
        for _ in 0..40 {
            anims.on_tick(id, &mut layers, &mut timers);
        }
        assert!(anims.is_running(id));
        assert!(anims.is_animating_damage());

        let mut canvas = RecordingCanvas::default();
        anims.paint(id, layers.surface_rect(), &mut canvas);
        match &canvas.ops[0] {
            CanvasOp::FillRect(rect, color) => {
                assert_eq!(*rect, layers.surface_rect());
                assert_eq!((color.r, color.g, color.b), (250, 10, 10));
                assert!(color.a >= 0.0 && color.a <= 1.0 + 1e-5);
            }
            other => panic!("expected a fill, got {other:?}"),
        }
    }

    #[test]
    fn damage_timeout_is_the_sole_terminator() {
        let now = Instant::now();
        let mut layers = stack();
        let mut timers = TimerWheel::new();
        let mut anims = Animations::new();

        let id = anims
            .trigger_damage_flash(&mut layers, &mut timers, now)
            .unwrap();
        anims.on_tick(id, &mut layers, &mut timers);
        anims.on_damage_timeout(id, &mut layers, &mut timers);
        assert!(!anims.is_running(id));
        assert!(!anims.is_animating_damage());
        assert_eq!(timers.next_deadline(), None);
    }

    #[test]
    fn laser_is_single_instance_until_all_dashes_finish() {
        let now = Instant::now();
        let mut layers = stack();
        let mut timers = TimerWheel::new();
        let mut anims = Animations::new();

        let id = anims.trigger_laser(&mut layers, &mut timers, now).unwrap();
        assert!(anims.trigger_laser(&mut layers, &mut timers, now).is_none());

        // The last dash starts at -1.5 and finishes once its trailing edge
        // clears 10.0; with 0.1 per tick that takes 120 ticks.
        for _ in 0..119 {
            anims.on_tick(id, &mut layers, &mut timers);
        }
        assert!(anims.is_running(id));
        anims.on_tick(id, &mut layers, &mut timers);
        assert!(!anims.is_running(id));
        assert!(!anims.is_animating_beam());
    }

    #[test]
    fn turret_mode_alternates_shot_sides() {
        let now = Instant::now();
        let mut layers = stack();
        let mut timers = TimerWheel::new();
        let mut anims = Animations::new();
        assert_eq!(anims.firing_mode(), FiringMode::FromTurretsAbove);

        let first = anims.trigger_laser(&mut layers, &mut timers, now).unwrap();
        let first_offset = match anims.effects.get(&first) {
            Some(Effect::Laser(beam)) => beam.x_offset,
            _ => unreachable!(),
        };
        // Finish the first beam so the guard releases.
        for _ in 0..120 {
            anims.on_tick(first, &mut layers, &mut timers);
        }

        let second = anims.trigger_laser(&mut layers, &mut timers, now).unwrap();
        let second_offset = match anims.effects.get(&second) {
            Some(Effect::Laser(beam)) => beam.x_offset,
            _ => unreachable!(),
        };
        assert_eq!(first_offset, -second_offset);
    }

    #[test]
    fn laser_paint_clips_to_the_beam_strip_and_fills_two_passes_per_dash() {
        let now = Instant::now();
        let mut layers = stack();
        let mut timers = TimerWheel::new();
        let mut anims = Animations::new();

        let id = anims.trigger_laser(&mut layers, &mut timers, now).unwrap();
        // Advance until every dash's leading edge clears the near plane:
        // the last dash starts at -1.5, so 17 ticks bring it to 0.2.
        for _ in 0..17 {
            anims.on_tick(id, &mut layers, &mut timers);
        }

        let mut canvas = RecordingCanvas::default();
        anims.paint(id, layers.surface_rect(), &mut canvas);

        let strip = 4.0 + 16.0;
        assert_eq!(
            canvas.ops.first(),
            Some(&CanvasOp::PushClip(Rect::new(
                400.0 - strip,
                300.0,
                strip * 2.0,
                300.0
            )))
        );
        assert_eq!(canvas.ops.last(), Some(&CanvasOp::PopClip));
        let quads = canvas
            .ops
            .iter()
            .filter(|op| matches!(op, CanvasOp::FillQuad(..)))
            .count();
        assert_eq!(quads, 6);
    }

    #[test]
    fn dashes_behind_the_near_plane_are_skipped() {
        let dash = Dash::new(-0.75, 0.5);
        let matrix = Mat4::perspective(45.0, 4.0 / 3.0, 0.1, 1000.0);
        assert!(dash.project(&matrix, 0.1, 4.0, 0.0, 10.0).is_none());

        let visible = Dash::new(0.5, 0.5);
        assert!(visible.project(&matrix, 0.1, 4.0, 0.0, 10.0).is_some());
    }
}
