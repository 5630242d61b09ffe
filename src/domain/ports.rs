// Ports for the host collaborators: the drawing surface, the surrounding
// page shell, the audio trigger and the motion/orientation data source.
// The runtime only ever talks to these traits; DOM lookup, audio decoding
// and sensor sampling stay outside.

use crate::domain::layers::Rect;

/// Opaque handle to an image the host has already loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }
}

/// Fill parameters for a projected beam quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadStyle {
    pub fill: Rgba,
    /// Shadow/blur radius in pixels.
    pub blur: f32,
    /// Additive ("lighter") compositing instead of source-over.
    pub additive: bool,
}

/// Drawing surface capability. Mirrors the subset of a 2D canvas context the
/// runtime actually uses.
pub trait Canvas: Send {
    fn clear(&mut self, rect: Rect);
    fn fill_rect(&mut self, rect: Rect, color: Rgba);
    fn draw_image(&mut self, image: ImageHandle, src: Rect, dst: Rect);
    fn fill_quad(&mut self, corners: [[f32; 2]; 4], style: QuadStyle);
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: &str);
    fn stroke_text(&mut self, text: &str, x: f32, y: f32);
    fn push_clip(&mut self, rect: Rect);
    fn pop_clip(&mut self);
}

/// Charging indicator panels; exactly one may be visible at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeIndicator {
    Depleted,
    Full,
    Charging,
}

/// The page around the play surface: banners, overlay panels and navigation
/// between the game's screens.
pub trait Shell: Send {
    fn set_disconnected_visible(&mut self, visible: bool);
    fn set_playfield_visible(&mut self, visible: bool);
    fn set_orientation_hint_visible(&mut self, visible: bool);
    fn show_charge_panel(&mut self, panel: ChargeIndicator);
    fn hide_charge_panel(&mut self, panel: ChargeIndicator);
    fn set_charge_remaining(&mut self, remaining: u32);
    fn clear_wait_barrier(&mut self);
    fn display_ready_message(&mut self);
    fn enter_lobby(&mut self);
    fn enter_driving(&mut self);
    fn enter_summary(&mut self);
    fn enter_login(&mut self);
}

/// Fire-and-forget sound effect trigger.
pub trait AudioTrigger: Send {
    fn play(&mut self, effect: &str);
}

/// One sample of device orientation and acceleration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    /// Rotation around the axis perpendicular to the ground, degrees.
    pub alpha: f32,
    /// Rotation around the west-east axis, degrees in [-180, 180].
    pub beta: f32,
    /// Rotation around the south-north axis, degrees in [-90, 90].
    pub gamma: f32,
    pub accel_x: f32,
    pub accel_y: f32,
    pub accel_z: f32,
}

/// Motion/orientation data source; `None` until the first sample arrives.
pub trait MotionSource: Send + Sync {
    fn sample(&self) -> Option<MotionSample>;
}

#[cfg(test)]
pub mod test_support {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum CanvasOp {
        Clear(Rect),
        FillRect(Rect, Rgba),
        DrawImage(ImageHandle, Rect, Rect),
        FillQuad([[f32; 2]; 4], QuadStyle),
        FillCircle(f32, f32, f32, String),
        StrokeText(String, f32, f32),
        PushClip(Rect),
        PopClip,
    }

    /// Canvas that records every call for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingCanvas {
        pub ops: Vec<CanvasOp>,
        pub cleared: Vec<Rect>,
    }

    impl Canvas for RecordingCanvas {
        fn clear(&mut self, rect: Rect) {
            self.cleared.push(rect);
            self.ops.push(CanvasOp::Clear(rect));
        }

        fn fill_rect(&mut self, rect: Rect, color: Rgba) {
            self.ops.push(CanvasOp::FillRect(rect, color));
        }

        fn draw_image(&mut self, image: ImageHandle, src: Rect, dst: Rect) {
            self.ops.push(CanvasOp::DrawImage(image, src, dst));
        }

        fn fill_quad(&mut self, corners: [[f32; 2]; 4], style: QuadStyle) {
            self.ops.push(CanvasOp::FillQuad(corners, style));
        }

        fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: &str) {
            self.ops
                .push(CanvasOp::FillCircle(cx, cy, radius, color.to_string()));
        }

        fn stroke_text(&mut self, text: &str, x: f32, y: f32) {
            self.ops.push(CanvasOp::StrokeText(text.to_string(), x, y));
        }

        fn push_clip(&mut self, rect: Rect) {
            self.ops.push(CanvasOp::PushClip(rect));
        }

        fn pop_clip(&mut self) {
            self.ops.push(CanvasOp::PopClip);
        }
    }

    /// Shell that records panel/banner calls.
    #[derive(Debug, Default)]
    pub struct RecordingShell {
        pub disconnected_visible: Option<bool>,
        pub playfield_visible: Option<bool>,
        pub shown_panels: Vec<ChargeIndicator>,
        pub hidden_panels: Vec<ChargeIndicator>,
        pub charge_remaining: Vec<u32>,
        pub wait_cleared: bool,
        pub ready_displayed: bool,
        pub navigations: Vec<&'static str>,
    }

    impl Shell for RecordingShell {
        fn set_disconnected_visible(&mut self, visible: bool) {
            self.disconnected_visible = Some(visible);
        }

        fn set_playfield_visible(&mut self, visible: bool) {
            self.playfield_visible = Some(visible);
        }

        fn set_orientation_hint_visible(&mut self, _visible: bool) {}

        fn show_charge_panel(&mut self, panel: ChargeIndicator) {
            self.shown_panels.push(panel);
        }

        fn hide_charge_panel(&mut self, panel: ChargeIndicator) {
            self.hidden_panels.push(panel);
        }

        fn set_charge_remaining(&mut self, remaining: u32) {
            self.charge_remaining.push(remaining);
        }

        fn clear_wait_barrier(&mut self) {
            self.wait_cleared = true;
        }

        fn display_ready_message(&mut self) {
            self.ready_displayed = true;
        }

        fn enter_lobby(&mut self) {
            self.navigations.push("lobby");
        }

        fn enter_driving(&mut self) {
            self.navigations.push("driving");
        }

        fn enter_summary(&mut self) {
            self.navigations.push("summary");
        }

        fn enter_login(&mut self) {
            self.navigations.push("login");
        }
    }

    /// Audio trigger that records effect names.
    #[derive(Debug, Default)]
    pub struct RecordingAudio {
        pub played: Vec<String>,
    }

    impl AudioTrigger for RecordingAudio {
        fn play(&mut self, effect: &str) {
            self.played.push(effect.to_string());
        }
    }
}
