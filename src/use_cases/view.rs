// Driving view composition: a background layer, a HUD layer with the
// buttons and mini-displays, and whatever effect layers are running in
// between. The HUD top row is wifi icon, signal text, hearts, color disc
// and latency, left to right.

use crate::domain::layers::{LayerId, LayerKind, LayerStack, Rect};
use crate::domain::ports::{Canvas, ImageHandle, Rgba};
use crate::use_cases::animation::Animations;
use crate::use_cases::context::ClientContext;
use crate::use_cases::control::Controls;

const ICON_SIZE: f32 = 32.0;
const ICON_Y: f32 = 2.0;
const TEXT_BASELINE: f32 = 25.0;
const HEART_ROW_X: f32 = 100.0;
const HEART_STRIDE: f32 = 36.0;
const COLOR_RADIUS: f32 = 16.0;
const PING_GAP: f32 = 40.0;
/// Room for a four digit reading.
const PING_TEXT_WIDTH: f32 = 56.0;

/// Image handles for the HUD artwork.
#[derive(Debug, Clone, Copy)]
pub struct ViewAssets {
    pub heart: ImageHandle,
    /// Signal strength icons, weakest to strongest.
    pub wifi_levels: [ImageHandle; 5],
}

/// The two permanent layers of the driving view.
#[derive(Debug, Clone, Copy)]
pub struct View {
    pub background: LayerId,
    pub hud: LayerId,
}

/// Builds the permanent layers and damages the whole surface for the first
/// paint.
pub fn build(layers: &mut LayerStack) -> View {
    let full = layers.surface_rect();
    let background = layers.insert_bottom(LayerKind::Background, full);
    let hud = layers.insert(LayerKind::Hud, full);
    layers.mark_damaged(None);
    View { background, hud }
}

/// Repaints the damaged region. Drawing the buttons is what arms them; input
/// stays disabled until the HUD has been on screen once.
pub fn redraw(
    layers: &mut LayerStack,
    canvas: &mut dyn Canvas,
    ctx: &ClientContext,
    controls: &mut Controls,
    anims: &Animations,
    assets: &ViewAssets,
) {
    let width = layers.width();
    layers.redraw(canvas, |kind, rect, canvas| match kind {
        LayerKind::Background => {}
        LayerKind::Hud => {
            controls.draw(canvas);
            controls.buttons_disabled = false;
            draw_wifi(canvas, ctx, assets);
            draw_life(canvas, ctx, assets);
            draw_color(canvas, ctx, width);
            draw_ping(canvas, ctx, width);
        }
        LayerKind::Effect(id) => anims.paint(*id, rect, canvas),
    });
}

/// Orientation change. Landscape lays the view out again and repaints
/// everything; portrait hides the HUD and disarms input until the device is
/// turned back.
pub fn handle_resize(
    view: &View,
    layers: &mut LayerStack,
    canvas: &mut dyn Canvas,
    controls: &mut Controls,
    width: f32,
    height: f32,
) {
    let landscape = width > height;
    if landscape {
        layers.resize(width, height);
        controls.reposition(width, height);
        layers.show(view.hud);
        layers.mark_damaged(None);
    } else {
        layers.hide(view.hud);
        canvas.clear(layers.surface_rect());
        controls.buttons_disabled = true;
    }
}

fn draw_wifi(canvas: &mut dyn Canvas, ctx: &ClientContext, assets: &ViewAssets) {
    if ctx.wifi_level == 0 {
        return;
    }
    let icon = assets.wifi_levels[ctx.wifi_level.min(4) as usize];
    let size = Rect::new(0.0, 0.0, ICON_SIZE, ICON_SIZE);
    canvas.draw_image(icon, size, Rect::new(2.0, ICON_Y, ICON_SIZE, ICON_SIZE));
    canvas.fill_rect(
        Rect::new(34.0, ICON_Y, 50.0, ICON_SIZE),
        Rgba::opaque(255, 255, 255),
    );
    canvas.stroke_text(&format!("{}%", ctx.wifi), 36.0, TEXT_BASELINE);
}

fn draw_life(canvas: &mut dyn Canvas, ctx: &ClientContext, assets: &ViewAssets) {
    let size = Rect::new(0.0, 0.0, ICON_SIZE, ICON_SIZE);
    for i in 0..ctx.life {
        canvas.draw_image(
            assets.heart,
            size,
            Rect::new(
                HEART_ROW_X + i as f32 * HEART_STRIDE,
                ICON_Y,
                ICON_SIZE,
                ICON_SIZE,
            ),
        );
    }
}

fn heart_row_end(ctx: &ClientContext) -> f32 {
    HEART_ROW_X + ctx.max_life as f32 * HEART_STRIDE + ICON_SIZE
}

fn draw_color(canvas: &mut dyn Canvas, ctx: &ClientContext, width: f32) {
    let Some(color) = ctx.robot_color.as_deref() else {
        return;
    };
    if color.is_empty() {
        return;
    }
    let end = heart_row_end(ctx);
    if end + COLOR_RADIUS * 2.0 > width {
        return;
    }
    canvas.fill_circle(end + COLOR_RADIUS, COLOR_RADIUS + ICON_Y, COLOR_RADIUS, color);
}

fn draw_ping(canvas: &mut dyn Canvas, ctx: &ClientContext, width: f32) {
    let Some(ping) = ctx.ping else {
        return;
    };
    if ping == 0 {
        return;
    }
    let text_x = heart_row_end(ctx) + PING_GAP;
    if text_x + PING_TEXT_WIDTH > width {
        return;
    }
    canvas.fill_rect(
        Rect::new(text_x, ICON_Y, PING_TEXT_WIDTH, ICON_SIZE),
        Rgba::opaque(255, 255, 255),
    );
    canvas.stroke_text(&ping.to_string(), text_x, TEXT_BASELINE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::test_support::{CanvasOp, RecordingCanvas};
    use crate::use_cases::animation::Animations;
    use crate::use_cases::context::ClientMode;
    use crate::use_cases::control::ButtonImages;

    fn assets() -> ViewAssets {
        ViewAssets {
            heart: ImageHandle(10),
            wifi_levels: [
                ImageHandle(20),
                ImageHandle(21),
                ImageHandle(22),
                ImageHandle(23),
                ImageHandle(24),
            ],
        }
    }

    fn controls() -> Controls {
        Controls::new(
            ButtonImages {
                up: ImageHandle(1),
                down: ImageHandle(2),
                left: ImageHandle(3),
                right: ImageHandle(4),
                fire: ImageHandle(5),
                engine: ImageHandle(6),
            },
            false,
        )
    }

    fn ctx() -> ClientContext {
        ClientContext::new("s".to_string(), "ana".to_string(), ClientMode::Driving)
    }

    #[test]
    fn first_redraw_arms_the_buttons() {
        let mut layers = LayerStack::new(800.0, 600.0);
        build(&mut layers);
        let mut controls = controls();
        controls.reposition(800.0, 600.0);
        assert!(controls.buttons_disabled);

        let mut canvas = RecordingCanvas::default();
        redraw(
            &mut layers,
            &mut canvas,
            &ctx(),
            &mut controls,
            &Animations::new(),
            &assets(),
        );
        assert!(!controls.buttons_disabled);
        // Five buttons drawn.
        let images = canvas
            .ops
            .iter()
            .filter(|op| matches!(op, CanvasOp::DrawImage(..)))
            .count();
        assert_eq!(images, 5);
    }

    #[test]
    fn hud_shows_wifi_hearts_and_ping_when_known() {
        let mut layers = LayerStack::new(800.0, 600.0);
        build(&mut layers);
        let mut controls = controls();
        controls.reposition(800.0, 600.0);

        let mut ctx = ctx();
        ctx.set_wifi(82);
        ctx.set_life(3);
        ctx.ping = Some(120);
        ctx.robot_color = Some("red".to_string());

        let mut canvas = RecordingCanvas::default();
        redraw(
            &mut layers,
            &mut canvas,
            &ctx,
            &mut controls,
            &Animations::new(),
            &assets(),
        );

        // Strongest signal icon.
        assert!(
            canvas
                .ops
                .iter()
                .any(|op| matches!(op, CanvasOp::DrawImage(ImageHandle(24), _, _)))
        );
        let hearts = canvas
            .ops
            .iter()
            .filter(|op| matches!(op, CanvasOp::DrawImage(ImageHandle(10), _, _)))
            .count();
        assert_eq!(hearts, 3);
        assert!(
            canvas
                .ops
                .iter()
                .any(|op| matches!(op, CanvasOp::StrokeText(text, _, _) if text == "120"))
        );
        assert!(
            canvas
                .ops
                .iter()
                .any(|op| matches!(op, CanvasOp::FillCircle(_, _, _, color) if color == "red"))
        );
    }

    #[test]
    fn ping_text_is_clipped_when_it_would_overflow() {
        let mut layers = LayerStack::new(300.0, 600.0);
        build(&mut layers);
        let mut controls = controls();
        controls.reposition(300.0, 600.0);

        let mut ctx = ctx();
        ctx.set_life(4);
        ctx.ping = Some(50);

        let mut canvas = RecordingCanvas::default();
        redraw(
            &mut layers,
            &mut canvas,
            &ctx,
            &mut controls,
            &Animations::new(),
            &assets(),
        );
        assert!(
            !canvas
                .ops
                .iter()
                .any(|op| matches!(op, CanvasOp::StrokeText(text, _, _) if text == "50"))
        );
    }

    #[test]
    fn portrait_resize_hides_the_hud_and_disarms_input() {
        let mut layers = LayerStack::new(800.0, 600.0);
        let view = build(&mut layers);
        let mut controls = controls();
        controls.reposition(800.0, 600.0);
        controls.buttons_disabled = false;

        let mut canvas = RecordingCanvas::default();
        handle_resize(&view, &mut layers, &mut canvas, &mut controls, 600.0, 800.0);
        assert!(!layers.is_visible(view.hud));
        assert!(controls.buttons_disabled);
        assert_eq!(canvas.cleared.len(), 1);

        handle_resize(&view, &mut layers, &mut canvas, &mut controls, 800.0, 600.0);
        assert!(layers.is_visible(view.hud));
        assert!(layers.has_damage());
    }
}
