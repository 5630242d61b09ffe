// Layer compositor: an ordered back-to-front stack of rectangular drawable
// regions over one surface, with a damage region so a redraw pass only
// repaints when something actually changed. Effect state stays with its
// owner; the painter is injected per redraw pass.

use crate::domain::ports::Canvas;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Inclusive axis-aligned containment, matching on-screen button
    /// hit-testing.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.w && y >= self.y && y <= self.y + self.h
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = (self.x + self.w).max(other.x + other.w);
        let y1 = (self.y + self.h).max(other.y + other.h);
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(u64);

/// Identifier of a running animation effect, used to route a layer's paint
/// call back to the owning effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectId(pub u64);

/// Tags the painter responsible for a layer's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Background,
    Hud,
    Effect(EffectId),
}

#[derive(Debug)]
struct Layer {
    id: LayerId,
    kind: LayerKind,
    rect: Rect,
    visible: bool,
    closed: bool,
}

/// Ordered stack of layers; index 0 is the bottom.
#[derive(Debug)]
pub struct LayerStack {
    width: f32,
    height: f32,
    next_id: u64,
    layers: Vec<Layer>,
    damage: Option<Rect>,
}

impl LayerStack {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            next_id: 1,
            layers: Vec::new(),
            damage: None,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn surface_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    fn alloc(&mut self, kind: LayerKind, rect: Rect) -> Layer {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        Layer {
            id,
            kind,
            rect,
            visible: true,
            closed: false,
        }
    }

    /// Inserts a layer on top of the stack.
    pub fn insert(&mut self, kind: LayerKind, rect: Rect) -> LayerId {
        let layer = self.alloc(kind, rect);
        let id = layer.id;
        self.layers.push(layer);
        id
    }

    /// Inserts a layer at the bottom of the stack.
    pub fn insert_bottom(&mut self, kind: LayerKind, rect: Rect) -> LayerId {
        let layer = self.alloc(kind, rect);
        let id = layer.id;
        self.layers.insert(0, layer);
        id
    }

    pub fn lower_to_bottom(&mut self, id: LayerId) {
        if let Some(pos) = self.position(id) {
            let layer = self.layers.remove(pos);
            self.layers.insert(0, layer);
        }
    }

    pub fn remove(&mut self, id: LayerId) {
        self.layers.retain(|l| l.id != id);
    }

    /// Marks a layer closed; it stops painting immediately and is swept on
    /// the next redraw pass.
    pub fn close(&mut self, id: LayerId) {
        if let Some(layer) = self.layer_mut(id) {
            layer.closed = true;
        }
    }

    pub fn show(&mut self, id: LayerId) {
        if let Some(layer) = self.layer_mut(id) {
            layer.visible = true;
        }
    }

    pub fn hide(&mut self, id: LayerId) {
        if let Some(layer) = self.layer_mut(id) {
            layer.visible = false;
        }
    }

    pub fn is_visible(&self, id: LayerId) -> bool {
        self.layers
            .iter()
            .any(|l| l.id == id && l.visible && !l.closed)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.iter().any(|l| l.id == id && !l.closed)
    }

    pub fn len(&self) -> usize {
        self.layers.iter().filter(|l| !l.closed).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resizes the surface; layers that covered the whole old surface keep
    /// covering the new one.
    pub fn resize(&mut self, width: f32, height: f32) {
        let old = self.surface_rect();
        self.width = width;
        self.height = height;
        let full = self.surface_rect();
        for layer in &mut self.layers {
            if layer.rect == old {
                layer.rect = full;
            }
        }
    }

    /// Extends the damage region. `None` damages the whole surface.
    pub fn mark_damaged(&mut self, rect: Option<Rect>) {
        let rect = rect.unwrap_or_else(|| self.surface_rect());
        self.damage = Some(match self.damage {
            Some(existing) => existing.union(&rect),
            None => rect,
        });
    }

    pub fn has_damage(&self) -> bool {
        self.damage.is_some()
    }

    /// Repaints the damaged region: sweeps closed layers, clears the damage
    /// rect and paints visible layers in back-to-front order. A pass with no
    /// damage paints nothing.
    pub fn redraw<F>(&mut self, canvas: &mut dyn Canvas, mut painter: F)
    where
        F: FnMut(&LayerKind, Rect, &mut dyn Canvas),
    {
        self.layers.retain(|l| !l.closed);
        let Some(damage) = self.damage.take() else {
            return;
        };
        canvas.clear(damage);
        for layer in &self.layers {
            if layer.visible {
                painter(&layer.kind, layer.rect, canvas);
            }
        }
    }

    fn position(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }
}
