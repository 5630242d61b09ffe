// Domain layer: pure presentation and state types with no IO.

pub mod geometry;
pub mod layers;
pub mod ports;
pub mod roster;
pub mod sprites;

pub use geometry::{Mat4, Vec3};
pub use layers::{EffectId, LayerId, LayerKind, LayerStack, Rect};
pub use ports::{
    AudioTrigger, Canvas, ChargeIndicator, ImageHandle, MotionSample, MotionSource, QuadStyle,
    Rgba, Shell,
};
pub use roster::{PlayerEntry, RobotEntry, Roster};
pub use sprites::SpriteSlice;
