// Use cases layer: the client's application logic, driven entirely by the
// connection loop.

pub mod animation;
pub mod charging;
pub mod context;
pub mod control;
pub mod lobby;
pub mod session;
pub mod timers;
pub mod view;

pub use context::{ClientContext, ClientMode};
pub use session::{Client, TimerOutcome};
pub use view::{View, ViewAssets};
