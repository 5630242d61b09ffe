// Interface adapters: the wire codec and the WebSocket connection loop.

pub mod net;
pub mod protocol;

pub use net::run_client;
pub use protocol::{Frame, OutboundCommand, ServerEvent, classify_frame, encode_frame};
