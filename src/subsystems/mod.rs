//! Services and the runtime they share.

pub mod bot;
#[cfg(feature = "channel-discord")]
pub mod discord;
#[cfg(feature = "channel-axum")]
pub mod http;
pub mod runtime;
