mod client;
mod roster;

pub mod chatroom;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod group;
pub mod message;
pub mod push;
pub mod telemetry;
pub mod token;
pub mod transport;
pub mod types;
pub mod user;

pub use client::ImClient;
pub use config::{Config, ConfigLocation};
pub use dispatch::{CallOptions, Dispatcher, Reply};
pub use errors::{ApiError, Error};
pub use transport::{Body, Middleware, StaticHeader, Transport};
pub use types::{ActionResult, CursorQuery, Mute, MuteResult, Page, PageQuery, Thread};

#[cfg(test)]
mod tests;
