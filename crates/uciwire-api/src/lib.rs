// uciwire-api: Async Rust client for the ubus JSON-RPC endpoint

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod status;
pub mod transport;
pub mod uci;

pub use auth::ANONYMOUS_SESSION;
pub use client::{CallReply, UbusClient};
pub use error::Error;
pub use models::{LoginReply, UciSectionRecord};
pub use status::UbusStatus;
