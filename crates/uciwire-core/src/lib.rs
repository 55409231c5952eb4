//! Local configuration overlay between UCI consumers and a ubus JSON-RPC remote.
//!
//! This crate owns the configuration data model and the mutation/sync
//! lifecycle for the uciwire workspace:
//!
//! - **[`Overlay`]**: Explicit instance owned by the composition root.
//!   [`load()`](Overlay::load) fetches and caches a configuration (concurrent
//!   loads share one in-flight request), the synchronous query and mutation
//!   methods work against the cached snapshot plus pending logs, and
//!   [`save()`](Overlay::save) flushes everything in phase order: deletes,
//!   creates, changes, reorders, then a reload.
//!
//! - **Apply/confirm**: [`Overlay::apply()`] activates saved changes with a
//!   remote rollback timer and races to confirm them before it fires.
//!   Progress is observable through [`Overlay::apply_state()`].
//!
//! - **[`ConfigService`]**: Seam between the overlay and the transport.
//!   Implemented for [`uciwire_api::UbusClient`]; tests plug in a mock.
//!
//! - **Domain model** ([`model`]): [`Section`], tagged [`OptionValue`]s,
//!   structured [`SectionRef`]s (`lan` or `@interface[-1]`), and typed remote
//!   [`Change`] records.

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod overlay;
pub mod remote;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ApplySettings, AuthCredentials, RemoteConfig, TlsVerification};
pub use error::CoreError;
pub use model::{Change, ChangeOp, OptionValue, Section, SectionRef};
pub use overlay::{ApplyState, CreatedSection, Overlay, RemoteOverlay, SaveReport};
pub use remote::ConfigService;
pub use uciwire_api::UbusStatus;
