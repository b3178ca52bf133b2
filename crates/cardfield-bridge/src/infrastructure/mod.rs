//! Infrastructure layer of the CardField bridge.
//!
//! Concrete implementations of the seams the application layer defines.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `cardfield_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`native_surface`** – Card widget implementations.  The headless
//!   `SimulatedCardWidget` applies the real field rules without rendering.
//!
//! - **`event_sink`** – `HostEventSink` implementations: an in-memory
//!   recorder and a Tokio channel forwarder.
//!
//! - **`fonts`** – The installed-family catalog used to resolve
//!   `cardStyle.fontFamily`.
//!
//! - **`ui_thread`** – Confines the component registry to one thread and
//!   marshals host calls onto it.
//!
//! - **`storage`** – TOML configuration for the demo host.

pub mod event_sink;
pub mod fonts;
pub mod native_surface;
pub mod storage;
pub mod ui_thread;
