//! Application layer of the CardField bridge.
//!
//! # What lives here?
//!
//! - **`surface`** – The [`surface::CardWidget`] trait that the trusted
//!   card widget is reached through, and the [`surface::NativeCardSurface`]
//!   adapter that turns widget notifications into observer callbacks.
//!
//! - **`card_field`** – The bridge component.  Applies configuration, runs
//!   `focus` / `blur` / `clear`, emits `onCardChange` / `onFocusChange`, and
//!   keeps the validated card snapshot.
//!
//! - **`registry`** – [`registry::CardFieldManager`]: creates and destroys
//!   components per mount point and routes host calls to them by id.
//!
//! - **`props`** – Decoding of untyped host prop updates.
//!
//! - **`host`** – Component identifiers and the [`host::HostEventSink`]
//!   trait events leave through.
//!
//! Widgets, sinks, and font lookup are injected; concrete implementations
//! live in `infrastructure`.

pub mod card_field;
pub mod host;
pub mod props;
pub mod registry;
pub mod surface;
