//! # cardfield-core
//!
//! Shared library for the CardField bridge containing the card data model,
//! field validation rules, style configuration, and the host-facing event and
//! command protocol.
//!
//! This crate has zero dependencies on UI toolkits, widget SDKs, threads, or
//! files.  Everything here can be compiled and tested on any platform.
//!
//! # Architecture overview
//!
//! The CardField bridge sits between a host application and a trusted native
//! card-entry widget.  It keeps three representations of the same card in
//! sync: the widget's keystroke-level field state, a validated [`CardParams`]
//! snapshot, and the stream of events delivered to the host.
//!
//! - **`domain`** – The card data model: fields and their state machine,
//!   card brands, the validated snapshot, validation rules, and typed
//!   style/placeholder configuration with lenient parsing.
//!
//! - **`protocol`** – What crosses the host boundary: the `onCardChange` and
//!   `onFocusChange` payloads, the direct-event declarations, and the string
//!   command identifiers (`focus`, `blur`, `clear`).

pub mod domain;
pub mod protocol;

pub use domain::card::{
    CardBrand, CardDetails, CardField, CardParams, CardState, FieldState, FieldStates,
    ValidatedCard,
};
pub use domain::config::CardFieldConfig;
pub use domain::style::{Appearance, CardStyle, Color, FontResolver, Placeholders};
pub use domain::validation::YearMonth;
pub use protocol::commands::CardFieldCommand;
pub use protocol::events::{CardChangeEvent, FocusEvent, HostEvent};
