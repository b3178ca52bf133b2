//! Domain entities for the CardField bridge.
//!
//! Pure data and rules with no widget, thread, or file dependencies:
//!
//! - **`card`** – fields, the per-field state machine, brands, the live
//!   [`card::CardState`] reported by the widget, and the all-or-nothing
//!   [`card::CardParams`] snapshot.
//! - **`validation`** – brand classification, Luhn check, and the rules that
//!   turn raw field text into a [`card::FieldState`].
//! - **`style`** – typed placeholder and style configuration, parsed leniently
//!   from host values and resolved once into an [`style::Appearance`].
//! - **`config`** – the full set of host-settable options with their defaults.

pub mod card;
pub mod config;
pub mod style;
pub mod validation;
