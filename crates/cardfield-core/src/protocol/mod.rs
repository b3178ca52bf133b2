//! The host-facing contract of the CardField component.
//!
//! - **`events`** – payloads of `onCardChange` / `onFocusChange` and the
//!   direct-event declarations the host runtime must wire up.
//! - **`commands`** – string-identified imperative commands.

pub mod commands;
pub mod events;

/// Name under which the component is registered with the host runtime.
pub const VIEW_NAME: &str = "CardField";
