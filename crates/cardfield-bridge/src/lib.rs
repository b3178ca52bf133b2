//! cardfield-bridge library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the bridge do?
//!
//! A host application (typically a cross-platform UI runtime) wants to
//! collect payment card details without ever rendering the card number
//! itself.  The bridge embeds a trusted native card widget and:
//!
//! 1. Applies host configuration (postal code toggle, autofocus,
//!    placeholders, style) to the widget.
//! 2. Executes the host's imperative `focus` / `blur` / `clear` commands.
//! 3. Translates every widget change into an `onCardChange` event and every
//!    focus move into an `onFocusChange` event.
//! 4. Keeps the last fully validated card for payment APIs to read.
//!
//! Card numbers and CVCs leave the bridge only when the host explicitly
//! opts in with `dangerouslyGetFullCardDetails`.

/// Application layer: surface adapter, bridge component, and registry.
pub mod application;

/// Infrastructure layer: widgets, event sinks, UI thread, and config storage.
pub mod infrastructure;
