//! Card widget implementations.
//!
//! Platform SDK widgets are linked by the embedding application.  The
//! headless [`simulated::SimulatedCardWidget`] applies the same field rules
//! and is used by the demo binary and the tests.

pub mod simulated;

pub use simulated::SimulatedCardWidget;
