//! PyO3 bindings
//!
//! Lets a Python front end act as the presentation layer: it drives the
//! engine with `pump()` from its own event loop and reads state back.

pub mod engine;
