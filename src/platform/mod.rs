//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Keyboard input mapping
//! - Frame timestamps to simulation steps
//! - The wasm-bindgen surface a JS page drives

pub mod input;
pub mod timing;

#[cfg(target_arch = "wasm32")]
pub mod web;
