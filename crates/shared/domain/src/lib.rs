//! # Domain Models
//!
//! Pure scene host types with minimal dependencies (`serde`, `bitflags`).
//! Keep it lean: no I/O, async, or orchestration, just data and simple helpers.

pub mod config;
pub mod constants;
pub mod features;
pub mod profile;
pub mod renderer;
pub mod scene;
