//! Mold growth risk models.

pub mod vtt;

pub use vtt::{MaterialClass, RiskLevel, RoomModelState};
