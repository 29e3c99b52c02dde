//! Core data types for the Crosslane relay

pub mod attribute;
pub mod envelope;
pub mod message;
