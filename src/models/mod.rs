//! Core data models for the location map service.

pub mod location;
pub mod question;
pub mod role;

pub use location::{Coordinate, Location, RawRecord};
pub use question::{Question, QuestionDraft};
pub use role::{AccessDenied, Role};
