//! Core building blocks: the model/scale catalog, the user's selection, the
//! sequential batch runner with its subprocess boundary, progress reporting,
//! and the session that connects a background batch to its owner.
pub mod catalog;
pub mod params;
pub mod progress;
pub mod runner;
pub mod selection;
pub mod session;
