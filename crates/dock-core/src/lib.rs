// ABOUTME: Shared types and configuration for anchor-dock.
// ABOUTME: Defines geometry vocabulary, drop locations and layout config file handling.

pub mod config;
pub mod geometry;

pub use config::{ConfigError, LayoutConfig, SplitPolicy};
pub use geometry::{Location, Orientation, Rect, Side, Size};
