//! Client-local view-mode selection.

pub mod controller;
