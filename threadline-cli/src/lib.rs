//! Terminal front end for threadline discussions

pub mod app;
pub mod error;
pub mod render;
pub mod text;
pub mod theme;
pub mod util;
