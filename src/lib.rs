//! Terminal directory browser that sizes subdirectories in the background.
//!
//! The [`navigator::Navigator`] holds the listing of one directory, the
//! selection and the visible window; [`scanner::Aggregator`] computes
//! recursive subdirectory sizes on the rayon pool and reports them back as
//! [`model::SizeResult`]s.

pub mod args;
pub mod fs;
pub mod input;
pub mod logging;
pub mod model;
pub mod modes;
pub mod navigator;
pub mod report;
pub mod scanner;
pub mod settings;
pub mod tui;
pub mod util;
pub mod viewport;
