//! Interactive terminal frontend.

mod app;
mod render;

pub use app::App;
pub use render::{RowTooWide, draw_app, fit_row, format_row};
