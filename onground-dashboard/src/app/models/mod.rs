//! Data models for the application

mod dashboard;
mod stages;
mod view;

pub use dashboard::*;
pub use stages::*;
pub use view::*;
