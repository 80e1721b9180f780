//! Utility functions for timestamps and text handling.

mod text;
pub mod timestamps;

pub use text::{installation_section, preview, snake_name};
pub use timestamps::{date_stamp, display_timestamp, iso_timestamp, project_id_at};
