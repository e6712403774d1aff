mod temp;

pub use temp::{allowed_template, sanitize_filename, TempFile, TempWorkspace};
