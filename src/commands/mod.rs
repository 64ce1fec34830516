pub mod batch;
pub mod render;
pub mod render_files;
