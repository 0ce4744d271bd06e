pub mod border_color;
pub mod compositor;
pub mod geometry;
pub mod input_source;
pub mod metadata;
pub mod output_file;
pub mod source_image;
pub mod watermark;
