pub mod encoder;
pub mod output_path;
pub mod writer;
