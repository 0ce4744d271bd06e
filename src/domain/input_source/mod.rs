pub mod directory_path;
pub mod path_error;
pub mod path_resolver;
