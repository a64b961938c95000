pub mod result_loader;

pub use result_loader::{load_all_result_files, load_result_file, parse_result_document, LoadedFile};
