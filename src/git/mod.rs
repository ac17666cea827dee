pub mod follow;
pub mod log_parser;
pub mod renames;
