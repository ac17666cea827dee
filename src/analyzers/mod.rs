pub mod complexity;
pub mod effort;
pub mod enclosure;
pub mod lines;
pub mod revisions;
pub mod summary;
