pub mod fs_utils;
pub mod metadata;

pub use metadata::ScriptMetadata;
