pub mod codec;
pub mod file;

pub use file::Store;
