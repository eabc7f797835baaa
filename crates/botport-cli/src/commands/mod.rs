pub mod batch;
pub mod check;
pub mod import;

pub use check::CheckCommand;
pub use import::ImportCommand;
