pub mod models;
pub mod utils;

pub use utils::brazilian_format;
