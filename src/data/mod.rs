pub mod loader;
pub mod series;
