pub mod json;
pub mod toml;
pub mod yaml;
