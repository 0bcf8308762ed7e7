pub mod assets;
pub mod base;
pub mod map;
pub mod output;
pub mod resolve;
