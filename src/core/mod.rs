pub mod base;
pub mod bundle;
pub mod console;
pub mod error;
pub mod fetch;
pub mod naming;
pub mod resolve;
pub mod setmap;
pub mod store;
pub mod table;
pub mod unicode;
