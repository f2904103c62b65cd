pub mod checker;
pub mod collector;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod signature;
pub mod store;

#[cfg(test)]
mod tests;
