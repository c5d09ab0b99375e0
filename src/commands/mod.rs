pub mod add;
pub mod config;
pub mod events;
