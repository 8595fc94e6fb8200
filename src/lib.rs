pub mod arena;
pub mod board;
pub mod bot;
pub mod config;
pub mod piece;
pub mod search;
pub mod web;

pub use arena::*;
pub use board::*;
pub use bot::*;
pub use config::*;
pub use piece::*;
pub use search::*;
