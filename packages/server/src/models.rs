pub mod assignment;
pub mod config;
pub mod game;
pub mod player;
pub mod resolution;
pub mod role;
pub mod vote;
