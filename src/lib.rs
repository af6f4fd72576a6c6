// lib.rs
// Library modules for the tombola winner announcer

pub mod defs;
pub mod prize;
pub mod announcement;
pub mod snapshot;
pub mod booking;
pub mod diff;
pub mod dispatcher;
pub mod player;
pub mod speech;
pub mod queue;
pub mod celebration;
pub mod announcer;
pub mod config;
pub mod logging;
pub mod feed;
pub mod terminal;
