pub mod alpha_bleed;
pub mod cli;
pub mod codec;
pub mod commands;
pub mod config;
pub mod diff;
pub mod error;
pub mod icon;
pub mod lockfile;
