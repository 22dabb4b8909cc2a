#![deny(warnings)]
pub mod audit;
pub mod config;
pub mod logging;
pub mod plot;
pub mod runner;
