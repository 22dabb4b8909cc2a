#![deny(warnings)]
pub mod game;
pub mod model;
pub mod random;
pub mod rules;
