pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod controller;
pub mod model;
pub mod output;
pub mod pagination;
pub mod utils;
pub mod view;

#[cfg(test)]
mod tests;
