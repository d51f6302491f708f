#[macro_use]
extern crate rocket;

pub mod api;
pub mod cache;
pub mod config;
pub mod fetcher;
pub mod floof;
pub mod images;
pub mod models;
