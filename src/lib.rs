//! Library side of `blog-reader`: everything except terminal setup and the
//! event loop, which live in `main.rs`.

pub mod app;
pub mod cli;
pub mod config;
pub mod feed;
pub mod fetch;
pub mod input;
pub mod routes;
pub mod scroll;
pub mod ui;
