pub mod config;
pub mod config_data;
pub mod logger;
pub mod server;
mod backend_client;
mod error;
mod feed;
mod metrics;
mod post;
mod query_string;
mod text_utils;
mod view;
