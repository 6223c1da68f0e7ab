mod app;
mod commands;
mod config;
mod render;
mod terminal;

use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(config::CONFIG_FILENAME));
    app::run(&config_path).await
}
