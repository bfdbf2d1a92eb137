use anyhow::Context;
use plaza::domain::config::{ClientConfig, LoggingConfig};
use plaza::kernel::LoggingRenderer;
use plaza::kernel::config::load_config;
use plaza_client::Client;
use plaza_logger::{FileOutput, Logger, parse_rotation};
use std::sync::Arc;

#[plaza_runtime::main(client)]
async fn main() -> anyhow::Result<()> {
    let cfg: ClientConfig =
        load_config(std::env::args().nth(1)).context("Critical: Configuration is malformed")?;

    let _log = init_logger(&cfg.logging)?;

    Client::builder()
        .config(cfg)
        .renderer(Arc::new(LoggingRenderer))
        .build()
        .await?
        .run()
        .await
}

fn init_logger(cfg: &LoggingConfig) -> anyhow::Result<Logger> {
    let mut builder =
        Logger::builder(env!("CARGO_PKG_NAME")).level_str(&cfg.level)?.console(cfg.console);
    if let Some(filter) = &cfg.env_filter {
        builder = builder.filter(filter);
    }
    if let Some(dir) = &cfg.path {
        let output = FileOutput::new(dir)
            .rotation(parse_rotation(&cfg.rotation)?)
            .max_files(cfg.max_files)
            .json(cfg.json);
        builder = builder.file(output);
    }
    Ok(builder.init()?)
}
