use anyhow::Context;
use env_logger::Env;
use lead_enricher::{configuration::get_configuration, startup::build};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().context("Failed to read configuration.")?;
    let server = build(&configuration)?;

    server.await?;
    Ok(())
}
