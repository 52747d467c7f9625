use memeforge_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (_state, router) = memeforge_api::initialize_app(config.clone()).await?;

    memeforge_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
