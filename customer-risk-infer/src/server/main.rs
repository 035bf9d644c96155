mod routes;

use customer_risk_infer::config::ServiceConfig;
use customer_risk_infer::service::PredictionService;
use customer_risk_infer::trace::LogLayer;
use dotenvy::dotenv;
use tracing::info;

use crate::routes::{build_app, State};

const APP_NAME: &str = "customer-risk-server";

#[async_std::main]
async fn main() -> anyhow::Result<()> {
    let env_file = dotenv().ok();
    let config = ServiceConfig::from_env()?;

    {
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;
        tracing_subscriber::registry()
            .with(LogLayer::new(
                APP_NAME,
                config.log_format(),
                config.log_level(),
                &config.timezone,
            ))
            .init();
    }
    match env_file {
        Some(path) => info!(path = %path.display(), "config loaded from env file"),
        None => info!("config loaded from env"),
    }
    info!(config = ?config, "starting prediction server");

    let service = PredictionService::start(config.clone())?;
    let app = build_app(State::new(service));

    let listen_addr = config.listen_addr();
    info!(addr = %listen_addr, "listening");
    app.listen(listen_addr).await?;
    Ok(())
}
