use lingolink::api;
use lingolink::logger::*;
use lingolink::server::*;
use lingolink::settings::*;
use std::sync::Arc;
use tokio::signal;
use warp::Filter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let address: std::net::SocketAddr = project_settings.http.address.parse()?;

    let server = Arc::new(Server::try_new(&project_settings).await?);

    let api = warp::path("api")
        .and(api::v1::routes(server.clone()))
        .recover(api::v1::recover_error);

    info!("listening on {address}");
    let (_, serving) = warp::serve(api).bind_with_graceful_shutdown(address, async {
        signal::ctrl_c().await.expect("Could not register SIGINT");
    });
    serving.await;

    info!("server shutdown");
    Ok(())
}
