use std::{net::SocketAddr, sync::Arc};
use tiny_agent::internal::{
    api::{create_router, AppState},
    registry::select_tools,
};
use tiny_agent::{load_config, Agent, EventLog};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config();

    // Initialize tracing
    let default_filter = if config.verbose {
        "tiny_agent=debug,tower_http=debug"
    } else {
        "tiny_agent=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let events = EventLog::new();
    let agent = Agent::new(config.name.clone()).with_sink(Arc::new(events.clone()));
    for tool in select_tools(config.tools.as_deref(), &config)? {
        agent.register_tool(tool).await?;
    }

    let app = create_router(AppState::new(Arc::new(agent), events));

    let addr: SocketAddr = config.api_addr.parse()?;
    tracing::info!("Agent API server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
