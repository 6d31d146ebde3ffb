use payment_svc::clients::order::HttpOrderClient;
use payment_svc::clients::workflow::HttpWorkflowClient;
use payment_svc::config::{AppConfig, LogFormat};
use payment_svc::gateways::mock::{MockGateway, ALWAYS_SUCCESS};
use payment_svc::gateways::registry::GatewayRegistry;
use payment_svc::gateways::zalopay::ZalopayGateway;
use payment_svc::gateways::GatewayType;
use payment_svc::http::router::build_router;
use payment_svc::service::payment_service::PaymentService;
use payment_svc::AppState;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env();

    match cfg.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init(),
    }

    cfg.validate()?;

    let client = reqwest::Client::new();

    let registry = GatewayRegistry::new();
    if cfg.zalopay_enabled {
        registry.register(
            GatewayType::Zalopay,
            Arc::new(ZalopayGateway::new(cfg.zalopay.clone(), client.clone())),
        )?;
    }
    if cfg.mock_gateway_enabled {
        registry.register(
            GatewayType::Mock,
            Arc::new(MockGateway::new(ALWAYS_SUCCESS, cfg.mock_gateway_secret.clone())),
        )?;
    }
    info!(gateways = ?registry.providers(), "payment gateways registered");

    let payment_service = PaymentService {
        registry: Arc::new(registry),
        orders: Arc::new(HttpOrderClient {
            base_url: cfg.order_svc_url.clone(),
            timeout_ms: cfg.outbound_timeout_ms,
            client: client.clone(),
        }),
        workflows: Arc::new(HttpWorkflowClient {
            base_url: cfg.workflow_engine_url.clone(),
            timeout_ms: cfg.outbound_timeout_ms,
            client,
        }),
        task_queue: cfg.post_payment_task_queue.clone(),
    };

    let app = build_router(AppState { payment_service });

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    info!(addr = %cfg.bind_addr, "payment service listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
