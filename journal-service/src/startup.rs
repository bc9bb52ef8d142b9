use crate::config::{ExtractorProvider, JournalConfig, StorageBackend};
use crate::handlers;
use crate::services::providers::mock::MockCompletionProvider;
use crate::services::providers::openrouter::{OpenRouterConfig, OpenRouterProvider};
use crate::services::providers::CompletionProvider;
use crate::services::{EntryExtractor, JournalDb, LocalStorage, S3Storage, Storage};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::middleware::from_fn;
use axum::{
    routing::{get, post, put},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::tracing::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Upload requests carry image payloads; cap them at 20MB.
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: JournalConfig,
    pub db: JournalDb,
    pub storage: Arc<dyn Storage>,
    pub extractor: Arc<EntryExtractor>,
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    pub async fn build(config: JournalConfig) -> Result<Self, AppError> {
        let db = JournalDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;
        db.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        let storage: Arc<dyn Storage> = match config.storage.backend {
            StorageBackend::Local => Arc::new(
                LocalStorage::new(&config.storage.local_path, &config.storage.public_base_url)
                    .await
                    .map_err(|e| {
                        tracing::error!(
                            "Failed to initialize local storage at {}: {}",
                            config.storage.local_path,
                            e
                        );
                        e
                    })?,
            ),
            StorageBackend::S3 => {
                let bucket = config.storage.s3_bucket.clone().ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!("S3 bucket is not configured"))
                })?;
                let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                    .region(aws_config::Region::new(config.storage.s3_region.clone()))
                    .load()
                    .await;
                let client = aws_sdk_s3::Client::new(&sdk_config);
                tracing::info!(bucket = %bucket, region = %config.storage.s3_region, "Initialized S3 storage");
                Arc::new(S3Storage::new(
                    client,
                    bucket,
                    config.storage.s3_region.clone(),
                ))
            }
        };

        let provider: Arc<dyn CompletionProvider> = match config.extractor.provider {
            ExtractorProvider::Openrouter => {
                tracing::info!(model = %config.extractor.model, "Initialized OpenRouter provider");
                Arc::new(OpenRouterProvider::new(OpenRouterConfig {
                    api_key: config.extractor.api_key.clone(),
                    model: config.extractor.model.clone(),
                    base_url: config.extractor.base_url.clone(),
                }))
            }
            ExtractorProvider::Mock => {
                tracing::info!("Initialized mock completion provider");
                Arc::new(MockCompletionProvider::new(true))
            }
        };
        let extractor = Arc::new(EntryExtractor::new(provider));

        let state = AppState {
            config: config.clone(),
            db,
            storage,
            extractor,
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn db(&self) -> &JournalDb {
        &self.state.db
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let app = build_router(self.state);
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .cors
                .allowed_origins
                .iter()
                .map(|o| {
                    o.parse::<HeaderValue>().unwrap_or_else(|e| {
                        tracing::error!("Invalid CORS origin '{}': {}. Using fallback.", o, e);
                        HeaderValue::from_static("http://localhost:3000")
                    })
                })
                .collect::<Vec<HeaderValue>>(),
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let mut router = Router::new()
        .route("/", get(handlers::welcome))
        .route("/health", get(handlers::health_check))
        .route(
            "/journal",
            post(handlers::create_entry).get(handlers::list_entries),
        )
        .route("/journal/from-text", post(handlers::create_entry_from_text))
        .route("/journal/upload", post(handlers::upload_entry))
        .route(
            "/journal/:id",
            get(handlers::get_entry).put(handlers::update_entry),
        )
        .route(
            "/quick-details",
            get(handlers::list_quick_details).post(handlers::create_quick_detail),
        )
        .route("/quick-details/batch", post(handlers::batch_quick_details))
        .route(
            "/quick-details/:id",
            put(handlers::update_quick_detail).delete(handlers::delete_quick_detail),
        );

    // Local uploads are served back by the service itself; S3 objects
    // carry their own public URLs.
    if state.config.storage.backend == StorageBackend::Local {
        router = router.nest_service(
            "/media",
            ServeDir::new(&state.config.storage.local_path),
        );
    }

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request_id_middleware))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
