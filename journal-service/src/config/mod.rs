use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct JournalConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub storage: StorageConfig,
    pub extractor: ExtractorConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub local_path: String,
    pub public_base_url: String,
    pub s3_bucket: Option<String>,
    pub s3_region: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    S3,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorConfig {
    pub provider: ExtractorProvider,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorProvider {
    Openrouter,
    Mock,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl JournalConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and the APP__ prefix)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let storage = StorageConfig {
            backend: get_env("STORAGE_BACKEND", Some("local"), is_prod)?
                .parse()
                .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
            local_path: get_env("STORAGE_LOCAL_PATH", Some("storage"), is_prod)?,
            public_base_url: get_env(
                "STORAGE_PUBLIC_BASE_URL",
                Some("http://localhost:8080/media"),
                is_prod,
            )?,
            s3_bucket: env::var("STORAGE_S3_BUCKET").ok(),
            s3_region: get_env("STORAGE_S3_REGION", Some("us-east-1"), is_prod)?,
        };

        // The bucket name has no sensible default; refuse to start without it.
        if storage.backend == StorageBackend::S3 && storage.s3_bucket.is_none() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "STORAGE_S3_BUCKET is required when STORAGE_BACKEND is s3"
            )));
        }

        Ok(JournalConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", None, is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("journal_db"), is_prod)?,
            },
            storage,
            extractor: ExtractorConfig {
                provider: get_env("EXTRACTOR_PROVIDER", Some("openrouter"), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
                api_key: get_env("OPENROUTER_API_KEY", None, is_prod)?,
                model: get_env("EXTRACTOR_MODEL", Some("openai/gpt-5-nano"), is_prod)?,
                base_url: get_env(
                    "EXTRACTOR_BASE_URL",
                    Some("https://openrouter.ai/api/v1"),
                    is_prod,
                )?,
            },
            cors: CorsConfig {
                allowed_origins: get_env(
                    "CORS_ALLOWED_ORIGINS",
                    Some("http://localhost:3000"),
                    is_prod,
                )?
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            },
        })
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "s3" => Ok(StorageBackend::S3),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

impl std::str::FromStr for ExtractorProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openrouter" => Ok(ExtractorProvider::Openrouter),
            "mock" => Ok(ExtractorProvider::Mock),
            _ => Err(format!("Invalid extractor provider: {}", s)),
        }
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
