use journal_service::config::JournalConfig;
use journal_service::services::JournalDb;
use journal_service::startup::Application;
use mongodb::bson::doc;
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: JournalDb,
    pub db_name: String,
    pub storage_path: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        if std::env::var("MONGODB_URI").is_err() {
            std::env::set_var("MONGODB_URI", "mongodb://localhost:27017");
        }
        // The mock provider keeps extraction deterministic and offline.
        std::env::set_var("EXTRACTOR_PROVIDER", "mock");
        std::env::set_var("OPENROUTER_API_KEY", "test-api-key");

        let db_name = format!("journal_test_{}", Uuid::new_v4());
        let storage_path = format!("target/test-storage-{}", Uuid::new_v4());

        let mut config = JournalConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing
        config.mongodb.database = db_name.clone();
        config.storage.local_path = storage_path.clone();

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let db = app.db().clone();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            db_name,
            storage_path,
        }
    }

    /// MongoDB transactions need a replica set; standalone servers reject
    /// them, so transactional tests check before asserting.
    pub async fn supports_transactions(&self) -> bool {
        match self
            .db
            .client()
            .database("admin")
            .run_command(doc! { "hello": 1 }, None)
            .await
        {
            Ok(reply) => reply.get("setName").is_some(),
            Err(_) => false,
        }
    }

    /// Cleanup test resources (database and storage).
    pub async fn cleanup(&self) {
        let _ = self.db.client().database(&self.db_name).drop(None).await;
        let _ = tokio::fs::remove_dir_all(&self.storage_path).await;
    }
}

pub fn skip_mongo_tests() -> bool {
    if std::env::var("SKIP_MONGO_TESTS").is_ok() {
        eprintln!("Skipping test: SKIP_MONGO_TESTS is set");
        return true;
    }
    false
}
