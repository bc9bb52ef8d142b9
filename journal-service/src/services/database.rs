use crate::models::{JournalEntry, QuickDetail};
use mongodb::{
    bson::doc, options::IndexOptions, Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct JournalDb {
    client: MongoClient,
    db: Database,
}

impl JournalDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for journal-service");

        // Entries list newest-first
        let date_index = IndexModel::builder()
            .keys(doc! { "date": -1 })
            .options(IndexOptions::builder().name("date_desc".to_string()).build())
            .build();

        self.entries().create_index(date_index, None).await.map_err(|e| {
            tracing::error!("Failed to create date index on journal_entries: {}", e);
            AppError::from(e)
        })?;
        tracing::info!("Created index on journal_entries.date");

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub fn entries(&self) -> Collection<JournalEntry> {
        self.db.collection("journal_entries")
    }

    pub fn quick_details(&self) -> Collection<QuickDetail> {
        self.db.collection("quick_details")
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}
