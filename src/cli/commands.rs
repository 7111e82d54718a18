//! CLI command implementations

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::auth::crypto::hash_password;
use crate::auth::{create_email_sender, USERS};
use crate::contacts::{ContactInput, CONTACTS};
use crate::http_server::{AppState, HttpServer};
use crate::observability::init_tracing;
use crate::query::Filter;
use crate::store::{Collection, DocumentStore};

use super::args::{Command, SeedCollection};
use super::config::Config;
use super::errors::{CliError, CliResult};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    dotenv::dotenv().ok();
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(config.as_deref(), port),
        Command::Seed {
            config,
            collection,
            file,
            delete,
        } => {
            let config = Config::resolve(config.as_deref())?;
            init_tracing(&config.logging)?;
            let store = open_persistent(&config)?;

            if delete {
                let removed = clear(&store, collection)?;
                info!(?collection, removed, "Data successfully deleted");
                return Ok(());
            }

            let file = file.ok_or_else(|| CliError::Seed("--file is required".to_string()))?;
            let inserted = import(&store, collection, &file)?;
            info!(?collection, inserted, "Data successfully loaded");
            Ok(())
        }
    }
}

/// Start the HTTP server
pub fn serve(config_path: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    let mut config = Config::resolve(config_path)?;
    if let Some(port) = port {
        config.server.port = port;
    }
    init_tracing(&config.logging)?;

    let store = match &config.storage.data_dir {
        Some(dir) => DocumentStore::open(dir)?,
        None => {
            warn!("No data directory configured; data will not survive a restart");
            DocumentStore::in_memory()
        }
    };
    if config.email.is_none() {
        warn!("No SMTP server configured; reset emails are not delivered");
    }

    info!(environment = ?config.environment, "Starting recordkeep");

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        let mailer = create_email_sender(config.email.clone());
        let state = AppState::new(store, config.auth.clone(), mailer);
        HttpServer::new(config.server.clone(), state)
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

fn open_persistent(config: &Config) -> CliResult<DocumentStore> {
    let dir = config.storage.data_dir.as_ref().ok_or_else(|| {
        CliError::config_error("Seeding needs a data directory (storage.data_dir or DATA_DIR)")
    })?;
    Ok(DocumentStore::open(dir)?)
}

fn target(store: &DocumentStore, collection: SeedCollection) -> Collection {
    match collection {
        SeedCollection::Users => store.collection(USERS),
        SeedCollection::Contacts => store.collection(CONTACTS),
    }
}

/// Remove every document of a collection
pub fn clear(store: &DocumentStore, collection: SeedCollection) -> CliResult<usize> {
    Ok(target(store, collection).delete_many(&Filter::new())?)
}

/// Import a JSON array of documents; nothing is stored if any is rejected
pub fn import(store: &DocumentStore, collection: SeedCollection, file: &Path) -> CliResult<usize> {
    let content = fs::read_to_string(file)?;
    let docs: Vec<Value> = serde_json::from_str(&content)?;

    let prepared = docs
        .into_iter()
        .enumerate()
        .map(|(index, doc)| {
            let prepared = match collection {
                SeedCollection::Users => prepare_user(doc),
                SeedCollection::Contacts => prepare_contact(doc),
            };
            prepared.map_err(|reason| CliError::Seed(format!("Document {}: {}", index, reason)))
        })
        .collect::<CliResult<Vec<_>>>()?;

    Ok(target(store, collection).insert_many(prepared)?)
}

/// Hash a plaintext password; already hashed values pass through
fn prepare_user(doc: Value) -> Result<Value, String> {
    let Value::Object(mut doc) = doc else {
        return Err("not a JSON object".to_string());
    };

    doc.remove("passwordConfirm");
    match doc.get("email").and_then(Value::as_str) {
        Some(email) => {
            let email = email.trim().to_lowercase();
            doc.insert("email".to_string(), Value::String(email));
        }
        None => return Err("missing email".to_string()),
    }

    let password = doc
        .get("password")
        .and_then(Value::as_str)
        .ok_or_else(|| "missing password".to_string())?;
    if !password.starts_with("$argon2") {
        let hash = hash_password(password).map_err(|e| e.to_string())?;
        doc.insert("password".to_string(), Value::String(hash));
    }

    Ok(Value::Object(doc))
}

/// Run a contact through the same checks as the API; a given `_id` is kept
fn prepare_contact(doc: Value) -> Result<Value, String> {
    let id = doc.get("_id").cloned();
    let input: ContactInput = serde_json::from_value(doc).map_err(|e| e.to_string())?;
    let mut prepared = input.into_document(true).map_err(|e| e.to_string())?;

    if let Some(id) = id {
        prepared.insert("_id".to_string(), id);
    }
    Ok(Value::Object(prepared))
}
