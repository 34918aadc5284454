//! `rslvctl`: admin CLI over `infra::CatalogStore`, `spec.md` §6 "Admin CLI".
//!
//! Every subcommand prints its result as JSON to stdout and exits non-zero
//! on error (`spec.md` §7 "Admin CLI errors are printed and returned
//! non-zero").

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use domain::PidDefinition;
use infra::{CatalogStore, SqliteCatalogStore};
use serde_json::json;

#[derive(Parser)]
#[command(name = "rslvctl", version, about = "RSLV catalog admin CLI")]
struct Cli {
    /// sqlx connection string for the catalog database.
    #[arg(long, env = "RSLV_DB_CONNECTION_STRING", default_value = "sqlite://data/pid_config.sqlite")]
    db: String,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Create the catalog schema and singleton metadata row.
    Initialize {
        #[arg(long)]
        description: Option<String>,
    },
    /// Add a definition from individual fields.
    Add {
        scheme: String,
        #[arg(default_value = "")]
        prefix: String,
        #[arg(default_value = "")]
        value: String,
        #[arg(long)]
        target: Option<String>,
        #[arg(long)]
        synonym_for: Option<String>,
        #[arg(long, default_value_t = 302)]
        http_code: u16,
    },
    /// Add (or update) a definition from a JSON document on stdin.
    AddJson,
    /// Resolve scheme/prefix/value to a definition, optionally following synonyms.
    Get {
        scheme: String,
        prefix: Option<String>,
        value: Option<String>,
        #[arg(long, default_value_t = true)]
        resolve_synonym: bool,
    },
    /// Delete a definition by its `uniq` key.
    Delete { uniq: String },
    /// List distinct schemes.
    Schemes {
        #[arg(long, default_value_t = true)]
        valid: bool,
    },
    /// List distinct prefixes for a scheme.
    Prefixes { scheme: String },
    /// List distinct values for a scheme/prefix.
    Values { scheme: String, prefix: String },
    /// List every `uniq` in the catalog.
    Uniqs,
    /// Run the catalog lookup for a raw identifier string and print the match.
    Match {
        identifier: String,
        #[arg(long, default_value_t = true)]
        resolve_synonym: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value).unwrap());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<serde_json::Value> {
    let store = SqliteCatalogStore::connect(&cli.db).await?;
    store.migrate().await?;

    match cli.cmd {
        Cmd::Initialize { description } => {
            let meta = store.initialize(description.as_deref()).await?;
            Ok(serde_json::to_value(meta)?)
        }
        Cmd::Add {
            scheme,
            prefix,
            value,
            target,
            synonym_for,
            http_code,
        } => {
            let mut def = PidDefinition::new(scheme, prefix, value);
            def.target = target;
            def.synonym_for = synonym_for;
            def.http_code = http_code;
            store.add(&mut def).await?;
            store.refresh_metadata().await?;
            Ok(serde_json::to_value(def)?)
        }
        Cmd::AddJson => {
            let mut def: PidDefinition = serde_json::from_reader(std::io::stdin())?;
            def.validate_and_normalize()?;
            store.add_or_update(&mut def).await?;
            store.refresh_metadata().await?;
            Ok(serde_json::to_value(def)?)
        }
        Cmd::Get {
            scheme,
            prefix,
            value,
            resolve_synonym,
        } => {
            let found = store
                .get(&scheme, prefix.as_deref(), value.as_deref(), resolve_synonym)
                .await?;
            Ok(match found {
                Some(def) => serde_json::to_value(def)?,
                None => json!(null),
            })
        }
        Cmd::Delete { uniq } => {
            let deleted = store.delete(&uniq).await?;
            store.refresh_metadata().await?;
            Ok(match deleted {
                Some(def) => serde_json::to_value(def)?,
                None => json!(null),
            })
        }
        Cmd::Schemes { valid } => Ok(json!(store.list_schemes(valid).await?)),
        Cmd::Prefixes { scheme } => Ok(json!(store.list_prefixes(&scheme).await?)),
        Cmd::Values { scheme, prefix } => Ok(json!(store.list_values(&scheme, &prefix).await?)),
        Cmd::Uniqs => Ok(json!(store.list_uniqs().await?)),
        Cmd::Match {
            identifier,
            resolve_synonym,
        } => {
            let parts = rslv_core::split(&identifier);
            let found = store
                .get(&parts.scheme, parts.prefix.as_deref(), parts.value.as_deref(), resolve_synonym)
                .await?;
            Ok(match found {
                Some(def) => serde_json::to_value(def)?,
                None => json!(null),
            })
        }
    }
}
