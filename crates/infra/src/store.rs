use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use domain::{CatalogMetadata, PidDefinition};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::error::CatalogError;

/// `spec.md` §4.3 catalog store contract. A trait so `adapt`/`serve` can
/// depend on the operations without pulling in `sqlx` directly, and so
/// tests can swap in a fake store.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn initialize(&self, description: Option<&str>) -> Result<CatalogMetadata, CatalogError>;
    async fn metadata(&self) -> Result<CatalogMetadata, CatalogError>;
    async fn add(&self, def: &mut PidDefinition) -> Result<(), CatalogError>;
    async fn update(&self, def: &PidDefinition) -> Result<(), CatalogError>;
    async fn add_or_update(&self, def: &mut PidDefinition) -> Result<(), CatalogError>;
    async fn delete(&self, uniq: &str) -> Result<Option<PidDefinition>, CatalogError>;
    async fn get_by_uniq(&self, uniq: &str) -> Result<Option<PidDefinition>, CatalogError>;
    async fn get(
        &self,
        scheme: &str,
        prefix: Option<&str>,
        value: Option<&str>,
        resolve_synonym: bool,
    ) -> Result<Option<PidDefinition>, CatalogError>;
    async fn list_schemes(&self, valid_only: bool) -> Result<Vec<String>, CatalogError>;
    async fn list_prefixes(&self, scheme: &str) -> Result<Vec<String>, CatalogError>;
    async fn list_values(&self, scheme: &str, prefix: &str) -> Result<Vec<String>, CatalogError>;
    async fn list_uniqs(&self) -> Result<Vec<String>, CatalogError>;
    async fn refresh_metadata(&self) -> Result<(), CatalogError>;
}

/// `sqlx::SqlitePool`-backed `CatalogStore`. `max_value_length` is cached
/// in-process after first read (`spec.md` §5 "Shared state") and
/// invalidated by `refresh_metadata`.
pub struct SqliteCatalogStore {
    pool: SqlitePool,
    cached_max_value_length: RwLock<Option<i64>>,
}

/// Maximum number of distinct `uniq` entries a synonym chain may traverse
/// before it's treated as unresolvable — `spec.md` §4.4 "Synonym chain",
/// §9 "Cyclic data".
const MAX_SYNONYM_DEPTH: usize = 8;

impl SqliteCatalogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            cached_max_value_length: RwLock::new(None),
        }
    }

    pub async fn connect(database_url: &str) -> Result<Self, CatalogError> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), CatalogError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn max_value_length(&self) -> Result<i64, CatalogError> {
        if let Some(cached) = *self.cached_max_value_length.read().unwrap() {
            return Ok(cached);
        }
        let row = sqlx::query("SELECT max_value_length FROM piddef_meta WHERE key = 0")
            .fetch_optional(&self.pool)
            .await?;
        let len = row.map(|r| r.get::<i64, _>("max_value_length")).unwrap_or(0);
        *self.cached_max_value_length.write().unwrap() = Some(len);
        Ok(len)
    }

    /// The three-tier exact match described in `spec.md` §4.4: longest
    /// value-prefix, then prefix-exact-empty-value, then
    /// scheme-exact-empty-prefix-and-value. Implemented as three discrete
    /// queries in sequence, per the original `piddefine.py:_get`, rather
    /// than one combined query.
    async fn get_exact(
        &self,
        scheme: &str,
        prefix: Option<&str>,
        value: Option<&str>,
    ) -> Result<Option<PidDefinition>, CatalogError> {
        let value = value.filter(|v| !v.is_empty());
        let prefix = prefix.filter(|p| !p.is_empty());

        if value.is_none() && prefix.is_none() {
            let row = sqlx::query(
                "SELECT * FROM piddef WHERE scheme = ?1 AND prefix = '' AND value = ''",
            )
            .bind(scheme)
            .fetch_optional(&self.pool)
            .await?;
            return row.map(row_to_definition).transpose();
        }

        if value.is_none() {
            let row = sqlx::query(
                "SELECT * FROM piddef WHERE scheme = ?1 AND prefix = ?2 AND value = ''",
            )
            .bind(scheme)
            .bind(prefix.unwrap())
            .fetch_optional(&self.pool)
            .await?;
            return row.map(row_to_definition).transpose();
        }

        let value = value.unwrap();
        let prefix = prefix.unwrap_or("");
        let max_len = self.max_value_length().await?;
        let upper = value.chars().count().min(max_len.max(0) as usize);
        if upper < 2 {
            return Ok(None);
        }
        let candidates: Vec<String> = (2..=upper)
            .rev()
            .map(|len| value.chars().take(len).collect())
            .collect();
        if candidates.is_empty() {
            return Ok(None);
        }

        let placeholders: Vec<String> = (0..candidates.len())
            .map(|i| format!("?{}", i + 3))
            .collect();
        let sql = format!(
            "SELECT * FROM piddef WHERE scheme = ?1 AND prefix = ?2 AND value IN ({}) \
             ORDER BY length(value) DESC LIMIT 1",
            placeholders.join(", ")
        );
        let mut query = sqlx::query(&sql).bind(scheme).bind(prefix);
        for candidate in &candidates {
            query = query.bind(candidate);
        }
        let row = query.fetch_optional(&self.pool).await?;
        row.map(row_to_definition).transpose()
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn initialize(&self, description: Option<&str>) -> Result<CatalogMetadata, CatalogError> {
        let now = Utc::now();
        sqlx::query(
            "INSERT OR IGNORE INTO piddef_meta (key, created, updated, description, max_value_length) \
             VALUES (0, ?1, ?1, ?2, 0)",
        )
        .bind(now.to_rfc3339())
        .bind(description)
        .execute(&self.pool)
        .await?;
        self.metadata().await
    }

    async fn metadata(&self) -> Result<CatalogMetadata, CatalogError> {
        let row = sqlx::query("SELECT created, updated, description, max_value_length FROM piddef_meta WHERE key = 0")
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CatalogError::NotFound("catalog metadata not initialized".into()))?;
        Ok(CatalogMetadata {
            created: parse_timestamp(row.get::<String, _>("created"))?,
            updated: parse_timestamp(row.get::<String, _>("updated"))?,
            description: row.get("description"),
            max_value_length: row.get("max_value_length"),
        })
    }

    async fn add(&self, def: &mut PidDefinition) -> Result<(), CatalogError> {
        def.validate_and_normalize()?;
        let properties = def.properties.as_ref().map(|p| p.to_string());
        let result = sqlx::query(
            "INSERT INTO piddef (scheme, prefix, value, uniq, target, canonical, http_code, synonym_for, properties, splitter) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&def.scheme)
        .bind(&def.prefix)
        .bind(&def.value)
        .bind(&def.uniq)
        .bind(&def.target)
        .bind(&def.canonical)
        .bind(def.http_code as i64)
        .bind(&def.synonym_for)
        .bind(&properties)
        .bind(&def.splitter)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(CatalogError::Duplicate {
                    scheme: def.scheme.clone(),
                    prefix: def.prefix.clone(),
                    value: def.value.clone(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, def: &PidDefinition) -> Result<(), CatalogError> {
        let existing = self
            .get_by_uniq(&def.uniq)
            .await?
            .ok_or_else(|| CatalogError::NotFound(def.uniq.clone()))?;

        if let (Some(incoming), Some(stored)) = (revision_of(def), revision_of(&existing)) {
            if incoming < stored {
                return Err(CatalogError::Stale {
                    incoming,
                    stored,
                });
            }
        }

        let properties = def.properties.as_ref().map(|p| p.to_string());
        sqlx::query(
            "UPDATE piddef SET target = ?1, canonical = ?2, http_code = ?3, synonym_for = ?4, \
             properties = ?5, splitter = ?6 WHERE uniq = ?7",
        )
        .bind(&def.target)
        .bind(&def.canonical)
        .bind(def.http_code as i64)
        .bind(&def.synonym_for)
        .bind(&properties)
        .bind(&def.splitter)
        .bind(&def.uniq)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn add_or_update(&self, def: &mut PidDefinition) -> Result<(), CatalogError> {
        match self.add(def).await {
            Ok(()) => Ok(()),
            Err(CatalogError::Duplicate { .. }) => self.update(def).await,
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, uniq: &str) -> Result<Option<PidDefinition>, CatalogError> {
        let existing = self.get_by_uniq(uniq).await?;
        if existing.is_some() {
            sqlx::query("DELETE FROM piddef WHERE uniq = ?1")
                .bind(uniq)
                .execute(&self.pool)
                .await?;
        }
        Ok(existing)
    }

    async fn get_by_uniq(&self, uniq: &str) -> Result<Option<PidDefinition>, CatalogError> {
        let row = sqlx::query("SELECT * FROM piddef WHERE uniq = ?1")
            .bind(uniq)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_definition).transpose()
    }

    async fn get(
        &self,
        scheme: &str,
        prefix: Option<&str>,
        value: Option<&str>,
        resolve_synonym: bool,
    ) -> Result<Option<PidDefinition>, CatalogError> {
        let mut visited = std::collections::HashSet::new();
        self.get_inner(scheme, prefix, value, resolve_synonym, &mut visited)
            .await
    }

    async fn list_schemes(&self, valid_only: bool) -> Result<Vec<String>, CatalogError> {
        let sql = if valid_only {
            "SELECT DISTINCT scheme FROM piddef WHERE target IS NOT NULL OR synonym_for IS NOT NULL ORDER BY scheme"
        } else {
            "SELECT DISTINCT scheme FROM piddef ORDER BY scheme"
        };
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(|r| r.get::<String, _>("scheme")).collect())
    }

    async fn list_prefixes(&self, scheme: &str) -> Result<Vec<String>, CatalogError> {
        let rows = sqlx::query(
            "SELECT DISTINCT prefix FROM piddef WHERE scheme = ?1 AND prefix != '' ORDER BY prefix",
        )
        .bind(scheme)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(|r| r.get::<String, _>("prefix")).collect())
    }

    async fn list_values(&self, scheme: &str, prefix: &str) -> Result<Vec<String>, CatalogError> {
        let rows = sqlx::query(
            "SELECT DISTINCT value FROM piddef WHERE scheme = ?1 AND prefix = ?2 AND value != '' ORDER BY value",
        )
        .bind(scheme)
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(|r| r.get::<String, _>("value")).collect())
    }

    async fn list_uniqs(&self) -> Result<Vec<String>, CatalogError> {
        let rows = sqlx::query("SELECT uniq FROM piddef ORDER BY uniq")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(|r| r.get::<String, _>("uniq")).collect())
    }

    async fn refresh_metadata(&self) -> Result<(), CatalogError> {
        let row = sqlx::query("SELECT MAX(length(value)) AS max_len FROM piddef")
            .fetch_one(&self.pool)
            .await?;
        let max_len: Option<i64> = row.get("max_len");
        let max_len = max_len.unwrap_or(0);
        sqlx::query("UPDATE piddef_meta SET max_value_length = ?1, updated = ?2 WHERE key = 0")
            .bind(max_len)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        *self.cached_max_value_length.write().unwrap() = Some(max_len);
        Ok(())
    }
}

impl SqliteCatalogStore {
    /// `resolve_synonym` recursion with a depth bound and a cycle-safe
    /// visited set keyed on `uniq` — `spec.md` §9 "Cyclic data".
    #[allow(clippy::only_used_in_recursion)]
    fn get_inner<'a>(
        &'a self,
        scheme: &'a str,
        prefix: Option<&'a str>,
        value: Option<&'a str>,
        resolve_synonym: bool,
        visited: &'a mut std::collections::HashSet<String>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Option<PidDefinition>, CatalogError>> + Send + 'a>>
    {
        Box::pin(async move {
            let entry = match self.get_exact(scheme, prefix, value).await? {
                Some(e) => e,
                None => match self.get_exact(scheme, prefix, None).await? {
                    Some(e) => e,
                    None => match self.get_exact(scheme, None, None).await? {
                        Some(e) => e,
                        None => return Ok(None),
                    },
                },
            };

            let Some(synonym_for) = entry.synonym_for.clone() else {
                return Ok(Some(entry));
            };
            if !resolve_synonym {
                return Ok(Some(entry));
            }
            if visited.len() >= MAX_SYNONYM_DEPTH || !visited.insert(entry.uniq.clone()) {
                return Ok(None);
            }

            let synonym_parts = rslv_core::split(&synonym_for);
            let next_scheme = if synonym_parts.scheme.is_empty() {
                scheme
            } else {
                synonym_parts.scheme.as_str()
            };
            let next_prefix = match synonym_parts.prefix.as_deref() {
                Some(p) if !p.is_empty() => Some(p),
                _ => prefix,
            };
            let next_value = match &synonym_parts.value {
                Some(v) => Some(v.as_str()),
                None => value,
            };

            self.get_inner(next_scheme, next_prefix, next_value, resolve_synonym, visited)
                .await
        })
    }
}

fn revision_of(def: &PidDefinition) -> Option<i64> {
    def.properties
        .as_ref()
        .and_then(|p| p.get("revision"))
        .and_then(|v| v.as_i64())
}

fn parse_timestamp(raw: String) -> Result<chrono::DateTime<Utc>, CatalogError> {
    chrono::DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CatalogError::Validation(format!("bad timestamp {raw:?}: {e}")))
}

fn row_to_definition(row: SqliteRow) -> Result<PidDefinition, CatalogError> {
    let properties: Option<String> = row.get("properties");
    let properties = properties
        .map(|p| serde_json::from_str(&p))
        .transpose()?;
    Ok(PidDefinition {
        scheme: row.get("scheme"),
        prefix: row.get("prefix"),
        value: row.get("value"),
        uniq: row.get("uniq"),
        target: row.get("target"),
        canonical: row.get("canonical"),
        http_code: row.get::<i64, _>("http_code") as u16,
        synonym_for: row.get("synonym_for"),
        properties,
        splitter: row.get("splitter"),
    })
}
