//! Bank list cache and account registration.
//!
//! The bank list comes from an external API and is cached as a flat JSON file
//! on disk. The cache is refreshed on startup and then once a day by a
//! background task; a failed refresh keeps whatever the previous cache held.
//! Reading a missing or corrupt cache yields an empty list rather than an
//! error, since the list is reference data, not state we own.

use crate::{
    config::AppConfig,
    core::ids,
    entities::bank_account,
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

/// One bank from the external list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BankInfo {
    /// Full bank name
    pub name: String,
    /// Short display name
    #[serde(rename = "shortName", default)]
    pub short_name: String,
    /// Bank code
    #[serde(default)]
    pub code: String,
    /// Bank identification number
    #[serde(default)]
    pub bin: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: String,
    #[serde(default)]
    desc: String,
    #[serde(default)]
    data: Vec<BankInfo>,
}

/// Parses the bank-list API response body; the API signals success with
/// code `"00"`.
///
/// # Errors
/// Returns [`Error::Json`] for malformed JSON or [`Error::Config`] for an
/// unsuccessful API code.
pub fn parse_api_response(body: &str) -> Result<Vec<BankInfo>> {
    let response: ApiResponse = serde_json::from_str(body)?;
    if response.code != "00" {
        return Err(Error::Config {
            message: format!("bank API refused the request: {}", response.desc),
        });
    }
    Ok(response.data)
}

/// Writes the bank list cache, creating the data directory as needed.
///
/// # Errors
/// Returns an error if the directory or file cannot be written.
pub async fn write_cache(path: &Path, banks: &[BankInfo]) -> Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    let json = serde_json::to_string_pretty(banks)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Reads the bank list cache. Missing or unparsable caches yield an empty
/// list (with a log line) so callers never fail on reference data.
pub async fn read_cache(path: &Path) -> Vec<BankInfo> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!("Could not read bank cache {}: {e}", path.display());
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(banks) => banks,
        Err(e) => {
            warn!("Bank cache {} is corrupt: {e}", path.display());
            Vec::new()
        }
    }
}

/// Case-insensitive filter over name and short name.
#[must_use]
pub fn search<'a>(banks: &'a [BankInfo], query: &str) -> Vec<&'a BankInfo> {
    let query = query.to_lowercase();
    banks
        .iter()
        .filter(|b| {
            b.name.to_lowercase().contains(&query)
                || b.short_name.to_lowercase().contains(&query)
        })
        .collect()
}

/// Fetches the bank list and rewrites the cache. Returns how many banks were
/// stored.
///
/// # Errors
/// Returns an error on a failed request, refused API code, or failed write.
pub async fn refresh(client: &reqwest::Client, api_url: &str, cache_path: &Path) -> Result<usize> {
    let body = client
        .get(api_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let banks = parse_api_response(&body)?;
    write_cache(cache_path, &banks).await?;
    Ok(banks.len())
}

/// Spawns the daily cache refresher; the first tick runs immediately on
/// startup. Failures are logged and the previous cache is kept.
pub fn spawn_refresher(config: AppConfig) {
    tokio::spawn(async move {
        let client = reqwest::Client::new();
        let cache_path = config.bank_cache_path();
        let mut interval = tokio::time::interval(Duration::from_secs(24 * 60 * 60));
        loop {
            interval.tick().await;
            match refresh(&client, &config.bank_api_url, &cache_path).await {
                Ok(count) => info!("Bank list refreshed, {count} banks cached"),
                Err(e) => error!("Bank list refresh failed: {e}"),
            }
        }
    });
}

/// Registers a bank account reference for a user in a guild.
///
/// # Errors
/// Returns [`Error::Config`] for empty fields or a database error.
pub async fn register_account(
    db: &DatabaseConnection,
    guild_id: &str,
    user_id: &str,
    name: &str,
    short_name: &str,
) -> Result<bank_account::Model> {
    let name = name.trim();
    let short_name = short_name.trim();
    if name.is_empty() || short_name.is_empty() {
        return Err(Error::Config {
            message: "Account name and bank short name are both required".to_string(),
        });
    }

    let model = bank_account::ActiveModel {
        id: Set(ids::generate()),
        guild_id: Set(guild_id.to_string()),
        user_id: Set(user_id.to_string()),
        name: Set(name.to_string()),
        short_name: Set(short_name.to_string()),
        created_at: Set(chrono::Utc::now().naive_utc()),
    };
    model.insert(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    const SAMPLE: &str = r#"{
        "code": "00",
        "desc": "Get Bank list successful!",
        "data": [
            {"name": "Ngan hang A", "shortName": "NHA", "code": "NHA", "bin": "970400"},
            {"name": "Ngan hang B", "shortName": "NHB", "code": "NHB", "bin": "970401"}
        ]
    }"#;

    #[test]
    fn test_parse_accepts_success_code() {
        let banks = parse_api_response(SAMPLE).unwrap();
        assert_eq!(banks.len(), 2);
        assert_eq!(banks[0].short_name, "NHA");
        assert_eq!(banks[1].bin, "970401");
    }

    #[test]
    fn test_parse_rejects_failure_code() {
        let body = r#"{"code": "99", "desc": "nope", "data": []}"#;
        assert!(matches!(
            parse_api_response(body),
            Err(Error::Config { .. })
        ));
    }

    #[tokio::test]
    async fn test_cache_write_then_read() -> Result<()> {
        let dir = temp_dir("bank-cache");
        let path = dir.join("banks.json");
        let banks = parse_api_response(SAMPLE)?;

        write_cache(&path, &banks).await?;
        let reloaded = read_cache(&path).await;

        assert_eq!(reloaded, banks);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_or_corrupt_cache_reads_empty() -> Result<()> {
        let dir = temp_dir("bank-cache-bad");
        assert!(read_cache(&dir.join("absent.json")).await.is_empty());

        let corrupt = dir.join("corrupt.json");
        write_cache(&dir.join("unused.json"), &[]).await?; // creates the dir
        tokio::fs::write(&corrupt, b"{ not json").await?;
        assert!(read_cache(&corrupt).await.is_empty());
        Ok(())
    }

    #[test]
    fn test_search_matches_name_and_short_name_case_insensitively() {
        let banks = parse_api_response(SAMPLE).unwrap();
        assert_eq!(search(&banks, "nhb").len(), 1);
        assert_eq!(search(&banks, "NGAN HANG").len(), 2);
        assert!(search(&banks, "zzz").is_empty());
    }

    #[tokio::test]
    async fn test_register_account_persists() -> Result<()> {
        let db = setup_test_db().await?;

        let account = register_account(&db, "guild-a", "user-1", "Alex Doe", "NHA").await?;

        assert_eq!(account.guild_id, "guild-a");
        assert_eq!(account.user_id, "user-1");
        assert_eq!(account.short_name, "NHA");
        Ok(())
    }

    #[tokio::test]
    async fn test_register_account_requires_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let result = register_account(&db, "guild-a", "user-1", " ", "NHA").await;
        assert!(matches!(result, Err(Error::Config { .. })));
        Ok(())
    }
}
