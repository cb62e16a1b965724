use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{info, warn};

use regforge_core::{AccountRecord, RegError};

/// Append-only account sink backed by a JSON array file. The whole-file
/// read-append-write is unsafe under concurrent writers, so every append
/// holds the write lock for the full cycle.
pub struct AccountStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AccountStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, record: AccountRecord) -> Result<(), RegError> {
        let _guard = self.lock.lock().await;

        let mut accounts = self.read_all().await;
        let email = record.email.clone();
        accounts.push(record);

        let json = serde_json::to_vec_pretty(&accounts)
            .map_err(|e| RegError::Storage(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| RegError::Storage(e.to_string()))?;

        info!(email = %email, total = accounts.len(), "account saved");
        Ok(())
    }

    pub async fn load(&self) -> Result<Vec<AccountRecord>, RegError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await)
    }

    /// A corrupt or missing file starts fresh rather than failing the batch.
    async fn read_all(&self) -> Vec<AccountRecord> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %self.path.display(), "account file unreadable, starting fresh: {}", e);
                Vec::new()
            }),
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("regforge-store-{}-{}.json", name, std::process::id()))
    }

    #[tokio::test]
    async fn appends_accumulate() {
        let path = temp_path("accumulate");
        let _ = std::fs::remove_file(&path);
        let store = AccountStore::new(&path);

        store
            .append(AccountRecord::new("a@example.test".into(), "pw1".into(), true))
            .await
            .unwrap();
        store
            .append(AccountRecord::new("b@example.test".into(), "pw2".into(), false))
            .await
            .unwrap();

        let accounts = store.load().await.unwrap();
        assert_eq!(accounts.len(), 2);
        assert!(accounts[0].verified);
        assert!(!accounts[1].verified);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn concurrent_appends_lose_nothing() {
        let path = temp_path("concurrent");
        let _ = std::fs::remove_file(&path);
        let store = std::sync::Arc::new(AccountStore::new(&path));

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = std::sync::Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .append(AccountRecord::new(
                        format!("user{}@example.test", i),
                        "pw".into(),
                        true,
                    ))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let accounts = store.load().await.unwrap();
        assert_eq!(accounts.len(), 8);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn corrupt_file_starts_fresh() {
        let path = temp_path("corrupt");
        std::fs::write(&path, b"{ not json").unwrap();
        let store = AccountStore::new(&path);

        store
            .append(AccountRecord::new("c@example.test".into(), "pw".into(), true))
            .await
            .unwrap();

        let accounts = store.load().await.unwrap();
        assert_eq!(accounts.len(), 1);
        let _ = std::fs::remove_file(&path);
    }
}
