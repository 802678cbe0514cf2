use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::error::StorageError;
use super::traits::{AccountPersistence, AccountStore};
use crate::domain::{Account, AmountType};

/// Whole-file JSON persistence of the account list
///
/// Writes go to a sibling temp file that is then renamed over the target, one
/// writer at a time.
#[derive(Debug)]
pub struct JsonFilePersistence {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "accounts.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl<A: AmountType> AccountPersistence<A> for JsonFilePersistence {
    async fn load(&self) -> Result<Option<Vec<Account<A>>>, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let accounts: Vec<Account<A>> = serde_json::from_slice(&bytes)?;
        info!(
            count = accounts.len(),
            path = %self.path.display(),
            "Loaded accounts"
        );
        Ok(Some(accounts))
    }

    async fn persist<S>(&self, store: &S) -> Result<(), StorageError>
    where
        S: AccountStore<A>,
    {
        let _guard = self.write_lock.lock().await;
        let temp_path = self.temp_path();

        let mut file = tokio::fs::File::create(&temp_path).await?;
        store.snapshot(&mut file).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&temp_path, &self.path).await?;
        debug!(
            count = store.len(),
            path = %self.path.display(),
            "Saved accounts"
        );
        Ok(())
    }
}

/// Persistence that keeps nothing; accounts live only in memory
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryOnly;

#[async_trait]
impl<A: AmountType> AccountPersistence<A> for MemoryOnly {
    async fn load(&self) -> Result<Option<Vec<Account<A>>>, StorageError> {
        Ok(None)
    }

    async fn persist<S>(&self, _store: &S) -> Result<(), StorageError>
    where
        S: AccountStore<A>,
    {
        Ok(())
    }
}

/// Persistence chosen at startup
#[derive(Debug)]
pub enum PersistenceMode {
    File(JsonFilePersistence),
    Memory(MemoryOnly),
}

impl PersistenceMode {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(JsonFilePersistence::new(path))
    }
}

#[async_trait]
impl<A: AmountType> AccountPersistence<A> for PersistenceMode {
    async fn load(&self) -> Result<Option<Vec<Account<A>>>, StorageError> {
        match self {
            Self::File(file) => AccountPersistence::<A>::load(file).await,
            Self::Memory(memory) => AccountPersistence::<A>::load(memory).await,
        }
    }

    async fn persist<S>(&self, store: &S) -> Result<(), StorageError>
    where
        S: AccountStore<A>,
    {
        match self {
            Self::File(file) => AccountPersistence::<A>::persist(file, store).await,
            Self::Memory(memory) => AccountPersistence::<A>::persist(memory, store).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FixedPoint;
    use crate::storage::ConcurrentAccountStore;
    use tempfile::tempdir;

    fn sample_store() -> ConcurrentAccountStore<FixedPoint> {
        ConcurrentAccountStore::from_accounts([
            Account::new(
                "1111222233334444",
                "Sumitha",
                "1234",
                "123456789",
                FixedPoint::from_whole_units(5000),
            ),
            Account::new(
                "2222333344445555",
                "Divya",
                "2345",
                "987654321",
                FixedPoint::from_decimal_str("6000.25").unwrap(),
            ),
        ])
    }

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let dir = tempdir().unwrap();
        let persistence = JsonFilePersistence::new(dir.path().join("accounts.json"));

        let loaded = AccountPersistence::<FixedPoint>::load(&persistence)
            .await
            .unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn persist_then_load_restores_accounts() {
        let dir = tempdir().unwrap();
        let persistence = JsonFilePersistence::new(dir.path().join("accounts.json"));
        let store = sample_store();

        AccountPersistence::<FixedPoint>::persist(&persistence, &store)
            .await
            .unwrap();
        let loaded = AccountPersistence::<FixedPoint>::load(&persistence)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(loaded, store.accounts());
        assert!(!dir.path().join("accounts.json.tmp").exists());
    }

    #[tokio::test]
    async fn persisted_file_uses_wire_field_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        let persistence = JsonFilePersistence::new(&path);

        AccountPersistence::<FixedPoint>::persist(&persistence, &sample_store())
            .await
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(value[0]["cardNumber"], "1111222233334444");
        assert_eq!(value[1]["balance"].as_f64(), Some(6000.25));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        std::fs::write(&path, "not json").unwrap();
        let persistence = JsonFilePersistence::new(&path);

        let result = AccountPersistence::<FixedPoint>::load(&persistence).await;
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[tokio::test]
    async fn persist_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let persistence = JsonFilePersistence::new(dir.path().join("nope").join("accounts.json"));

        let result = AccountPersistence::<FixedPoint>::persist(&persistence, &sample_store()).await;
        assert!(matches!(result, Err(StorageError::IoError(_))));
    }

    #[tokio::test]
    async fn memory_only_keeps_nothing() {
        let store = sample_store();

        AccountPersistence::<FixedPoint>::persist(&MemoryOnly, &store)
            .await
            .unwrap();
        let loaded = AccountPersistence::<FixedPoint>::load(&MemoryOnly)
            .await
            .unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn file_mode_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let mode = PersistenceMode::file(dir.path().join("accounts.json"));

        AccountPersistence::<FixedPoint>::persist(&mode, &sample_store())
            .await
            .unwrap();
        let loaded = AccountPersistence::<FixedPoint>::load(&mode)
            .await
            .unwrap();

        assert_eq!(loaded.map(|a| a.len()), Some(2));
    }
}
