use crate::SheetsClient;
use async_trait::async_trait;
use std::collections::HashSet;
use subreply_core::BotError;
use tracing::{debug, info};

/// Durable backing for the ledger: a single append-only column of post IDs.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Every value in the column, in stored order.
    async fn load_ids(&self) -> Result<Vec<String>, BotError>;

    /// Durably appends one ID as a new row.
    async fn append_id(&self, id: &str) -> Result<(), BotError>;
}

/// [`LedgerStore`] over one worksheet of the spreadsheet, column A.
#[derive(Debug, Clone)]
pub struct SheetLedgerStore {
    sheets: SheetsClient,
    worksheet: String,
}

impl SheetLedgerStore {
    pub fn new(sheets: SheetsClient, worksheet: impl Into<String>) -> Self {
        Self {
            sheets,
            worksheet: worksheet.into(),
        }
    }
}

#[async_trait]
impl LedgerStore for SheetLedgerStore {
    async fn load_ids(&self) -> Result<Vec<String>, BotError> {
        let rows = self
            .sheets
            .get_range(&format!("{}!A:A", self.worksheet))
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|mut row| if row.is_empty() { None } else { Some(row.remove(0)) })
            .collect())
    }

    async fn append_id(&self, id: &str) -> Result<(), BotError> {
        self.sheets
            .append_row(&format!("{}!A:A", self.worksheet), vec![id.to_string()])
            .await
    }
}

/// Record of every post already replied to. Membership is an in-memory
/// hash set; each newly handled ID is also appended to the store so the
/// record survives restarts. Entries are never deleted or rewritten.
pub struct Ledger<S: LedgerStore> {
    seen: HashSet<String>,
    store: S,
}

impl<S: LedgerStore> Ledger<S> {
    /// Reads the full column once, skipping empty cells. Duplicates in the
    /// stored log collapse into the set.
    pub async fn load(store: S) -> Result<Self, BotError> {
        let ids = store.load_ids().await?;
        let seen: HashSet<String> = ids.into_iter().filter(|id| !id.is_empty()).collect();
        info!("Loaded ledger with {} post IDs", seen.len());
        Ok(Self { seen, store })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Records a handled post. Callers must only invoke this after the
    /// reply actually succeeded, so a failed reply never marks the post.
    pub async fn append(&mut self, id: &str) -> Result<(), BotError> {
        self.seen.insert(id.to_string());
        self.store.append_id(id).await?;
        debug!("Ledger now holds {} post IDs", self.seen.len());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use subreply_core::SheetsError;

    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<String>>,
        fail_appends: bool,
    }

    impl MemoryStore {
        fn with_rows(rows: &[&str]) -> Self {
            Self {
                rows: Mutex::new(rows.iter().map(|s| s.to_string()).collect()),
                fail_appends: false,
            }
        }
    }

    #[async_trait]
    impl LedgerStore for MemoryStore {
        async fn load_ids(&self) -> Result<Vec<String>, BotError> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn append_id(&self, id: &str) -> Result<(), BotError> {
            if self.fail_appends {
                return Err(SheetsError::ServerError { status_code: 503 }.into());
            }
            self.rows.lock().unwrap().push(id.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_load_deduplicates_and_skips_empty_cells() {
        let store = MemoryStore::with_rows(&["p1", "", "p2", "p1"]);
        let ledger = Ledger::load(store).await.unwrap();

        assert_eq!(ledger.len(), 2);
        assert!(ledger.contains("p1"));
        assert!(ledger.contains("p2"));
        assert!(!ledger.contains(""));
        assert!(!ledger.contains("p3"));
    }

    #[tokio::test]
    async fn test_append_updates_set_and_store() {
        let store = MemoryStore::default();
        let mut ledger = Ledger::load(store).await.unwrap();
        assert!(ledger.is_empty());

        ledger.append("p1").await.unwrap();

        assert!(ledger.contains("p1"));
        assert_eq!(ledger.len(), 1);
        assert_eq!(*ledger.store.rows.lock().unwrap(), vec!["p1".to_string()]);
    }

    #[tokio::test]
    async fn test_append_store_failure_surfaces_but_keeps_local_entry() {
        let store = MemoryStore {
            rows: Mutex::new(Vec::new()),
            fail_appends: true,
        };
        let mut ledger = Ledger::load(store).await.unwrap();

        let result = ledger.append("p1").await;
        assert!(result.is_err());
        // Still marked locally, so this process will not double-reply.
        assert!(ledger.contains("p1"));
    }
}
