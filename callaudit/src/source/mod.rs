mod decode;

pub use decode::decode_call_log;

use std::sync::Arc;

use common::{Error, Result};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::models::CallEntry;
use crate::storage::ObjectStorage;

/// One fetched agent log, with the change marker the cache layer compares
/// on later accesses.
pub struct FetchedLog {
    pub fingerprint: String,
    pub entries: Vec<CallEntry>,
}

/// Yields raw per-agent call logs from the log bucket. The bucket holds
/// one `<agent>.csv` object per tracked agent.
pub struct RecordSource {
    storage: Arc<dyn ObjectStorage>,
    row_limit: Option<usize>,
}

impl RecordSource {
    pub fn new(storage: Arc<dyn ObjectStorage>, row_limit: Option<usize>) -> Self {
        Self { storage, row_limit }
    }

    pub async fn list_agents(&self) -> Result<Vec<String>> {
        let keys = self.storage.list_objects("").await?;
        let mut agents: Vec<String> = keys
            .into_iter()
            .filter(|key| !key.contains('/'))
            .filter_map(|key| key.strip_suffix(".csv").map(str::to_string))
            .collect();
        agents.sort();
        Ok(agents)
    }

    /// The storage-side change marker for an agent's log, without fetching
    /// the log itself. `None` when the backend does not provide one.
    pub async fn fingerprint(&self, agent: &str) -> Result<Option<String>> {
        self.storage.object_fingerprint(&log_key(agent)).await
    }

    pub async fn fetch(&self, agent: &str) -> Result<FetchedLog> {
        let key = log_key(agent);
        if !self.storage.check_file_exists(&key).await? {
            return Err(Error::NotFound(format!("no call log for agent '{}'", agent)));
        }

        let bytes = self.storage.get_object(&key).await?;
        let fingerprint = match self.storage.object_fingerprint(&key).await? {
            Some(etag) => etag,
            None => content_fingerprint(&bytes),
        };

        let mut entries = decode_call_log(&bytes)?;
        if let Some(limit) = self.row_limit {
            if entries.len() > limit {
                warn!(
                    agent,
                    total = entries.len(),
                    limit,
                    "truncating call log to the configured row limit"
                );
                entries.truncate(limit);
            }
        }

        Ok(FetchedLog {
            fingerprint,
            entries,
        })
    }
}

fn log_key(agent: &str) -> String {
    format!("{}.csv", agent)
}

pub fn content_fingerprint(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{:x}", digest)
}
