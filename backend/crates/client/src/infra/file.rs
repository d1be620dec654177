//! JSON file session store
//!
//! Keeps the session in one JSON document keyed by the fixed storage names
//! (`access_token`, `refresh_token`, `user`). Writes go to a sibling temp
//! file and are renamed into place.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::session::Session;
use crate::domain::store::SessionStore;
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<Value>,
}

/// File-backed session store
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> ClientResult<Document> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Document::default()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ClientError::Storage(format!("corrupt session file {}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, doc: &Document) -> ClientResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(doc)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn update(&self, f: impl FnOnce(&mut Document) + Send) -> ClientResult<()> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read().await?;
        f(&mut doc);
        self.write(&doc).await
    }
}

impl SessionStore for FileSessionStore {
    async fn load(&self) -> ClientResult<Option<Session>> {
        let _guard = self.lock.lock().await;
        let doc = self.read().await?;
        Ok(match (doc.access_token, doc.refresh_token) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                Some(Session::new(access, refresh))
            }
            _ => None,
        })
    }

    async fn save(&self, session: &Session) -> ClientResult<()> {
        let access = session.access_token.as_str().to_string();
        let refresh = session.refresh_token.as_str().to_string();
        self.update(move |doc| {
            doc.access_token = Some(access);
            doc.refresh_token = Some(refresh);
        })
        .await
    }

    async fn clear(&self) -> ClientResult<()> {
        self.update(|doc| *doc = Document::default()).await
    }

    async fn load_profile(&self) -> ClientResult<Option<Value>> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.user)
    }

    async fn save_profile(&self, profile: &Value) -> ClientResult<()> {
        let profile = profile.clone();
        self.update(move |doc| doc.user = Some(profile)).await
    }
}
