use std::{
    collections::HashMap,
    sync::atomic::{AtomicI64, Ordering},
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

/// Metadata for one uploaded file staged on disk. The bytes live under the
/// upload directory and outlive the in-memory record.
#[derive(Clone, Debug, Serialize)]
pub struct StoredFile {
    pub stored_path: String,
    pub original_name: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Institute {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub files: HashMap<String, Vec<StoredFile>>,
    pub created_at: DateTime<Utc>,
}

/// Process-lifetime record store. Nothing survives a restart.
///
/// Ids come from a single atomic counter seeded from the wall clock at
/// startup, so they stay unique under concurrent creation and do not repeat
/// across restarts in practice.
pub struct RecordStore {
    next_id: AtomicI64,
    users: RwLock<Vec<User>>,
    institutes: RwLock<Vec<Institute>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(Utc::now().timestamp_millis()),
            users: RwLock::new(Vec::new()),
            institutes: RwLock::new(Vec::new()),
        }
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Appends a new user. Repeated emails create distinct records.
    pub async fn create_user(&self, email: String) -> User {
        let user = User {
            id: self.allocate_id(),
            email,
            created_at: Utc::now(),
        };
        self.users.write().await.push(user.clone());
        user
    }

    pub async fn create_institute(
        &self,
        name: String,
        email: String,
        files: HashMap<String, Vec<StoredFile>>,
    ) -> Institute {
        let institute = Institute {
            id: self.allocate_id(),
            name,
            email,
            files,
            created_at: Utc::now(),
        };
        self.institutes.write().await.push(institute.clone());
        institute
    }

    pub async fn list_institutes(&self) -> Vec<Institute> {
        self.institutes.read().await.clone()
    }

    #[cfg(test)]
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    #[cfg(test)]
    pub async fn institute_count(&self) -> usize {
        self.institutes.read().await.len()
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn create_user_appends_and_returns_record() {
        let store = RecordStore::new();
        let user = store.create_user("a@example.com".into()).await;

        assert!(user.id > 0);
        assert_eq!(user.email, "a@example.com");
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn repeated_emails_create_distinct_users() {
        let store = RecordStore::new();
        let first = store.create_user("same@example.com".into()).await;
        let second = store.create_user("same@example.com".into()).await;

        assert_ne!(first.id, second.id);
        assert_eq!(store.user_count().await, 2);
    }

    #[tokio::test]
    async fn institutes_are_listed_in_insertion_order() {
        let store = RecordStore::new();
        store
            .create_institute("First".into(), "f@example.com".into(), HashMap::new())
            .await;
        store
            .create_institute("Second".into(), "s@example.com".into(), HashMap::new())
            .await;

        let listed = store.list_institutes().await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "First");
        assert_eq!(listed[1].name, "Second");
        assert!(listed[0].id < listed[1].id);
    }

    #[tokio::test]
    async fn concurrent_creations_never_collide() {
        let store = Arc::new(RecordStore::new());

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create_user(format!("user{i}@example.com")).await.id
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), 32);
        assert_eq!(store.user_count().await, 32);
    }
}
