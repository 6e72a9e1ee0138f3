//! Racing writers.
//!
//! Two writers that read the same current version both try to append
//! `version + 1`. Only one row can exist at that position, so the second
//! writer must fail with a server error and leave nothing behind.

use std::sync::Arc;

use async_trait::async_trait;
use payments::store::{
    MemoryStore, Result as StoreResult, SqliteOptions, SqliteStore, Store, StoreError, StoreExt,
    VersionLog,
};
use payments::{NewPayment, OrganisationId, PaymentError, PaymentId, PaymentService, PaymentVersion, Repository};
use payments_testkit::TestFixture;
use serde_json::json;

/// A store whose transactions read one version behind the log.
///
/// This is what a writer sees when another transaction commits between its
/// read and its write.
struct StaleReads<S> {
    inner: Arc<S>,
}

#[async_trait]
impl<S: Store> Store for StaleReads<S> {
    async fn transaction<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut dyn VersionLog) -> std::result::Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static,
    {
        self.inner
            .transaction(move |log| {
                let mut stale = StaleLog { inner: log };
                f(&mut stale as &mut dyn VersionLog)
            })
            .await
    }
}

struct StaleLog<'a> {
    inner: &'a mut dyn VersionLog,
}

impl VersionLog for StaleLog<'_> {
    fn insert_version(&mut self, row: &PaymentVersion) -> StoreResult<usize> {
        self.inner.insert_version(row)
    }

    fn current_version(&mut self, id: &PaymentId) -> StoreResult<Option<PaymentVersion>> {
        let mut history = self.inner.history(id)?;
        history.pop();
        Ok(history.pop())
    }

    fn all_current_versions(&mut self) -> StoreResult<Vec<PaymentVersion>> {
        self.inner.all_current_versions()
    }

    fn history(&mut self, id: &PaymentId) -> StoreResult<Vec<PaymentVersion>> {
        self.inner.history(id)
    }
}

async fn losing_update_leaves_winner_in_place<S: Store>(store: S) {
    let fixture = TestFixture::with_store(store);
    let org = OrganisationId::random();
    let winner = fixture
        .seed_chain(org, [json!({"writer": "first"}), json!({"writer": "winner"})])
        .await
        .unwrap();
    let loser = Repository::new(StaleReads {
        inner: fixture.store.clone(),
    });

    let result = loser
        .update(&winner.external_id, NewPayment::new(org, json!({"writer": "loser"})))
        .await;

    assert_eq!(result, Err(PaymentError::Server));
    let rows = fixture.rows(&winner.external_id).await;
    assert_eq!(rows.len(), 2);
    assert_eq!(
        fixture.repository.get(&winner.external_id).await.unwrap().attributes,
        json!({"writer": "winner"})
    );
}

#[tokio::test]
async fn losing_update_is_server_error_on_sqlite() {
    losing_update_leaves_winner_in_place(SqliteStore::open_memory().unwrap()).await;
}

#[tokio::test]
async fn losing_update_is_server_error_in_memory() {
    losing_update_leaves_winner_in_place(MemoryStore::new()).await;
}

#[tokio::test]
async fn losing_delete_is_server_error() {
    let fixture = TestFixture::sqlite();
    let org = OrganisationId::random();
    let winner = fixture
        .seed_chain(org, [json!({"n": 0}), json!({"n": 1})])
        .await
        .unwrap();
    let loser = Repository::new(StaleReads {
        inner: fixture.store.clone(),
    });

    assert_eq!(loser.delete(&winner.external_id).await, Err(PaymentError::Server));

    let current = fixture
        .store
        .current_version(&winner.external_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current, winner);
    assert!(!current.deleted);
}

/// One shared connection: updates are serialized in process and all succeed.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_updates_keep_the_chain_contiguous() {
    let fixture = Arc::new(TestFixture::sqlite());
    let v0 = fixture.seed_payment(json!({"n": 0})).await;
    let id = v0.external_id;
    let org = v0.organisation_id;

    let mut handles = Vec::new();
    for n in 1..=16 {
        let fixture = fixture.clone();
        handles.push(tokio::spawn(async move {
            fixture
                .repository
                .update(&id, NewPayment::new(org, json!({ "n": n })))
                .await
        }));
    }

    let mut succeeded = 0u32;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => succeeded += 1,
            Err(err) => assert_eq!(err, PaymentError::Server),
        }
    }

    let rows = fixture.rows(&id).await;
    let versions: Vec<u32> = rows.iter().map(|r| r.version).collect();
    assert_eq!(versions, (0..=succeeded).collect::<Vec<_>>());
    assert_eq!(fixture.repository.get(&id).await.unwrap().version, succeeded);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn separate_connections_racing_one_payment() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("payments.db");
    let options = SqliteOptions {
        busy_timeout: std::time::Duration::from_secs(2),
    };
    let left = Arc::new(Repository::new(SqliteStore::open_with(&path, &options).unwrap()));
    let right = Arc::new(Repository::new(SqliteStore::open_with(&path, &options).unwrap()));

    for round in 0..20 {
        let id = left
            .create(NewPayment::new(OrganisationId::random(), json!({ "round": round })))
            .await
            .unwrap();

        let racers = [left.clone(), right.clone()].map(|repository| {
            tokio::spawn(async move {
                repository
                    .update(&id, NewPayment::new(OrganisationId::random(), json!({ "round": round })))
                    .await
            })
        });

        let mut succeeded = 0u32;
        for racer in racers {
            match racer.await.unwrap() {
                Ok(()) => succeeded += 1,
                Err(err) => assert_eq!(err, PaymentError::Server),
            }
        }
        assert!(succeeded >= 1, "round {round}: both writers failed");

        let versions: Vec<u32> = right
            .history(&id)
            .await
            .unwrap()
            .iter()
            .map(|r| r.version)
            .collect();
        assert_eq!(versions, (0..=succeeded).collect::<Vec<_>>());
        assert_eq!(left.get(&id).await.unwrap().version, succeeded);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_creates_never_collide() {
    let repository = Arc::new(Repository::new(MemoryStore::new()));

    let mut handles = Vec::new();
    for n in 0..32 {
        let repository = repository.clone();
        handles.push(tokio::spawn(async move {
            repository
                .create(NewPayment::new(OrganisationId::random(), json!({ "n": n })))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(repository.get_all().await.unwrap().len(), 32);
    assert_eq!(repository.store().row_count(), 32);
}
