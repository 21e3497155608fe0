//! Tests for the document client call shapes

#[cfg(feature = "memory-store")]
mod memory_store_tests {
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::time::Duration;

    use callback_bridge::{
        BridgeError, CancelToken, DocumentClient, DocumentData, ErrorInfo, InMemoryStore, Outcome,
    };
    use pretty_assertions::assert_eq;

    fn user_data() -> DocumentData {
        let mut data = DocumentData::new();
        data.insert("name".to_string(), Some("Ada".to_string()));
        data.insert("email".to_string(), None);
        data
    }

    fn client(store: InMemoryStore) -> DocumentClient<InMemoryStore> {
        store.insert("users", "user1", user_data());
        DocumentClient::new(Arc::new(store))
    }

    #[test]
    fn callback_style_reports_existence() {
        let client = client(InMemoryStore::new());
        let (tx, rx) = mpsc::channel();

        for id in ["user1", "nobody"] {
            let (ok_tx, err_tx) = (tx.clone(), tx.clone());
            let hook = client.exists_with_callbacks(
                "users",
                id,
                move |exists| ok_tx.send(Ok(exists)).expect("receiver alive"),
                move |cause| err_tx.send(Err(cause)).expect("receiver alive"),
            );
            assert!(hook.is_none());
        }

        assert_eq!(rx.recv().expect("first answer"), Ok(true));
        assert_eq!(rx.recv().expect("second answer"), Ok(false));
    }

    #[test]
    fn callback_style_reports_failure() {
        let client = client(InMemoryStore::new().with_failure(ErrorInfo::new("offline")));
        let (tx, rx) = mpsc::channel();
        let err_tx = tx.clone();
        client.exists_with_callbacks(
            "users",
            "user1",
            move |exists| tx.send(Ok(exists)).expect("receiver alive"),
            move |cause| err_tx.send(Err(cause)).expect("receiver alive"),
        );
        assert_eq!(rx.recv().expect("answer"), Err(ErrorInfo::new("offline")));
    }

    #[tokio::test]
    async fn raising_shape_treats_missing_as_not_found() {
        let client = client(InMemoryStore::new());

        assert_eq!(client.exists("users", "user1").await, Ok(true));
        assert_eq!(
            client.exists("users", "nobody").await,
            Err(BridgeError::NotFound {
                message: "Data Not Exist".to_string()
            })
        );
    }

    #[tokio::test]
    async fn raising_shape_propagates_provider_failure() {
        let client = client(InMemoryStore::new().with_failure(ErrorInfo::new("offline")));
        assert_eq!(
            client.exists("users", "user1").await,
            Err(BridgeError::ProviderFailure(ErrorInfo::new("offline")))
        );
    }

    #[tokio::test]
    async fn outcome_shape_treats_missing_as_empty_success() {
        let client = client(InMemoryStore::new());

        let found = client.fetch_data("users", "user1").await;
        assert_eq!(found, Outcome::success(user_data()));
        assert_eq!(
            found.payload().and_then(|d| d.get("name").cloned().flatten()),
            Some("Ada".to_string())
        );

        let missing = client.fetch_data("users", "nobody").await;
        assert!(missing.is_success());
        assert!(!missing.has_payload());
    }

    #[tokio::test]
    async fn outcome_shape_carries_provider_failure() {
        let client = client(InMemoryStore::new().with_failure(ErrorInfo::new("offline")));
        let outcome = client.fetch_data("users", "user1").await;
        assert_eq!(outcome, Outcome::failure(ErrorInfo::new("offline")));
    }

    #[tokio::test]
    async fn latent_store_answers_from_its_own_thread() {
        let client = client(InMemoryStore::new().with_latency(Duration::from_millis(20)));
        assert_eq!(client.exists("users", "user1").await, Ok(true));
        assert!(client.fetch_data("users", "nobody").await.is_success());
    }

    #[tokio::test]
    async fn cancellable_shape_treats_missing_as_false() {
        let client = client(InMemoryStore::new());
        let token = CancelToken::new();
        assert_eq!(
            client.exists_cancellable("users", "nobody", &token).await,
            Ok(false)
        );
        assert_eq!(
            client.exists_cancellable("users", "user1", &token).await,
            Ok(true)
        );
    }

    #[tokio::test]
    async fn cancelling_runs_the_store_hook() {
        let client = client(InMemoryStore::new().with_latency(Duration::from_secs(30)));
        let token = CancelToken::new();

        let canceller = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                token.cancel();
            })
        };

        assert_eq!(
            client.exists_cancellable("users", "user1", &token).await,
            Err(BridgeError::Cancelled)
        );
        canceller.await.expect("canceller task");
        assert_eq!(client.provider().cancellations(), 1);
    }

    #[tokio::test]
    async fn dropping_a_lookup_cancels_it() {
        let client = client(InMemoryStore::new().with_latency(Duration::from_secs(30)));
        let result = tokio::time::timeout(
            Duration::from_millis(10),
            client.fetch_data("users", "user1"),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(client.provider().cancellations(), 1);
    }

    #[tokio::test]
    async fn concurrent_lookups_are_independent() {
        let client = client(InMemoryStore::new().with_latency(Duration::from_millis(5)));
        let token = CancelToken::new();
        let (a, b, c) = tokio::join!(
            client.exists("users", "user1"),
            client.exists_cancellable("users", "nobody", &token),
            client.fetch_data("users", "user1"),
        );
        assert_eq!(a, Ok(true));
        assert_eq!(b, Ok(false));
        assert!(c.has_payload());
    }
}
