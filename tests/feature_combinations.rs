//! Tests for feature combinations

#[cfg(feature = "serde")]
mod serde_tests {
    use callback_bridge::{DocumentData, DocumentSnapshot, ErrorInfo, ErrorKind};

    #[test]
    fn snapshot_survives_json() {
        let mut data = DocumentData::new();
        data.insert("name".to_string(), Some("Ada".to_string()));
        data.insert("nick".to_string(), None);
        let snapshot = DocumentSnapshot::found("user1", data);

        let json = serde_json::to_string(&snapshot).expect("serialize snapshot");
        assert!(json.contains("\"exists\":true"));
        let back: DocumentSnapshot = serde_json::from_str(&json).expect("deserialize snapshot");
        assert_eq!(back, snapshot);
    }

    #[test]
    fn error_info_keeps_its_kind() {
        let json = serde_json::to_string(&ErrorInfo::not_found("gone")).expect("serialize cause");
        let back: ErrorInfo = serde_json::from_str(&json).expect("deserialize cause");
        assert_eq!(back.kind(), ErrorKind::NotFound);
        assert_eq!(back.message(), "gone");
    }
}

#[cfg(not(feature = "memory-store"))]
mod custom_provider_tests {
    use std::sync::Arc;

    use callback_bridge::{
        CancelHandle, DocumentClient, DocumentSnapshot, FetchProvider, OnFailure, OnSuccess,
    };

    struct AlwaysMissing;

    impl FetchProvider for AlwaysMissing {
        fn get_document_by_id(
            &self,
            _collection: &str,
            id: &str,
            on_success: OnSuccess<DocumentSnapshot>,
            _on_failure: OnFailure<DocumentSnapshot>,
        ) -> Option<CancelHandle> {
            on_success.call(DocumentSnapshot::missing(id));
            None
        }
    }

    #[tokio::test]
    async fn client_works_without_the_reference_store() {
        let client = DocumentClient::new(Arc::new(AlwaysMissing));
        assert!(client.exists("users", "user1").await.is_err());
        assert!(!client.fetch_data("users", "user1").await.has_payload());
    }
}
