//! PostgreSQL adapter tests
//!
//! Each test starts its own container, so they are ignored by default.
//! Run with `cargo test -p test_utils -- --ignored` where Docker is available.

use std::sync::Arc;

use chrono::Duration;
use core_kernel::{
    AdapterHealth, BatchId, Clock, FixedClock, HealthCheckable, OperationMetadata,
    ReferenceDataId, RequestId,
};
use domain_reference::{
    DocumentConfigFilter, ReferenceData, ReferenceDataFilter, TemporalRecordStore,
};
use domain_requests::{
    DocumentRequestService, MetadataChip, SearchCriteria, SearchLimits, SortSpec,
};
use infra_db::{
    DocumentConfigRepository, DocumentRequestRepository, PgHealthCheck, ReferenceDataRepository,
};
use test_utils::{
    assert_closed_at, assert_periods_disjoint, assert_single_active, create_isolated_test_database,
    DocumentConfigFixtures, DocumentRequestBuilder, ReferenceDataFixtures, RequestFixtures,
    TemporalFixtures, TestDatabase,
};

fn actor() -> OperationMetadata {
    OperationMetadata::initiated_by("it-user")
}

mod versioned_records {
    use super::*;

    fn reference_store(db: &TestDatabase, clock: Arc<FixedClock>) -> TemporalRecordStore<ReferenceData> {
        TemporalRecordStore::new(Arc::new(ReferenceDataRepository::new(db.pool().clone())), clock)
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_update_closes_and_replaces_in_one_transaction() {
        let db = create_isolated_test_database().await.unwrap();
        let clock = Arc::new(FixedClock::new(TemporalFixtures::epoch()));
        let store = reference_store(&db, clock.clone());

        let web = store.create(ReferenceDataFixtures::web_source(), &actor()).await.unwrap();
        clock.advance(Duration::hours(1));
        let web2 = store
            .update(web.id, ReferenceData::new("SOURCE_SYSTEM", "WEB2"), &actor())
            .await
            .unwrap();

        assert_ne!(web2.id, web.id);
        assert_eq!(web2.period.from, TemporalFixtures::later());
        assert!(web2.period.is_open());

        let closed = store.get_by_id(web.id).await.unwrap();
        assert_closed_at(&closed, TemporalFixtures::later() - Duration::seconds(1));
        assert_eq!(closed.audit.last_updated_by, "it-user");

        let history = store
            .list_by_key(&ReferenceDataFilter::by_type("SOURCE_SYSTEM"), true)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_periods_disjoint(&history);
        let active = assert_single_active(&history, clock.now());
        assert_eq!(active.payload.ref_data_value, "WEB2");
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_second_update_of_superseded_id_keeps_one_active_version() {
        let db = create_isolated_test_database().await.unwrap();
        let clock = Arc::new(FixedClock::new(TemporalFixtures::epoch()));
        let store = reference_store(&db, clock.clone());

        let v1 = store.create(ReferenceDataFixtures::failed_status(), &actor()).await.unwrap();
        clock.advance(Duration::hours(1));
        let v2 = store
            .update(v1.id, ReferenceDataFixtures::failed_status().with_description("v2"), &actor())
            .await
            .unwrap();
        clock.advance(Duration::hours(1));
        let v3 = store
            .update(v1.id, ReferenceDataFixtures::failed_status().with_description("v3"), &actor())
            .await
            .unwrap();

        assert_eq!(v3.payload.description.as_deref(), Some("v3"));
        assert!(v3.period.is_open());
        assert_closed_at(
            &store.get_by_id(v1.id).await.unwrap(),
            TemporalFixtures::later() - Duration::seconds(1),
        );
        assert_closed_at(&store.get_by_id(v2.id).await.unwrap(), clock.now() - Duration::seconds(1));

        let history = store
            .list_by_key(&ReferenceDataFilter::by_type(v1.payload.ref_data_type.clone()), true)
            .await
            .unwrap();
        assert_eq!(history.len(), 3);
        assert_periods_disjoint(&history);
        assert_eq!(assert_single_active(&history, clock.now()).id, v3.id);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_active_lookup_by_type_after_delete_is_not_found() {
        let db = create_isolated_test_database().await.unwrap();
        let clock = Arc::new(FixedClock::new(TemporalFixtures::epoch()));
        let store = reference_store(&db, clock.clone());

        let record = store.create(ReferenceDataFixtures::invoice_type(), &actor()).await.unwrap();
        clock.advance(Duration::minutes(10));
        store.delete(record.id, &actor()).await.unwrap();

        let active = store
            .list_by_key(&ReferenceDataFilter::by_type("DOCUMENT_TYPE"), false)
            .await;
        let historic = store
            .list_by_key(&ReferenceDataFilter::by_type("DOCUMENT_TYPE"), true)
            .await
            .unwrap();

        assert!(active.is_err());
        assert_eq!(historic.len(), 1);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_unknown_id_is_not_found() {
        let db = create_isolated_test_database().await.unwrap();
        let store = reference_store(&db, Arc::new(FixedClock::new(TemporalFixtures::epoch())));

        let error = store.get_by_id(ReferenceDataId::new(4242)).await.unwrap_err();

        assert_eq!(error.to_string(), "Reference data not found with ID: 4242");
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_document_configuration_search_by_partial_key() {
        let db = create_isolated_test_database().await.unwrap();
        let footer = db.seed_reference_data(&ReferenceData::new("FOOTER", "STANDARD")).await.unwrap();
        let spec = db.seed_reference_data(&ReferenceData::new("APP_DOC_SPEC", "LETTER")).await.unwrap();
        let code = db.seed_reference_data(&ReferenceData::new("CODE", "EN")).await.unwrap();
        let clock = Arc::new(FixedClock::new(TemporalFixtures::later()));
        let store = TemporalRecordStore::new(
            Arc::new(DocumentConfigRepository::new(db.pool().clone())),
            clock,
        );

        let created = store
            .create(
                DocumentConfigFixtures::footer(footer.value(), spec.value(), code.value()),
                &actor(),
            )
            .await
            .unwrap();

        let by_footer = DocumentConfigFilter {
            footer_id: Some(footer),
            ..DocumentConfigFilter::default()
        };
        let by_other_code = DocumentConfigFilter {
            code_id: Some(spec),
            ..DocumentConfigFilter::default()
        };

        let found = store.list_by_key(&by_footer, false).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, created.id);
        assert!(store.list_by_key(&by_other_code, false).await.unwrap().is_empty());

        let by_values = DocumentConfigFilter::by_values("STANDARD", "LETTER", "EN");
        let by_wrong_value = DocumentConfigFilter::by_values("STANDARD", "LETTER", "FR");
        assert_eq!(store.list_by_key(&by_values, false).await.unwrap()[0].id, created.id);
        assert!(store.list_by_key(&by_wrong_value, false).await.unwrap().is_empty());
    }
}

mod document_requests {
    use super::*;

    struct Seeded {
        db: TestDatabase,
        completed: ReferenceDataId,
        failed: ReferenceDataId,
        policy_key: ReferenceDataId,
    }

    async fn seeded() -> Seeded {
        let db = create_isolated_test_database().await.unwrap();
        let web = db.seed_reference_data(&ReferenceDataFixtures::web_source()).await.unwrap();
        let invoice = db.seed_reference_data(&ReferenceDataFixtures::invoice_type()).await.unwrap();
        let letter = db.seed_reference_data(&ReferenceDataFixtures::welcome_letter()).await.unwrap();
        let completed = db.seed_reference_data(&ReferenceDataFixtures::completed_status()).await.unwrap();
        let failed = db.seed_reference_data(&ReferenceDataFixtures::failed_status()).await.unwrap();
        let policy_key = db.seed_reference_data(&ReferenceDataFixtures::policy_number_key()).await.unwrap();

        for (id, status) in [(1, completed), (2, failed), (3, completed), (4, completed)] {
            let request = DocumentRequestBuilder::new(id)
                .source_system(web.value())
                .document_type(invoice.value())
                .document_name(letter.value())
                .status(status.value())
                .build();
            db.seed_request(&request).await.unwrap();
        }
        db.seed_metadata(&RequestFixtures::metadata(1, 3, policy_key.value(), "POL-42")).await.unwrap();
        db.seed_content(RequestId::new(3), &RequestFixtures::json_only("POL-42")).await.unwrap();
        db.seed_batch(&RequestFixtures::batch(10, 3, completed.value(), 3)).await.unwrap();
        db.seed_batch(&RequestFixtures::batch(11, 3, failed.value(), 4)).await.unwrap();
        db.seed_error(&RequestFixtures::error(1, 11, "E42", "Renderer timed out")).await.unwrap();

        Seeded { db, completed, failed, policy_key }
    }

    fn service(db: &TestDatabase) -> DocumentRequestService {
        DocumentRequestService::new(
            Arc::new(DocumentRequestRepository::new(db.pool().clone())),
            SearchLimits::default(),
        )
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_search_filters_sorts_and_counts() {
        let s = seeded().await;
        let service = service(&s.db);
        let criteria = SearchCriteria {
            statuses: vec![s.completed],
            sorts: vec![SortSpec::new("createdAt", "ASC")],
            ..SearchCriteria::default()
        };

        let page = service.search(&criteria, 1, 2).await.unwrap();

        let ids: Vec<i64> = page.content.iter().map(|r| r.id.value()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 2);
        assert!(!page.last);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_batch_and_metadata_filters_match_without_duplicates() {
        let s = seeded().await;
        let service = service(&s.db);
        let criteria = SearchCriteria {
            batch_ids: vec![BatchId::new(10), BatchId::new(11)],
            metadata_chips: vec![MetadataChip::new(s.policy_key, "POL-42")],
            ..SearchCriteria::default()
        };

        let page = service.search(&criteria, 1, 10).await.unwrap();

        assert_eq!(page.total_elements, 1);
        assert_eq!(page.content[0].id, RequestId::new(3));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_summary_groups_statuses_by_name() {
        let s = seeded().await;
        let service = service(&s.db);

        let all = service.summary(None, None).await.unwrap();
        let early = service
            .summary(None, Some(TemporalFixtures::request_day(2)))
            .await
            .unwrap();

        assert_eq!(all.total_count, 4);
        assert_eq!(all.status_counts[0].status_name, "COMPLETED");
        assert_eq!(all.status_counts[0].count, 3);
        assert_eq!(all.status_counts[1].status_id, s.failed);
        assert_eq!(all.status_counts[1].status_description.as_deref(), Some("Processing failed"));
        assert_eq!(early.total_count, 2);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_details_of_a_request() {
        let s = seeded().await;
        let service = service(&s.db);
        let id = RequestId::new(3);

        let metadata = service.metadata(id).await.unwrap();
        let json = service.json_content(id).await.unwrap();
        let xml = service.xml_content(id).await;
        let batches = service.batches(id).await.unwrap();
        let errors = service.batch_errors(BatchId::new(11)).await.unwrap();

        assert_eq!(metadata[0].value, "POL-42");
        assert!(json.content.contains("POL-42"));
        assert!(xml.is_err());
        assert_eq!(batches[0].id, BatchId::new(11));
        assert_eq!(errors[0].error_code.as_deref(), Some("E42"));
        assert!(service.batch_errors(BatchId::new(10)).await.unwrap().is_empty());
        assert!(service.batches(RequestId::new(99)).await.is_err());
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_health_check_reports_healthy() {
        let db = create_isolated_test_database().await.unwrap();

        let result = PgHealthCheck::new(db.pool().clone()).health_check().await;

        assert_eq!(result.status, AdapterHealth::Healthy);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_clear_data_empties_tables() {
        let s = seeded().await;
        s.db.clear_data().await.unwrap();

        let page = service(&s.db)
            .search(&SearchCriteria::default(), 1, 10)
            .await
            .unwrap();
        let summary = service(&s.db)
            .summary(Some(TemporalFixtures::before_epoch()), None)
            .await
            .unwrap();

        assert_eq!(page.total_elements, 0);
        assert_eq!(summary.total_count, 0);
    }
}
