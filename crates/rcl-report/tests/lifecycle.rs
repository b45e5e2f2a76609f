use std::sync::Arc;
use std::sync::mpsc;

use rcl_model::{InMemoryTableDao, RowId};
use rcl_report::columns::report_schema;
use rcl_report::{
    AmendmentBatch, DatasetStatus, MockReportService, Report, ReportError, ReportRepository,
    ReportService, ReportType, ServiceCall, ServiceError, StatusFanOut, TaskKind, TaskResult,
    TaskUpdate,
};

fn repository() -> ReportRepository {
    let schema = Arc::new(report_schema().unwrap());
    ReportRepository::new(Arc::new(InMemoryTableDao::new()), schema)
}

fn stored(
    repo: &ReportRepository,
    sender_id: &str,
    dc_code: &str,
    version: &str,
    status: DatasetStatus,
) -> Report {
    let mut report = repo.new_report();
    report.set_sender_id(sender_id);
    report.set_dc_code(dc_code);
    report.set_year("2024");
    report.set_version(version);
    report.set_status(status);
    repo.insert(&mut report).unwrap();
    report
}

fn reload(repo: &ReportRepository, report: &Report) -> Report {
    repo.get(report.id().unwrap()).unwrap().unwrap()
}

fn sender_ids(reports: &[Report]) -> Vec<&str> {
    reports.iter().map(Report::sender_id).collect()
}

/// Two amendments sent together; returns them with the aggregator as stored.
fn send_aggregated(
    repo: &ReportRepository,
    service: &MockReportService,
) -> (Report, Report, Report) {
    let a = stored(repo, "A", "DC1", "01", DatasetStatus::LocallyValidated);
    let b = stored(repo, "B", "DC1", "03", DatasetStatus::LocallyValidated);
    let batch = rcl_report::load_amendment_batch(repo, "DC1").unwrap();
    let outcome = rcl_report::send_batch(repo, service, &batch).unwrap();
    (reload(repo, &a), reload(repo, &b), outcome.target)
}

#[test]
fn amended_reports_are_validated_amendments_of_the_collection() {
    let repo = repository();
    stored(&repo, "A", "DC1", "01", DatasetStatus::LocallyValidated);
    stored(&repo, "B", "DC1", "00", DatasetStatus::LocallyValidated);
    stored(&repo, "C", "DC1", "02", DatasetStatus::Draft);
    stored(&repo, "D", "DC2", "01", DatasetStatus::LocallyValidated);

    let found = rcl_report::find_amended_reports(&repo, "DC1").unwrap();
    assert_eq!(sender_ids(&found), ["A"]);
}

#[test]
fn batch_without_aggregator_skips_drafts_and_finalized() {
    let repo = repository();
    stored(&repo, "A", "DC1", "01", DatasetStatus::LocallyValidated);
    stored(&repo, "B", "DC1", "02", DatasetStatus::Draft);
    stored(&repo, "C", "DC1", "01", DatasetStatus::AcceptedDwh);
    stored(&repo, "D", "DC1", "01", DatasetStatus::Uploaded);

    let batch = rcl_report::load_amendment_batch(&repo, "DC1").unwrap();
    assert!(batch.aggregator.is_none());
    assert_eq!(sender_ids(&batch.reports), ["A", "D"]);
    assert!(!batch.can_all_be_sent());
    assert!(batch.can_refresh_status());
    assert!(!batch.can_all_be_submitted());
}

#[test]
fn empty_batch_predicates_are_false() {
    let batch = AmendmentBatch::default();
    assert!(!batch.can_all_be_sent());
    assert!(!batch.can_all_be_submitted());
    assert!(!batch.can_refresh_status());
}

#[test]
fn single_report_is_sent_directly() {
    let repo = repository();
    let service = MockReportService::new();
    let a = stored(&repo, "A", "DC1", "01", DatasetStatus::LocallyValidated);

    let batch = rcl_report::load_amendment_batch(&repo, "DC1").unwrap();
    let outcome = rcl_report::send_batch(&repo, &service, &batch).unwrap();

    assert_eq!(outcome.receipt.message_id, "MSG-1");
    assert_eq!(outcome.target.id(), a.id());
    let a = reload(&repo, &a);
    assert_eq!(a.status(), DatasetStatus::Uploaded);
    assert_eq!(a.previous_status(), Some(DatasetStatus::LocallyValidated));
    assert_eq!(a.message_id(), "MSG-1");
    assert_eq!(a.dataset_id(), "DS-1");
    assert!(!a.is_aggregated());
    assert_eq!(repo.all().unwrap().len(), 1);
    assert_eq!(service.calls(), [ServiceCall::Send("A".to_string())]);
}

#[test]
fn several_reports_are_sent_through_an_aggregator() {
    let repo = repository();
    let service = MockReportService::new();
    let mut stale = stored(&repo, "DC1_AGGR", "DC1", "01", DatasetStatus::Rejected);
    stale.set_report_type(ReportType::CollectionAggregation);
    repo.update(&stale).unwrap();

    let (a, b, aggregator) = send_aggregated(&repo, &service);

    assert!(aggregator.is_aggregator());
    assert_eq!(aggregator.sender_id(), "DC1_AGGR");
    assert_eq!(aggregator.version(), "03");
    assert_eq!(aggregator.dc_code(), "DC1");
    assert_eq!(aggregator.year(), "2024");
    assert_eq!(aggregator.status(), DatasetStatus::Uploaded);

    let aggregator_id = aggregator.id().unwrap();
    for child in [&a, &b] {
        assert_eq!(child.status(), DatasetStatus::Uploaded);
        assert_eq!(child.aggregator_row_id(), Some(aggregator_id));
    }
    assert!(repo.get(stale.id().unwrap()).unwrap().is_none());
    assert_eq!(repo.versions("DC1_AGGR").unwrap().len(), 1);
    assert_eq!(service.calls(), [ServiceCall::Send("DC1_AGGR".to_string())]);

    let batch = rcl_report::load_amendment_batch(&repo, "DC1").unwrap();
    assert_eq!(
        batch.aggregator.as_ref().and_then(Report::id),
        Some(aggregator_id)
    );
    assert_eq!(sender_ids(&batch.reports), ["A", "B"]);
    assert!(batch.can_refresh_status());
    assert!(!batch.can_all_be_sent());
}

#[test]
fn send_rejects_reports_not_locally_validated() {
    let repo = repository();
    let service = MockReportService::new();
    let draft = stored(&repo, "A", "DC1", "01", DatasetStatus::Draft);
    let batch = AmendmentBatch {
        aggregator: None,
        reports: vec![draft],
    };

    let err = rcl_report::send_batch(&repo, &service, &batch).unwrap_err();
    assert!(matches!(
        err,
        ReportError::InvalidTransition { action: "send", status: DatasetStatus::Draft, .. }
    ));
    assert_eq!(err.user_message(), "Cannot send a report in status DRAFT.");
    assert!(service.calls().is_empty());

    let err = rcl_report::send_batch(&repo, &service, &AmendmentBatch::default()).unwrap_err();
    assert!(matches!(err, ReportError::EmptyBatch));
}

#[test]
fn aggregation_requires_one_data_collection() {
    let repo = repository();
    let a = stored(&repo, "A", "DC1", "01", DatasetStatus::LocallyValidated);
    let b = stored(&repo, "B", "DC2", "01", DatasetStatus::LocallyValidated);

    let err = rcl_report::create_aggregated_report(&repo, &[a, b]).unwrap_err();
    assert!(matches!(
        err,
        ReportError::MixedDataCollections { ref expected, ref found } if expected == "DC1" && found == "DC2"
    ));
    assert_eq!(repo.all().unwrap().len(), 2);
}

#[test]
fn service_failure_leaves_the_report_untouched() {
    let repo = repository();
    let service =
        MockReportService::new().failing(ServiceError::Unavailable("timeout".to_string()));
    let a = stored(&repo, "A", "DC1", "01", DatasetStatus::LocallyValidated);

    let batch = rcl_report::load_amendment_batch(&repo, "DC1").unwrap();
    let err = rcl_report::send_batch(&repo, &service, &batch).unwrap_err();

    assert!(matches!(err, ReportError::Service(ServiceError::Unavailable(_))));
    assert_eq!(
        err.user_message(),
        "The data collection service could not be reached. Try again later."
    );
    assert_eq!(reload(&repo, &a).status(), DatasetStatus::LocallyValidated);
}

#[test]
fn refresh_fans_the_aggregator_status_out() {
    let repo = repository();
    let service = MockReportService::new();
    let (a, b, aggregator) = send_aggregated(&repo, &service);

    service.set_status("DC1_AGGR", DatasetStatus::Processing);
    let refreshed = rcl_report::refresh_status(&repo, &service, &a).unwrap();

    assert_eq!(refreshed.id(), aggregator.id());
    assert_eq!(refreshed.status(), DatasetStatus::Processing);
    for child in [reload(&repo, &a), reload(&repo, &b)] {
        assert_eq!(child.status(), DatasetStatus::Processing);
        assert_eq!(child.aggregator_row_id(), aggregator.id());
    }
    assert!(repo.get(aggregator.id().unwrap()).unwrap().is_some());
    assert_eq!(
        service.calls().last(),
        Some(&ServiceCall::FetchStatus("DC1_AGGR".to_string()))
    );
}

#[test]
fn finalized_aggregator_is_deleted_and_children_detached() {
    let repo = repository();
    let service = MockReportService::new();
    let (a, b, aggregator) = send_aggregated(&repo, &service);

    service.set_status("DC1_AGGR", DatasetStatus::AcceptedDwh);
    let refreshed = rcl_report::refresh_status(&repo, &service, &b).unwrap();
    assert_eq!(refreshed.status(), DatasetStatus::AcceptedDwh);

    for child in [reload(&repo, &a), reload(&repo, &b)] {
        assert_eq!(child.status(), DatasetStatus::AcceptedDwh);
        assert!(!child.is_aggregated());
    }
    assert!(repo.get(aggregator.id().unwrap()).unwrap().is_none());
    assert!(repo.versions("DC1_AGGR").unwrap().is_empty());
}

#[test]
fn missing_aggregator_refreshes_the_report_itself() {
    let repo = repository();
    let service = MockReportService::new().with_status("A", DatasetStatus::Valid);
    let mut a = stored(&repo, "A", "DC1", "01", DatasetStatus::Uploaded);
    a.set_aggregator_id(Some("99"));
    repo.update(&a).unwrap();

    let refreshed = rcl_report::refresh_status(&repo, &service, &a).unwrap();

    assert_eq!(refreshed.id(), a.id());
    let a = reload(&repo, &a);
    assert_eq!(a.status(), DatasetStatus::Valid);
    assert_eq!(a.aggregator_id(), Some("99"));
    assert_eq!(service.calls(), [ServiceCall::FetchStatus("A".to_string())]);
}

#[test]
fn unknown_remote_dataset_is_a_service_error() {
    let repo = repository();
    let service = MockReportService::new();
    let a = stored(&repo, "A", "DC1", "01", DatasetStatus::Uploaded);

    let err = rcl_report::refresh_status(&repo, &service, &a).unwrap_err();
    assert!(matches!(
        err,
        ReportError::Service(ServiceError::NotFound { ref sender_id }) if sender_id == "A"
    ));
    assert_eq!(reload(&repo, &a).status(), DatasetStatus::Uploaded);
}

#[test]
fn submit_goes_through_the_aggregator() {
    let repo = repository();
    let service = MockReportService::new();
    let (a, _, aggregator) = send_aggregated(&repo, &service);

    service.set_status("DC1_AGGR", DatasetStatus::ValidWithWarnings);
    rcl_report::refresh_status(&repo, &service, &a).unwrap();

    let batch = rcl_report::load_amendment_batch(&repo, "DC1").unwrap();
    assert!(batch.can_all_be_submitted());

    let status = rcl_report::submit_batch(&repo, &service, &batch).unwrap();
    assert_eq!(status, DatasetStatus::Submitted);
    assert_eq!(
        service.calls().last(),
        Some(&ServiceCall::Submit("DC1_AGGR".to_string()))
    );
    assert_eq!(
        reload(&repo, &aggregator).status(),
        DatasetStatus::Submitted
    );
    for report in &batch.reports {
        let report = reload(&repo, report);
        assert_eq!(report.status(), DatasetStatus::Submitted);
        assert_eq!(report.previous_status(), Some(DatasetStatus::ValidWithWarnings));
    }
}

#[test]
fn submit_requires_a_valid_target() {
    let repo = repository();
    let service = MockReportService::new();
    stored(&repo, "A", "DC1", "01", DatasetStatus::LocallyValidated);

    let batch = rcl_report::load_amendment_batch(&repo, "DC1").unwrap();
    let err = rcl_report::submit_batch(&repo, &service, &batch).unwrap_err();
    assert!(matches!(
        err,
        ReportError::InvalidTransition { action: "submit", .. }
    ));
    assert!(service.calls().is_empty());
}

#[test]
fn submit_needs_the_stored_aggregator() {
    let repo = repository();
    let service = MockReportService::new();
    let mut a = stored(&repo, "A", "DC1", "01", DatasetStatus::Valid);
    a.set_aggregator_id(Some("99"));
    repo.update(&a).unwrap();

    let batch = AmendmentBatch {
        aggregator: None,
        reports: vec![a.clone()],
    };
    let err = rcl_report::submit_batch(&repo, &service, &batch).unwrap_err();
    assert!(matches!(
        err,
        ReportError::MissingAggregator { ref aggregator_id } if aggregator_id == "99"
    ));
    assert!(service.calls().is_empty());
    assert_eq!(reload(&repo, &a).status(), DatasetStatus::Valid);
}

#[test]
fn fan_out_plan_lists_updates_before_commit() {
    let repo = repository();
    let mut aggregator = stored(&repo, "DC1_AGGR", "DC1", "02", DatasetStatus::Submitted);
    let child = stored(&repo, "A", "DC1", "02", DatasetStatus::Submitted);
    aggregator.set_status(DatasetStatus::Deleted);

    let versions = repo.versions("DC1_AGGR").unwrap();
    let plan = StatusFanOut::follow(&aggregator, vec![child.clone()], &versions);

    assert_eq!(plan.updates().len(), 1);
    assert_eq!(plan.updates()[0].status(), DatasetStatus::Deleted);
    assert_eq!(plan.deletions(), [aggregator.id().unwrap()]);
    assert_eq!(reload(&repo, &child).status(), DatasetStatus::Submitted);

    plan.commit(&repo).unwrap();
    assert_eq!(reload(&repo, &child).status(), DatasetStatus::Deleted);
    assert_eq!(repo.all().unwrap().len(), 1);
}

#[test]
fn commit_stops_at_the_first_failing_update() {
    let repo = repository();
    let kept = stored(&repo, "A", "DC1", "01", DatasetStatus::Uploaded);
    let mut ghost = repo.new_report();
    ghost.set_sender_id("GHOST");
    ghost.row_mut().set_id(RowId::new(500));

    let plan = StatusFanOut::assign(DatasetStatus::Valid, &[kept.clone(), ghost]);
    let err = plan.commit(&repo).unwrap_err();

    assert!(matches!(err, ReportError::Store(_)));
    assert_eq!(reload(&repo, &kept).status(), DatasetStatus::Valid);
}

#[test]
fn workers_report_through_the_channel() {
    let repo = repository();
    stored(&repo, "A", "DC1", "01", DatasetStatus::LocallyValidated);
    let (sender, receiver) = mpsc::channel();

    rcl_report::spawn_find_amended(repo.clone(), "DC1".to_string(), sender.clone())
        .join()
        .unwrap();
    let batch = match receiver.recv().unwrap() {
        TaskUpdate::Finished(TaskResult::Amended(batch)) => batch,
        other => panic!("unexpected update: {other:?}"),
    };
    assert_eq!(batch.len(), 1);

    let service: Arc<dyn ReportService> = Arc::new(MockReportService::new());
    rcl_report::spawn_send(repo.clone(), Arc::clone(&service), batch, sender.clone())
        .join()
        .unwrap();
    let sent = match receiver.recv().unwrap() {
        TaskUpdate::Finished(TaskResult::Sent(outcome)) => outcome.target,
        other => panic!("unexpected update: {other:?}"),
    };
    assert_eq!(sent.status(), DatasetStatus::Uploaded);

    let failing: Arc<dyn ReportService> = Arc::new(
        MockReportService::new().failing(ServiceError::Unavailable("down".to_string())),
    );
    rcl_report::spawn_refresh(repo, failing, sent, sender)
        .join()
        .unwrap();
    match receiver.recv().unwrap() {
        TaskUpdate::Terminated { task, error } => {
            assert_eq!(task, TaskKind::RefreshStatus);
            assert!(matches!(error, ReportError::Service(_)));
        }
        other => panic!("unexpected update: {other:?}"),
    }
}
