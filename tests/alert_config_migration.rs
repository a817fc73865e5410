//! Alert config export and import against an in-memory deployment

mod common;

use common::{FakeDeployment, orchestrator, source_alert};
use janus::migration::transform::SERVER_ASSIGNED_FIELDS;
use janus::migration::{EntityKind, MigrationOptions, OutcomeCounts, ProjectMapping};
use janus::MigrationError;
use serde_json::json;

fn source() -> FakeDeployment {
    FakeDeployment::new()
        .with_project("p1", "production")
        .with_project("p2", "staging")
        .with_alert_configs(
            "p1",
            vec![
                source_alert("a1", "HOST_DOWN", 0),
                source_alert("a2", "OPLOG_BEHIND", 3600),
                source_alert("a3", "DISK_PARTITION_SPACE_USED_DATA", 90),
            ],
        )
        .with_alert_configs("p2", vec![source_alert("b1", "HOST_DOWN", 0)])
}

/// Exporting and re-importing into the same project creates nothing
#[tokio::test]
async fn test_round_trip_into_same_project_skips_everything() {
    let deployment = source();
    let projects = vec![janus::migration::Project::new("p1", "production")];

    let exporter = orchestrator(&deployment, MigrationOptions::default());
    let exported = exporter.export_alert_configs(&projects).await;
    assert_eq!(exported.elements.len(), 1);
    assert_eq!(exported.elements[0].alert_configs.len(), 3);

    let importer = orchestrator(&deployment, MigrationOptions::default());
    let report = importer
        .import_alert_configs(&exported.elements, &ProjectMapping::same_ids(["p1"]))
        .await
        .unwrap();

    assert_eq!(
        report.totals(EntityKind::AlertConfig),
        OutcomeCounts { created: 0, skipped: 3, failed: 0 }
    );
    assert!(deployment.posted_alert_configs().is_empty());
    assert!(!report.has_project_failures());
}

/// Import into an empty project posts every config without server-assigned fields
#[tokio::test]
async fn test_import_into_empty_project() {
    let src = source();
    let exported = orchestrator(&src, MigrationOptions::default())
        .export_alert_configs(&[janus::migration::Project::new("p1", "production")])
        .await;

    let destination = FakeDeployment::new().with_project("d1", "atlas-prod");
    let mut mapping = ProjectMapping::new();
    mapping.map("p1", "d1");

    let report = orchestrator(&destination, MigrationOptions::default())
        .import_alert_configs(&exported.elements, &mapping)
        .await
        .unwrap();

    assert_eq!(
        report.totals(EntityKind::AlertConfig),
        OutcomeCounts { created: 3, skipped: 0, failed: 0 }
    );
    for posted in destination.posted_alert_configs() {
        for field in SERVER_ASSIGNED_FIELDS {
            assert!(posted.get(field).is_none(), "{} should not be posted", field);
        }
        assert!(posted.get("eventTypeName").is_some());
    }

    // A second run sees the configs created by the first
    let rerun = orchestrator(&destination, MigrationOptions::default())
        .import_alert_configs(&exported.elements, &mapping)
        .await
        .unwrap();
    assert_eq!(
        rerun.totals(EntityKind::AlertConfig),
        OutcomeCounts { created: 0, skipped: 3, failed: 0 }
    );
}

/// A config differing in one field is not a duplicate
#[tokio::test]
async fn test_changed_threshold_is_created() {
    let destination = FakeDeployment::new()
        .with_project("d1", "atlas-prod")
        .with_alert_configs("d1", vec![source_alert("x1", "OPLOG_BEHIND", 1800)]);

    let element = janus::migration::AlertConfigExport {
        project: janus::migration::Project::new("p1", "production"),
        alert_configs: vec![source_alert("a2", "OPLOG_BEHIND", 3600)],
    };
    let mut mapping = ProjectMapping::new();
    mapping.map("p1", "d1");

    let report = orchestrator(&destination, MigrationOptions::default())
        .import_alert_configs(&[element], &mapping)
        .await
        .unwrap();
    assert_eq!(report.totals(EntityKind::AlertConfig).created, 1);
}

/// A record missing a server-assigned field fails alone
#[tokio::test]
async fn test_malformed_record_counted_failed() {
    let mut broken = source_alert("a9", "HOST_DOWN", 0);
    broken.as_object_mut().unwrap().remove("created");

    let element = janus::migration::AlertConfigExport {
        project: janus::migration::Project::new("p1", "production"),
        alert_configs: vec![broken, source_alert("a2", "OPLOG_BEHIND", 3600)],
    };
    let destination = FakeDeployment::new().with_project("p1", "atlas-prod");

    let report = orchestrator(&destination, MigrationOptions::default())
        .import_alert_configs(&[element], &ProjectMapping::same_ids(["p1"]))
        .await
        .unwrap();

    assert_eq!(
        report.totals(EntityKind::AlertConfig),
        OutcomeCounts { created: 1, skipped: 0, failed: 1 }
    );
    assert!(!report.has_project_failures());
}

/// Webhook integrations the destination rejects are failures, not aborts
#[tokio::test]
async fn test_rejected_config_counted_failed() {
    let src = source();
    let exported = orchestrator(&src, MigrationOptions::default())
        .export_alert_configs(&[janus::migration::Project::new("p1", "production")])
        .await;
    let destination = FakeDeployment::new()
        .with_project("p1", "atlas-prod")
        .respond_to_alert("OPLOG_BEHIND", 400);

    let report = orchestrator(&destination, MigrationOptions::default())
        .import_alert_configs(&exported.elements, &ProjectMapping::same_ids(["p1"]))
        .await
        .unwrap();

    assert_eq!(
        report.totals(EntityKind::AlertConfig),
        OutcomeCounts { created: 2, skipped: 0, failed: 1 }
    );
    assert_eq!(destination.posted_alert_configs().len(), 3);
}

/// With stop-on-error the first rejection aborts the import
#[tokio::test]
async fn test_stop_on_error_aborts() {
    let src = source();
    let exported = orchestrator(&src, MigrationOptions::default())
        .export_alert_configs(&[janus::migration::Project::new("p1", "production")])
        .await;
    let destination = FakeDeployment::new()
        .with_project("p1", "atlas-prod")
        .respond_to_alert("HOST_DOWN", 500);

    let options = MigrationOptions { continue_on_error: false, ..MigrationOptions::default() };
    let result = orchestrator(&destination, options)
        .import_alert_configs(&exported.elements, &ProjectMapping::same_ids(["p1"]))
        .await;

    match result {
        Err(MigrationError::RemoteRejected { status, entity, .. }) => {
            assert_eq!(status, 500);
            assert_eq!(entity, "alert config");
        }
        other => panic!("expected RemoteRejected, got {:?}", other.map(|r| r.summary_lines())),
    }
    // HOST_DOWN is first; nothing after it was attempted
    assert_eq!(destination.posted_alert_configs().len(), 1);
}

/// Skipped and unknown destination projects are reported, never imported
#[tokio::test]
async fn test_skipped_and_missing_projects() {
    let src = source();
    let projects = vec![
        janus::migration::Project::new("p1", "production"),
        janus::migration::Project::new("p2", "staging"),
    ];
    let exported = orchestrator(&src, MigrationOptions::default())
        .export_alert_configs(&projects)
        .await;

    let destination = FakeDeployment::new().with_project("d1", "atlas-prod");
    let mut mapping = ProjectMapping::new();
    mapping.skip("p1").map("p2", "does-not-exist");

    let report = orchestrator(&destination, MigrationOptions::default())
        .import_alert_configs(&exported.elements, &mapping)
        .await
        .unwrap();

    assert_eq!(report.skipped_projects.len(), 1);
    assert_eq!(report.skipped_projects[0].id, "p1");
    assert_eq!(report.project_failures.len(), 1);
    assert_eq!(report.project_failures[0].project.id, "p2");
    assert!(report.has_project_failures());
    assert!(destination.posted_alert_configs().is_empty());
}

/// A project whose fetch fails is skipped and the rest still run
#[tokio::test]
async fn test_export_fetch_failure_skips_project() {
    let src = source().failing_project("p1");
    let projects = vec![
        janus::migration::Project::new("p1", "production"),
        janus::migration::Project::new("p2", "staging"),
    ];

    let exported = orchestrator(&src, MigrationOptions::default())
        .export_alert_configs(&projects)
        .await;

    assert_eq!(exported.elements.len(), 1);
    assert_eq!(exported.elements[0].project.id, "p2");
    assert!(exported.report.has_project_failures());
    assert!(exported.report.project_failures[0].reason.contains("500"));
}

/// Duplicate checking can be turned off
#[tokio::test]
async fn test_no_skip_duplicates_posts_everything() {
    let deployment = FakeDeployment::new()
        .with_project("p1", "production")
        .with_alert_configs("p1", vec![source_alert("a1", "HOST_DOWN", 0)]);

    let exported = orchestrator(&deployment, MigrationOptions::default())
        .export_alert_configs(&[janus::migration::Project::new("p1", "production")])
        .await;

    let options = MigrationOptions { skip_duplicates: false, ..MigrationOptions::default() };
    let report = orchestrator(&deployment, options)
        .import_alert_configs(&exported.elements, &ProjectMapping::same_ids(["p1"]))
        .await
        .unwrap();

    assert_eq!(report.totals(EntityKind::AlertConfig).created, 1);
    assert_eq!(deployment.alert_configs_in("p1").len(), 2);
    assert_eq!(deployment.posted_alert_configs()[0]["eventTypeName"], json!("HOST_DOWN"));
}
