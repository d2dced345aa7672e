use chrono::{TimeZone, Utc};

use pakt_core::config::DeploySettings;
use pakt_core::deploy::{
    Notice, STAGES, Session, Severity, Stage, Workflow, WorkflowEvent, WorkflowState, transition,
};
use pakt_core::error::{StageFailure, ValidationError, WorkflowError};
use pakt_core::types::{PackageRecord, PackageSource};

fn results() -> Vec<PackageRecord> {
    vec![
        PackageRecord::new(
            "Visual Studio Code",
            "Microsoft.VisualStudioCode",
            "1.95.3",
            PackageSource::Winget,
            Some("Microsoft".to_string()),
        ),
        PackageRecord::new("vscode", "vscode", "1.95.3", PackageSource::Chocolatey, None),
    ]
}

fn step(session: &Session, event: WorkflowEvent) -> (Session, Vec<Notice>) {
    transition(session, event).unwrap()
}

/// Session in `Configuring` with the first result selected.
fn configuring() -> Session {
    let session = Session::new(DeploySettings::default());
    let (session, _) = step(
        &session,
        WorkflowEvent::SearchStarted {
            query: "vscode".to_string(),
        },
    );
    let (session, _) = step(&session, WorkflowEvent::SearchCompleted { results: results() });
    let (session, _) = step(&session, WorkflowEvent::PackageSelected { index: 0 });
    session
}

fn deploying() -> Session {
    step(&configuring(), WorkflowEvent::DeployRequested { gate_ready: true }).0
}

#[test]
fn new_session_starts_searching_and_empty() {
    let session = Session::new(DeploySettings::default());

    assert_eq!(session.state(), WorkflowState::Searching);
    assert!(session.results().is_empty());
    assert!(session.selection().is_none());
    assert!(session.log().is_empty());
    assert_eq!(session.progress().completed, 0);
    assert_eq!(session.progress().total, STAGES.len());
}

#[test]
fn search_events_log_and_store_results() {
    let session = Session::new(DeploySettings::default());

    let (session, notices) = step(
        &session,
        WorkflowEvent::SearchStarted {
            query: " vscode ".to_string(),
        },
    );
    assert_eq!(session.query(), Some("vscode"));
    assert_eq!(notices, vec![Notice::info("Searching for \"vscode\"")]);

    let (session, notices) = step(&session, WorkflowEvent::SearchCompleted { results: results() });
    assert_eq!(session.results().len(), 2);
    assert_eq!(notices, vec![Notice::info("Found 2 package(s)")]);
    assert_eq!(session.state(), WorkflowState::Searching);
}

#[test]
fn search_failure_clears_results_and_logs_error() {
    let session = Session::new(DeploySettings::default());
    let (session, _) = step(
        &session,
        WorkflowEvent::SearchStarted {
            query: "x".to_string(),
        },
    );

    let (session, notices) = step(
        &session,
        WorkflowEvent::SearchFailed {
            reason: "winget search timed out after 30s".to_string(),
        },
    );

    assert!(session.results().is_empty());
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, Severity::Error);
    assert!(notices[0].message.contains("timed out"));
}

#[test]
fn empty_query_is_rejected() {
    let session = Session::new(DeploySettings::default());

    let error = transition(
        &session,
        WorkflowEvent::SearchStarted {
            query: "  ".to_string(),
        },
    )
    .unwrap_err();

    assert_eq!(error, WorkflowError::Validation(ValidationError::EmptyQuery));
}

#[test]
fn results_without_a_search_are_rejected() {
    let session = Session::new(DeploySettings::default());
    let error = transition(&session, WorkflowEvent::SearchCompleted { results: results() });
    assert!(matches!(error, Err(WorkflowError::InvalidTransition { .. })));
}

#[test]
fn selection_creates_config_and_script() {
    let session = configuring();

    assert_eq!(session.state(), WorkflowState::Configuring);
    let record = session.selection().unwrap();
    assert_eq!(record.id, "Microsoft.VisualStudioCode");

    let config = session.config().unwrap();
    assert_eq!(config.app_id, "Microsoft.VisualStudioCode");
    assert_eq!(config.requirements, "Windows 10 1809+");
    assert!(config.silent_install);
    assert!(!config.auto_update);
    assert!(config.target_groups.is_empty());

    assert!(session.script().unwrap().contains("'Microsoft.VisualStudioCode'"));
}

#[test]
fn selection_notice_names_package_and_source() {
    let session = Session::new(DeploySettings::default());
    let (session, _) = step(
        &session,
        WorkflowEvent::SearchStarted {
            query: "vscode".to_string(),
        },
    );
    let (session, _) = step(&session, WorkflowEvent::SearchCompleted { results: results() });

    let (_, notices) = step(&session, WorkflowEvent::PackageSelected { index: 1 });

    assert_eq!(notices, vec![Notice::info("Selected vscode (chocolatey)")]);
}

#[test]
fn out_of_range_selection_is_rejected() {
    let session = Session::new(DeploySettings::default());
    let (session, _) = step(
        &session,
        WorkflowEvent::SearchStarted {
            query: "vscode".to_string(),
        },
    );
    let (session, _) = step(&session, WorkflowEvent::SearchCompleted { results: results() });

    let error = transition(&session, WorkflowEvent::PackageSelected { index: 2 }).unwrap_err();
    assert_eq!(
        error,
        WorkflowError::Validation(ValidationError::SelectionOutOfRange {
            index: 2,
            available: 2
        })
    );

    let empty = Session::new(DeploySettings::default());
    let error = transition(&empty, WorkflowEvent::PackageSelected { index: 0 }).unwrap_err();
    assert_eq!(error, WorkflowError::Validation(ValidationError::NoSelection));
}

#[test]
fn config_update_replaces_config() {
    let session = configuring();
    let updated = session
        .config()
        .cloned()
        .unwrap()
        .with_target_group("Pilot")
        .with_auto_update(true);

    let (session, notices) = step(&session, WorkflowEvent::ConfigUpdated(updated.clone()));

    assert!(notices.is_empty());
    assert_eq!(session.config(), Some(&updated));
}

#[test]
fn closed_gate_keeps_configuring_with_one_error() {
    let session = configuring();

    let (next, notices) = step(&session, WorkflowEvent::DeployRequested { gate_ready: false });

    assert_eq!(next.state(), WorkflowState::Configuring);
    assert_eq!(next.progress().completed, 0);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, Severity::Error);
}

#[test]
fn open_gate_starts_deploying_silently() {
    let (session, notices) = step(&configuring(), WorkflowEvent::DeployRequested { gate_ready: true });

    assert_eq!(session.state(), WorkflowState::Deploying);
    assert!(notices.is_empty());
    assert_eq!(session.next_stage(), Some(Stage::Authenticate));
}

#[test]
fn stages_complete_in_order_to_success() {
    let mut session = deploying();
    let mut all_notices = Vec::new();

    for (i, stage) in STAGES.into_iter().enumerate() {
        assert_eq!(session.state(), WorkflowState::Deploying);
        let (next, notices) = step(&session, WorkflowEvent::StageCompleted { stage });
        assert_eq!(next.progress().completed, i + 1);
        assert_eq!(notices.len(), 1);
        all_notices.extend(notices);
        session = next;
    }

    assert_eq!(session.state(), WorkflowState::Succeeded);
    assert_eq!(session.progress().percent(), 100);
    assert_eq!(all_notices.len(), STAGES.len());
    let successes: Vec<_> = all_notices
        .iter()
        .filter(|n| n.severity == Severity::Success)
        .collect();
    assert_eq!(successes.len(), 1);
    assert_eq!(all_notices.last().unwrap().severity, Severity::Success);
}

#[test]
fn stages_out_of_order_are_rejected() {
    let session = deploying();

    let error = transition(
        &session,
        WorkflowEvent::StageCompleted {
            stage: Stage::Upload,
        },
    );

    assert!(matches!(error, Err(WorkflowError::InvalidTransition { .. })));
}

#[test]
fn stage_failure_returns_to_configuring_with_frozen_progress() {
    let mut session = deploying();
    for stage in [Stage::Authenticate, Stage::Package, Stage::GenerateScript] {
        session = step(&session, WorkflowEvent::StageCompleted { stage }).0;
    }

    let failure = StageFailure::new(Stage::Upload, "Upload quota exceeded");
    let (session, notices) = step(&session, WorkflowEvent::StageFailed(failure.clone()));

    assert_eq!(session.state(), WorkflowState::Configuring);
    assert_eq!(session.progress().completed, 3);
    assert_eq!(session.last_failure(), Some(&failure));
    assert!(session.is_failed());
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, Severity::Error);
    assert!(notices[0].message.contains("Upload quota exceeded"));
}

#[test]
fn retry_after_failure_restarts_progress() {
    let session = deploying();
    let (session, _) = step(
        &session,
        WorkflowEvent::StageFailed(StageFailure::new(Stage::Authenticate, "bad secret")),
    );

    let (session, _) = step(&session, WorkflowEvent::DeployRequested { gate_ready: true });

    assert_eq!(session.state(), WorkflowState::Deploying);
    assert_eq!(session.progress().completed, 0);
    assert!(session.last_failure().is_none());
}

#[test]
fn reset_is_refused_while_deploying() {
    let error = transition(&deploying(), WorkflowEvent::Reset);
    assert!(matches!(error, Err(WorkflowError::InvalidTransition { .. })));
}

#[test]
fn reset_clears_everything() {
    let mut workflow = Workflow::from_session(configuring());
    workflow
        .apply(WorkflowEvent::DeployRequested { gate_ready: false })
        .unwrap();
    assert!(!workflow.log().is_empty());

    workflow.apply(WorkflowEvent::Reset).unwrap();

    let session = workflow.session();
    assert_eq!(session.state(), WorkflowState::Searching);
    assert!(session.query().is_none());
    assert!(session.results().is_empty());
    assert!(session.selection().is_none());
    assert!(session.config().is_none());
    assert!(session.script().is_none());
    assert!(session.log().is_empty());
}

#[test]
fn events_outside_their_state_are_rejected_without_change() {
    let session = configuring();

    for event in [
        WorkflowEvent::SearchStarted {
            query: "git".to_string(),
        },
        WorkflowEvent::StageCompleted {
            stage: Stage::Authenticate,
        },
        WorkflowEvent::PackageSelected { index: 0 },
    ] {
        assert!(matches!(
            transition(&session, event),
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    let searching = Session::new(DeploySettings::default());
    assert!(transition(&searching, WorkflowEvent::DeployRequested { gate_ready: true }).is_err());
}

#[test]
fn workflow_stamps_notices_in_order() {
    let mut workflow = Workflow::new(DeploySettings::default());
    let t1 = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
    let t2 = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 3).unwrap();

    let first = workflow
        .apply_at(
            WorkflowEvent::SearchStarted {
                query: "vscode".to_string(),
            },
            t1,
        )
        .unwrap();
    let second = workflow
        .apply_at(WorkflowEvent::SearchCompleted { results: results() }, t2)
        .unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    let entries = workflow.log().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].timestamp, t1);
    assert_eq!(entries[1].timestamp, t2);
    assert_eq!(entries[1].message, "Found 2 package(s)");
}

#[test]
fn rejected_event_leaves_workflow_unchanged() {
    let before = configuring();
    let mut workflow = Workflow::from_session(before.clone());

    assert!(
        workflow
            .apply(WorkflowEvent::StageCompleted {
                stage: Stage::Finish
            })
            .is_err()
    );

    assert_eq!(workflow.session(), &before);
}

#[test]
fn empty_stage_plan_succeeds_immediately() {
    let session = Session::with_stages(DeploySettings::default(), Vec::new());
    let (session, _) = step(
        &session,
        WorkflowEvent::SearchStarted {
            query: "vscode".to_string(),
        },
    );
    let (session, _) = step(&session, WorkflowEvent::SearchCompleted { results: results() });
    let (session, _) = step(&session, WorkflowEvent::PackageSelected { index: 0 });

    let (session, _) = step(&session, WorkflowEvent::DeployRequested { gate_ready: true });

    assert_eq!(session.state(), WorkflowState::Succeeded);
    assert_eq!(session.progress().total, 0);
    assert!(session.next_stage().is_none());
    assert!(transition(&session, WorkflowEvent::Reset).is_ok());
}
