//! Deploy command unit tests

use std::path::Path;
use std::time::Duration;

use tokio_test::{assert_err, assert_ok};

use mtadeploy::app::options::DeployOptions;
use mtadeploy::deploy::archive::LocalArtifact;
use mtadeploy::deploy::monitor;
use mtadeploy::deploy::{DeployCommand, DeployRequest, LaunchRequest};
use mtadeploy::errors::DeployError;
use mtadeploy::models::{Action, FileSlot, OperationFilter, OperationState, UploadedFile};
use mtadeploy::terminal::Terminal;

use crate::fake_backend::{operation, target, write_mtar, Call, FakeBackend, MTA_ID, SPACE_GUID};

fn monitor_options() -> monitor::Options {
    monitor::Options {
        interval: Duration::ZERO,
        ..Default::default()
    }
}

fn launch(archive: &Path, extension: Option<&Path>, force: bool) -> DeployRequest {
    DeployRequest::Launch(LaunchRequest {
        archive: archive.to_path_buf(),
        extension_descriptor: extension.map(Path::to_path_buf),
        options: DeployOptions {
            force,
            ..Default::default()
        },
    })
}

fn deploying_line(archive: &Path) -> String {
    format!(
        "Deploying multi-target app archive {} in org acme / space dev as jane...",
        archive.display()
    )
}

fn finishing_backend() -> FakeBackend {
    FakeBackend::new().with_script(&[
        (OperationState::Running, "Staging web\n"),
        (OperationState::Finished, "Application web started\n"),
    ])
}

#[tokio::test]
async fn test_deploy_archive() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_mtar(dir.path(), "app.mtar");
    let backend = finishing_backend();
    let (mut terminal, output) = Terminal::captured();

    let command = DeployCommand::new(&backend, target(), monitor_options());
    assert_ok!(command.execute(launch(&archive, None, false), &mut terminal).await);

    assert_eq!(
        output.lines(),
        vec![
            deploying_line(&archive),
            "Uploading 1 files...".to_string(),
            format!("  {}", archive.display()),
            "OK".to_string(),
            "Starting deployment process...".to_string(),
            "OK".to_string(),
            "Monitoring process execution...".to_string(),
            "Staging web".to_string(),
            "Application web started".to_string(),
            "Process finished.".to_string(),
        ]
    );

    let params = backend.started_parameters().unwrap();
    assert_eq!(params.get("appArchiveId"), Some("file-1"));
    assert_eq!(params.get("mtaExtDescriptorId"), None);
    assert_eq!(params.get("targetPlatform"), Some("acme dev"));
    assert_eq!(params.get("versionRule"), Some("SAME_HIGHER"));

    assert!(backend.calls().contains(&Call::ListOperations(OperationFilter {
        space_id: Some(SPACE_GUID.to_string()),
        mta_id: Some(MTA_ID.to_string()),
        active_only: true,
    })));
}

#[tokio::test]
async fn test_deploy_with_extension_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_mtar(dir.path(), "app.mtar");
    let extension = dir.path().join("dev.mtaext");
    std::fs::write(&extension, "_schema-version: '3.1'\nextends: com.example.shop\n").unwrap();
    let backend = finishing_backend();
    let (mut terminal, output) = Terminal::captured();

    let command = DeployCommand::new(&backend, target(), monitor_options());
    assert_ok!(
        command
            .execute(launch(&archive, Some(&extension), false), &mut terminal)
            .await
    );

    assert_eq!(backend.uploads(), vec!["app.mtar", "dev.mtaext"]);
    let lines = output.lines();
    let upload_blocks = lines.iter().filter(|l| *l == "Uploading 1 files...").count();
    assert_eq!(upload_blocks, 2);
    assert_eq!(lines[2], format!("  {}", archive.display()));
    assert_eq!(lines[5], format!("  {}", extension.display()));

    let params = backend.started_parameters().unwrap();
    assert_eq!(params.get("appArchiveId"), Some("file-1"));
    assert_eq!(params.get("mtaExtDescriptorId"), Some("file-2"));
}

#[tokio::test]
async fn test_force_aborts_conflicting_operations() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_mtar(dir.path(), "app.mtar");
    let backend = finishing_backend().with_ongoing(vec![
        operation("op-1", OperationState::Running, MTA_ID, true),
        operation("op-2", OperationState::Error, MTA_ID, true),
        operation("op-3", OperationState::Running, MTA_ID, false),
        operation("op-4", OperationState::Running, "com.example.other", true),
    ]);
    let (mut terminal, output) = Terminal::captured();

    let command = DeployCommand::new(&backend, target(), monitor_options());
    assert_ok!(command.execute(launch(&archive, None, true), &mut terminal).await);

    assert_eq!(
        backend.submitted_actions(),
        vec![
            ("op-1".to_string(), Action::Abort),
            ("op-2".to_string(), Action::Abort),
        ]
    );
    let lines = output.lines();
    assert_eq!(
        lines[1..6],
        [
            "Aborting multi-target app operation with id op-1...".to_string(),
            "OK".to_string(),
            "Aborting multi-target app operation with id op-2...".to_string(),
            "OK".to_string(),
            "Uploading 1 files...".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_conflicts_left_alone_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_mtar(dir.path(), "app.mtar");
    let backend = finishing_backend().with_ongoing(vec![operation(
        "op-1",
        OperationState::Running,
        MTA_ID,
        true,
    )]);
    let (mut terminal, output) = Terminal::captured();

    let command = DeployCommand::new(&backend, target(), monitor_options());
    assert_ok!(command.execute(launch(&archive, None, false), &mut terminal).await);

    assert!(backend.submitted_actions().is_empty());
    assert!(!output.contents().contains("Aborting"));
    assert_eq!(output.lines()[1], "Uploading 1 files...");
}

#[tokio::test]
async fn test_ongoing_operations_failure_stops_before_upload() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_mtar(dir.path(), "app.mtar");
    let backend = finishing_backend().failing_list_operations("connection refused");
    let (mut terminal, output) = Terminal::captured();

    let command = DeployCommand::new(&backend, target(), monitor_options());
    let err = assert_err!(command.execute(launch(&archive, None, true), &mut terminal).await);

    assert_eq!(
        err.to_string(),
        "Could not get ongoing operation: connection refused"
    );
    assert!(backend.uploads().is_empty());
    assert!(backend.started_parameters().is_none());
    assert_eq!(output.lines(), vec![deploying_line(&archive)]);
}

#[tokio::test]
async fn test_missing_archive_makes_no_backend_calls() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("non-existing-mtar.mtar");
    let backend = finishing_backend();
    let (mut terminal, output) = Terminal::captured();

    let command = DeployCommand::new(&backend, target(), monitor_options());
    let err = assert_err!(command.execute(launch(&archive, None, false), &mut terminal).await);

    assert!(matches!(err, DeployError::FileNotFound(_)));
    assert_eq!(
        err.to_string(),
        format!("Could not find file {}", archive.display())
    );
    assert!(backend.calls().is_empty());
    assert_eq!(output.lines(), vec![deploying_line(&archive)]);
}

#[tokio::test]
async fn test_missing_extension_descriptor_makes_no_backend_calls() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_mtar(dir.path(), "app.mtar");
    let extension = dir.path().join("missing.mtaext");
    let backend = finishing_backend();
    let (mut terminal, _output) = Terminal::captured();

    let command = DeployCommand::new(&backend, target(), monitor_options());
    let err = assert_err!(
        command
            .execute(launch(&archive, Some(&extension), false), &mut terminal)
            .await
    );

    assert!(matches!(err, DeployError::FileNotFound(_)));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_identical_file_is_not_uploaded_again() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_mtar(dir.path(), "app.mtar");
    let local = LocalArtifact::read(&archive, FileSlot::Archive).await.unwrap();
    let backend = finishing_backend().with_service_file(UploadedFile {
        id: "stored-archive".to_string(),
        file_name: "app.mtar".to_string(),
        digest: local.digest.to_lowercase(),
        digest_algorithm: "SHA-256".to_string(),
    });
    let (mut terminal, output) = Terminal::captured();

    let command = DeployCommand::new(&backend, target(), monitor_options());
    assert_ok!(command.execute(launch(&archive, None, false), &mut terminal).await);

    assert!(backend.uploads().is_empty());
    let params = backend.started_parameters().unwrap();
    assert_eq!(params.get("appArchiveId"), Some("stored-archive"));
    assert_eq!(output.lines()[3], "OK");
}

#[tokio::test]
async fn test_failed_process_reports_failure() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_mtar(dir.path(), "app.mtar");
    let backend = FakeBackend::new().with_script(&[
        (OperationState::Running, "Staging web\n"),
        (OperationState::Error, "Service broker error\n"),
    ]);
    let (mut terminal, output) = Terminal::captured();

    let command = DeployCommand::new(&backend, target(), monitor_options());
    let err = assert_err!(command.execute(launch(&archive, None, false), &mut terminal).await);

    assert!(matches!(
        err,
        DeployError::OperationFailed {
            state: OperationState::Error,
            ..
        }
    ));
    let lines = output.lines();
    assert!(lines.contains(&"Service broker error".to_string()));
    assert!(lines.contains(&"Process finished.".to_string()));
    assert!(lines.contains(
        &"Use \"mtadeploy -i op-launched -a retry\" to retry the process.".to_string()
    ));
}

#[tokio::test]
async fn test_upload_failure_stops_before_start() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_mtar(dir.path(), "app.mtar");
    let backend = finishing_backend().failing_upload("disk quota exceeded");
    let (mut terminal, output) = Terminal::captured();

    let command = DeployCommand::new(&backend, target(), monitor_options());
    let err = assert_err!(command.execute(launch(&archive, None, false), &mut terminal).await);

    assert_eq!(
        err.to_string(),
        "Could not upload file app.mtar: disk quota exceeded"
    );
    assert!(backend.started_parameters().is_none());
    assert_eq!(
        output.lines(),
        vec![
            deploying_line(&archive),
            "Uploading 1 files...".to_string(),
            format!("  {}", archive.display()),
        ]
    );
}

#[tokio::test]
async fn test_start_failure_is_reported_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_mtar(dir.path(), "app.mtar");
    let backend = finishing_backend().failing_start("service unavailable");
    let (mut terminal, output) = Terminal::captured();

    let command = DeployCommand::new(&backend, target(), monitor_options());
    let err = assert_err!(command.execute(launch(&archive, None, false), &mut terminal).await);

    assert!(matches!(err, DeployError::Backend(ref message) if message == "service unavailable"));
    assert_eq!(backend.uploads(), vec!["app.mtar"]);
    let lines = output.lines();
    assert_eq!(lines.last().unwrap(), "Starting deployment process...");
    assert!(!lines.contains(&"Monitoring process execution...".to_string()));
    assert!(!backend
        .calls()
        .iter()
        .any(|call| matches!(call, Call::GetOperation(_))));
}

#[tokio::test]
async fn test_relative_archive_path_is_echoed_as_given() {
    let archive = Path::new("non-existing-mtar.mtar");
    let backend = finishing_backend();
    let (mut terminal, output) = Terminal::captured();

    let command = DeployCommand::new(&backend, target(), monitor_options());
    let err = assert_err!(command.execute(launch(archive, None, false), &mut terminal).await);

    assert_eq!(
        output.lines(),
        vec!["Deploying multi-target app archive non-existing-mtar.mtar in org acme / space dev as jane..."]
    );
    let absolute = std::env::current_dir().unwrap().join(archive);
    assert_eq!(
        err.to_string(),
        format!("Could not find file {}", absolute.display())
    );
    assert!(backend.calls().is_empty());
}
