/*!
 * Tests for application controller functionality
 */

use anyhow::Result;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use doctrans::app_config::Config;
use doctrans::app_controller::{Controller, FileStatus, FolderSummary};
use doctrans::providers::Provider;
use doctrans::providers::mock::MockProvider;
use doctrans::session::CheckpointStore;
use crate::common;

fn mock_controller(config: Config, provider: MockProvider) -> Result<Controller> {
    let provider: Arc<dyn Provider> = Arc::new(provider);
    Controller::with_provider(config, provider)
}

/// Test creating a controller with the default configuration
#[test]
fn test_new_for_test_with_default_config_should_be_initialized() -> Result<()> {
    let controller = Controller::new_for_test()?;
    assert!(controller.is_initialized());
    assert_eq!(controller.config().source_language, "en");
    assert_eq!(controller.config().target_language, "es");
    Ok(())
}

/// Test a controller without languages reports it is not ready
#[test]
fn test_is_initialized_with_empty_language_should_be_false() -> Result<()> {
    let mut config = Config::default();
    config.target_language.clear();
    let controller = Controller::with_config(config)?;
    assert!(!controller.is_initialized());
    Ok(())
}

/// Test output filename formatting
#[test]
fn test_default_output_path_with_various_inputs_should_format_correctly() -> Result<()> {
    let controller = Controller::new_for_test()?;

    let cases = [
        ("report.docx", "report.es.docx"),
        ("path/to/notes.json", "path/to/notes.es.json"),
        ("with spaces.DOCX", "with spaces.es.docx"),
    ];
    for (input, expected) in cases {
        assert_eq!(controller.default_output_path(Path::new(input))?, Path::new(expected));
    }

    assert!(controller.default_output_path(Path::new("notes.txt")).is_err());
    Ok(())
}

/// Jobs carry the configured languages and skip pages
#[test]
fn test_build_job_with_skip_pages_should_copy_configuration() -> Result<()> {
    let mut config = Config::default();
    config.source_language = "de".to_string();
    config.document.skip_pages = vec![3, 1, 3];
    let controller = Controller::with_config(config)?;

    let job = controller.build_job(Path::new("a.docx"), Path::new("a.es.docx"));
    assert_eq!(job.source_language, "de");
    assert_eq!(job.target_language, "es");
    assert_eq!(job.skip_pages.into_iter().collect::<Vec<_>>(), vec![1, 3]);
    Ok(())
}

/// Test a single file run writes the default output
#[tokio::test]
async fn test_run_with_json_document_should_write_translated_output() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::write_json_document(temp_dir.path(), "doc.json", &common::document_with_table(2))?;
    let controller = mock_controller(Config::default(), MockProvider::working())?;

    let status = controller.run(input.clone(), None, false, false).await?;

    let report = match status {
        FileStatus::Translated(report) => report,
        other => panic!("unexpected status: {:?}", other),
    };
    assert_eq!(report.translated, 4);

    let output = temp_dir.path().join("doc.es.json");
    let translated = common::read_document(&output)?;
    assert_eq!(
        common::paragraph_texts(&translated),
        vec!["P1", "P2", "LEFT CELL", "RIGHT CELL"]
    );
    assert!(!CheckpointStore::for_output(&output).exists());
    Ok(())
}

/// Finished outputs are not overwritten without force
#[tokio::test]
async fn test_run_with_existing_output_should_skip_unless_forced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::write_json_document(temp_dir.path(), "doc.json", &common::document_with_table(1))?;
    let output = temp_dir.path().join("custom.json");
    fs::write(&output, "{}")?;

    let controller = mock_controller(Config::default(), MockProvider::working())?;

    let status = controller.run(input.clone(), Some(output.clone()), false, false).await?;
    assert!(matches!(status, FileStatus::Skipped));
    assert_eq!(fs::read_to_string(&output)?, "{}");

    let status = controller.run(input, Some(output.clone()), true, false).await?;
    assert!(matches!(status, FileStatus::Translated(_)));
    assert_eq!(common::paragraph_texts(&common::read_document(&output)?)[0], "P1");
    Ok(())
}

/// A failed run leaves a checkpoint that the next run resumes from
#[tokio::test]
async fn test_run_after_failure_should_resume_from_checkpoint() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::write_json_document(temp_dir.path(), "doc.json", &common::document_with_table(3))?;
    let output = temp_dir.path().join("doc.es.json");

    let failing = mock_controller(Config::default(), MockProvider::fail_on_text("p3"))?;
    let error = failing.run(input.clone(), None, false, false).await.unwrap_err();
    assert!(format!("{:#}", error).contains("paragraph 3"));
    assert_eq!(CheckpointStore::for_output(&output).load(), 2);

    let provider = Arc::new(MockProvider::working());
    let shared: Arc<dyn Provider> = provider.clone();
    let controller = Controller::with_provider(Config::default(), shared)?;
    let status = controller.run(input, None, false, false).await?;

    match status {
        FileStatus::Translated(report) => {
            assert_eq!(report.resumed_from, 2);
            assert_eq!(report.translated, 3);
        }
        other => panic!("unexpected status: {:?}", other),
    }
    assert_eq!(provider.requested_texts(), vec!["p3", "left cell", "right cell"]);
    assert_eq!(
        common::paragraph_texts(&common::read_document(&output)?),
        vec!["P1", "P2", "P3", "LEFT CELL", "RIGHT CELL"]
    );
    Ok(())
}

/// --restart throws saved progress away
#[tokio::test]
async fn test_run_with_restart_should_ignore_checkpoint() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::write_json_document(temp_dir.path(), "doc.json", &common::document_with_table(2))?;
    let output = temp_dir.path().join("doc.es.json");
    CheckpointStore::for_output(&output).save(3)?;

    let controller = mock_controller(Config::default(), MockProvider::working())?;
    let status = controller.run(input, None, false, true).await?;

    match status {
        FileStatus::Translated(report) => {
            assert_eq!(report.resumed_from, 0);
            assert_eq!(report.translated, 4);
        }
        other => panic!("unexpected status: {:?}", other),
    }
    Ok(())
}

/// --restart on a partly translated output starts over instead of skipping it
#[tokio::test]
async fn test_run_with_restart_after_failure_should_retranslate_partial_output() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::write_json_document(temp_dir.path(), "doc.json", &common::document_with_table(3))?;
    let output = temp_dir.path().join("doc.es.json");

    let failing = mock_controller(Config::default(), MockProvider::fail_on_text("p3"))?;
    assert!(failing.run(input.clone(), None, false, false).await.is_err());
    assert!(output.exists());
    assert_eq!(CheckpointStore::for_output(&output).load(), 2);

    let provider = Arc::new(MockProvider::prefixed());
    let shared: Arc<dyn Provider> = provider.clone();
    let controller = Controller::with_provider(Config::default(), shared)?;
    let status = controller.run(input, None, false, true).await?;

    match status {
        FileStatus::Translated(report) => {
            assert_eq!(report.resumed_from, 0);
            assert_eq!(report.translated, 5);
        }
        other => panic!("unexpected status: {:?}", other),
    }
    assert_eq!(provider.request_count(), 5);
    assert_eq!(
        common::paragraph_texts(&common::read_document(&output)?),
        vec!["[es] p1", "[es] p2", "[es] p3", "[es] left cell", "[es] right cell"]
    );
    assert!(!CheckpointStore::for_output(&output).exists());
    Ok(())
}

/// --restart alone does not overwrite a finished translation
#[tokio::test]
async fn test_run_with_restart_and_finished_output_should_skip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::write_json_document(temp_dir.path(), "doc.json", &common::document_with_table(1))?;
    common::create_test_file(temp_dir.path(), "doc.es.json", "{}")?;

    let controller = mock_controller(Config::default(), MockProvider::working())?;
    let status = controller.run(input, None, false, true).await?;
    assert!(matches!(status, FileStatus::Skipped));
    Ok(())
}

/// Cancelling before the run saves progress and keeps the checkpoint
#[tokio::test]
async fn test_run_with_cancelled_token_should_keep_checkpoint() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::write_json_document(temp_dir.path(), "doc.json", &common::document_with_table(2))?;
    let output = temp_dir.path().join("doc.es.json");

    let controller = mock_controller(Config::default(), MockProvider::working())?;
    controller.cancellation_token().cancel();

    let status = controller.run(input.clone(), None, false, false).await?;
    assert!(matches!(status, FileStatus::Cancelled(_)));
    assert!(output.exists());
    assert!(CheckpointStore::for_output(&output).exists());

    // A pending checkpoint means the output is resumed, not skipped
    let controller = mock_controller(Config::default(), MockProvider::working())?;
    let status = controller.run(input, None, false, false).await?;
    assert!(matches!(status, FileStatus::Translated(_)));
    assert!(!CheckpointStore::for_output(&output).exists());
    Ok(())
}

/// Test missing inputs are reported
#[tokio::test]
async fn test_run_with_missing_input_should_fail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = mock_controller(Config::default(), MockProvider::working())?;

    let result = controller
        .run(temp_dir.path().join("missing.json"), None, false, false)
        .await;
    assert!(result.is_err());
    Ok(())
}

/// Test folder runs translate sources only and count failures
#[tokio::test]
async fn test_run_folder_with_mixed_files_should_summarize() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::write_json_document(root, "a.json", &common::document_with_table(1))?;
    common::write_json_document(root, "b.json", &common::two_page_document())?;
    common::create_test_file(root, "broken.json", "not a document")?;
    common::create_test_file(root, "~$a.json", "lock")?;
    common::create_test_file(root, "readme.txt", "ignored")?;

    let controller = mock_controller(Config::default(), MockProvider::working())?;

    let summary = controller.run_folder(root.to_path_buf(), false, false).await?;
    assert_eq!(
        summary,
        FolderSummary {
            translated: 2,
            skipped: 0,
            failed: 1,
            cancelled: false,
        }
    );
    assert!(root.join("a.es.json").exists());
    assert!(root.join("b.es.json").exists());

    // Outputs are neither translated again nor picked up as inputs
    let summary = controller.run_folder(root.to_path_buf(), false, false).await?;
    assert_eq!(summary.translated, 0);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.failed, 1);
    assert!(!root.join("a.es.es.json").exists());
    Ok(())
}

/// Test an unreachable engine stops the folder run after the first failure
#[tokio::test]
async fn test_run_folder_with_unreachable_engine_should_stop_early() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::write_json_document(root, "a.json", &common::two_page_document())?;
    common::write_json_document(root, "b.json", &common::two_page_document())?;

    let controller = mock_controller(Config::default(), MockProvider::failing())?;
    let summary = controller.run_folder(root.to_path_buf(), false, false).await?;

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.translated, 0);
    assert!(!root.join("b.es.json").exists());
    Ok(())
}

/// Test folder runs need at least one document
#[tokio::test]
async fn test_run_folder_with_no_documents_should_fail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "notes.txt", "x")?;
    let controller = mock_controller(Config::default(), MockProvider::working())?;

    assert!(controller.run_folder(temp_dir.path().to_path_buf(), false, false).await.is_err());
    assert!(controller
        .run_folder(temp_dir.path().join("missing"), false, false)
        .await
        .is_err());
    Ok(())
}

/// Test duration formatting
#[test]
fn test_format_duration_with_various_lengths_should_pick_units() {
    assert_eq!(Controller::format_duration(Duration::from_secs(5)), "5s");
    assert_eq!(Controller::format_duration(Duration::from_secs(125)), "2m 5s");
    assert_eq!(Controller::format_duration(Duration::from_secs(3723)), "1h 2m 3s");
}
