/*!
 * Integration tests for application lifecycle
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;

use doctrans::app_config::Config;
use doctrans::app_controller::{Controller, FolderSummary};
use doctrans::providers::Provider;
use doctrans::providers::mock::MockProvider;
use doctrans::session::CheckpointStore;
use crate::common;

const CONFIG_JSON: &str = r#"{
    "source_language": "en",
    "target_language": "de",
    "translation": {
        "engine": "mymemory",
        "available_engines": [{ "type": "mymemory", "max_chars_per_request": 50 }]
    },
    "document": { "skip_pages": [1] },
    "log_level": "debug"
}"#;

/// Test the controller initialization with a configuration read from disk
#[test]
fn test_controller_initialization_with_config_file_should_succeed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", CONFIG_JSON)?;

    let config: Config = serde_json::from_str(&fs::read_to_string(path)?)?;
    config.validate()?;

    let controller = Controller::with_config(config)?;
    assert!(controller.is_initialized());
    assert_eq!(controller.config().translation.get_max_chars_per_request(), 50);
    assert_eq!(controller.config().document.skip_page_set().len(), 1);
    Ok(())
}

/// Test a folder of mixed documents survives an engine outage
#[tokio::test]
async fn test_folder_workflow_with_engine_outage_should_resume_on_next_run() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    fs::create_dir(root.join("nested"))?;
    common::write_json_document(root, "a.json", &common::two_page_document())?;
    common::build_docx(
        &root.join("nested"),
        "b.docx",
        concat!(
            r#"<w:p><w:r><w:t>Title</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:br w:type="page"/><w:t>Hello</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>Goodbye</w:t></w:r></w:p>"#,
        ),
    )?;

    let config: Config = serde_json::from_str(CONFIG_JSON)?;

    // The engine refuses one paragraph in each document
    let outage: Arc<dyn Provider> = Arc::new(MockProvider::fail_on_text("o"));
    let controller = Controller::with_provider(config.clone(), outage)?;
    let summary = controller.run_folder(root.to_path_buf(), false, false).await?;
    assert_eq!(
        summary,
        FolderSummary {
            translated: 0,
            skipped: 0,
            failed: 2,
            cancelled: false,
        }
    );
    assert!(CheckpointStore::for_output(&root.join("a.de.json")).exists());
    assert!(CheckpointStore::for_output(&root.join("nested/b.de.docx")).exists());

    // Pending checkpoints make the next run resume instead of skip
    let working: Arc<dyn Provider> = Arc::new(MockProvider::working());
    let controller = Controller::with_provider(config, working)?;
    let summary = controller.run_folder(root.to_path_buf(), false, false).await?;
    assert_eq!(summary.translated, 2);
    assert_eq!(summary.failed, 0);

    assert_eq!(
        common::paragraph_texts(&common::read_document(&root.join("a.de.json"))?),
        vec!["Cover title", "Cover subtitle", "Cover author", "CHAPTER ONE", "BODY TEXT"]
    );
    assert_eq!(
        common::paragraph_texts(&common::read_document(&root.join("nested/b.de.docx"))?),
        vec!["Title", "HELLO", "GOODBYE"]
    );
    assert!(!CheckpointStore::for_output(&root.join("a.de.json")).exists());
    Ok(())
}
