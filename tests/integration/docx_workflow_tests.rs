/*!
 * End-to-end tests on Word packages
 */

use anyhow::Result;
use std::sync::Arc;

use doctrans::app_config::Config;
use doctrans::app_controller::{Controller, FileStatus};
use doctrans::document::docx::DOCUMENT_PART;
use doctrans::document::{DocxDocument, TranslatableDocument};
use doctrans::providers::Provider;
use doctrans::providers::mock::MockProvider;
use doctrans::translation::pipeline::{PipelineConfig, TranslationJob, TranslationPipeline};
use crate::common;

/// Cover page, a second page with a styled paragraph, and a table
const REPORT_BODY: &str = concat!(
    r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>Annual report</w:t></w:r></w:p>"#,
    r#"<w:p><w:r><w:t>Company name</w:t></w:r></w:p>"#,
    r#"<w:p><w:r><w:lastRenderedPageBreak/><w:t xml:space="preserve">Results </w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t>improved</w:t></w:r></w:p>"#,
    r#"<w:p/>"#,
    r#"<w:tbl><w:tblPr/><w:tr><w:tc><w:p><w:r><w:t>Revenue</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>Costs</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
    r#"<w:sectPr/>"#,
);

/// Test a full translation keeps markup and untouched package parts
#[tokio::test]
async fn test_pipeline_with_docx_should_rewrite_runs_and_keep_markup() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::build_docx(temp_dir.path(), "report.docx", REPORT_BODY)?;
    let output = temp_dir.path().join("report.es.docx");

    let pipeline = TranslationPipeline::new(PipelineConfig::default(), MockProvider::working());
    let report = pipeline
        .process(&TranslationJob::new(&input, &output, "en", "es"), None, None)
        .await?;

    assert_eq!(report.total_paragraphs, 6);
    assert_eq!(report.translated, 5);
    assert_eq!(report.blank, 1);

    let translated = common::read_document(&output)?;
    assert_eq!(
        common::paragraph_texts(&translated),
        vec!["ANNUAL REPORT", "COMPANY NAME", "RESULTS IMPROVED", "", "REVENUE", "COSTS"]
    );

    let xml = common::read_package_entry(&output, DOCUMENT_PART)?;
    assert!(xml.contains(r#"<w:jc w:val="center"/>"#));
    assert!(xml.contains("<w:b/>"));
    assert!(xml.contains("<w:i/>"));
    assert!(xml.contains("<w:lastRenderedPageBreak/>"));
    assert!(xml.contains("<w:tblPr/>"));
    assert!(xml.contains("<w:sectPr/>"));
    assert!(xml.contains(r#"<w:t xml:space="preserve">RESULTS </w:t>"#));
    assert_eq!(common::read_package_entry(&output, "word/styles.xml")?, "<w:styles/>");
    Ok(())
}

/// Test the cover page is detected from rendered page breaks in a package
#[tokio::test]
async fn test_pipeline_with_docx_and_skipped_cover_should_leave_first_page() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::build_docx(temp_dir.path(), "report.docx", REPORT_BODY)?;
    let output = temp_dir.path().join("report.es.docx");

    let pipeline = TranslationPipeline::new(PipelineConfig::default(), MockProvider::working());
    let report = pipeline
        .process(
            &TranslationJob::new(&input, &output, "en", "es").with_skip_pages([1]),
            None,
            None,
        )
        .await?;

    assert_eq!(report.skipped_pages, 2);
    assert_eq!(report.translated, 3);
    assert_eq!(
        common::paragraph_texts(&common::read_document(&output)?),
        vec!["Annual report", "Company name", "RESULTS IMPROVED", "", "REVENUE", "COSTS"]
    );
    Ok(())
}

/// Resuming a package gives the same bytes of document.xml as a clean run
#[tokio::test]
async fn test_pipeline_with_docx_after_failure_should_resume_to_identical_output() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let input = common::build_docx(temp_dir.path(), "report.docx", REPORT_BODY)?;

    let reference = temp_dir.path().join("reference.docx");
    TranslationPipeline::new(PipelineConfig::default(), MockProvider::working())
        .process(&TranslationJob::new(&input, &reference, "en", "es"), None, None)
        .await?;

    let output = temp_dir.path().join("report.es.docx");
    let job = TranslationJob::new(&input, &output, "en", "es");
    let failed = TranslationPipeline::new(PipelineConfig::default(), MockProvider::fail_on_text("Revenue"))
        .process(&job, None, None)
        .await;
    assert!(failed.is_err());
    assert_eq!(job.checkpoint().load(), 4);

    let resumed = TranslationPipeline::new(PipelineConfig::default(), MockProvider::working());
    let report = resumed.process(&job, None, None).await?;
    assert_eq!(report.resumed_from, 4);
    assert_eq!(resumed.provider().requested_texts(), vec!["Revenue", "Costs"]);

    assert_eq!(
        common::read_package_entry(&output, DOCUMENT_PART)?,
        common::read_package_entry(&reference, DOCUMENT_PART)?
    );
    Ok(())
}

/// Opening a package and saving it unchanged keeps the document part intact
#[test]
fn test_docx_save_without_changes_should_keep_document_part() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::build_docx(temp_dir.path(), "plain.docx", REPORT_BODY)?;
    let copy = temp_dir.path().join("copy.docx");

    let document = DocxDocument::open(&input)?;
    document.save(&copy)?;

    assert_eq!(
        common::read_package_entry(&copy, DOCUMENT_PART)?,
        common::read_package_entry(&input, DOCUMENT_PART)?
    );
    Ok(())
}

/// Test the controller names docx outputs after the target language
#[tokio::test]
async fn test_controller_with_docx_input_should_write_default_output() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::build_docx(temp_dir.path(), "report.docx", REPORT_BODY)?;

    let mut config = Config::default();
    config.target_language = "fr".to_string();
    config.document.skip_pages = vec![1];
    let provider: Arc<dyn Provider> = Arc::new(MockProvider::prefixed());
    let controller = Controller::with_provider(config, provider)?;

    let status = controller.run(input, None, false, false).await?;
    assert!(matches!(status, FileStatus::Translated(_)));

    let output = temp_dir.path().join("report.fr.docx");
    let texts = common::paragraph_texts(&common::read_document(&output)?);
    assert_eq!(texts[0], "Annual report");
    assert_eq!(texts[2], "[fr] Results [fr] improved");
    Ok(())
}
