/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::fs;
use std::path::Path;

use doctrans::file_utils::FileManager;
use crate::common;

/// Test file and directory existence checks
#[test]
fn test_exists_checks_with_files_and_dirs_should_distinguish() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "a.json", "{}")?;

    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::dir_exists(&file));
    assert!(FileManager::dir_exists(temp_dir.path()));
    assert!(!FileManager::file_exists(temp_dir.path()));
    assert!(!FileManager::file_exists(temp_dir.path().join("missing.json")));
    Ok(())
}

/// Test output path generation
#[test]
fn test_generate_output_path_with_various_inputs_should_insert_language() {
    let cases = [
        ("report.docx", "out", "es", "docx", "out/report.es.docx"),
        ("dir/notes.v2.json", "dir", "fr", "json", "dir/notes.v2.fr.json"),
        ("with spaces.docx", "", "de", ".docx", "with spaces.de.docx"),
    ];

    for (input, dir, lang, ext, expected) in cases {
        let output = FileManager::generate_output_path(input, dir, lang, ext);
        assert_eq!(output, Path::new(expected), "input {}", input);
    }
}

/// Outputs are recognised so folder runs do not translate them again
#[test]
fn test_is_translated_output_with_language_suffix_should_match() {
    assert!(FileManager::is_translated_output("report.es.docx", "es"));
    assert!(FileManager::is_translated_output("REPORT.ES.docx", "es"));
    assert!(!FileManager::is_translated_output("report.docx", "es"));
    assert!(!FileManager::is_translated_output("report.fr.docx", "es"));
    assert!(!FileManager::is_translated_output("es.docx", "es"));
}

/// Test recursive search by extension
#[test]
fn test_find_files_with_nested_dirs_should_return_sorted_matches() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    fs::create_dir(root.join("nested"))?;

    common::create_test_file(root, "b.docx", "")?;
    common::create_test_file(root, "a.JSON", "")?;
    common::create_test_file(root, "notes.txt", "")?;
    common::create_test_file(&root.join("nested"), "c.docx", "")?;

    let found = FileManager::find_files(root, &["docx", "json"])?;
    let names: Vec<_> = found
        .iter()
        .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
        .collect();

    assert_eq!(
        names,
        vec![
            Path::new("a.JSON").to_path_buf(),
            Path::new("b.docx").to_path_buf(),
            Path::new("nested/c.docx").to_path_buf(),
        ]
    );
    Ok(())
}

/// Test reading and writing text files, creating parents as needed
#[test]
fn test_write_to_file_with_missing_parent_should_create_it() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("deep/er/file.txt");

    FileManager::write_to_file(&path, "content")?;
    assert_eq!(FileManager::read_to_string(&path)?, "content");
    assert!(FileManager::read_to_string(temp_dir.path().join("none.txt")).is_err());
    Ok(())
}

/// Atomic writes replace content without leaving temporary files behind
#[test]
fn test_write_atomically_with_existing_file_should_replace_content() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "doc.json", "old")?;

    FileManager::write_atomically(&path, b"new content")?;

    assert_eq!(fs::read_to_string(&path)?, "new content");
    let entries = fs::read_dir(temp_dir.path())?.count();
    assert_eq!(entries, 1);
    Ok(())
}

/// Removing a missing file is not an error
#[test]
fn test_remove_if_exists_with_missing_file_should_report_false() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "x.checkpoint", "3")?;

    assert!(FileManager::remove_if_exists(&path)?);
    assert!(!path.exists());
    assert!(!FileManager::remove_if_exists(&path)?);
    Ok(())
}

/// Test ensure_dir is idempotent
#[test]
fn test_ensure_dir_with_existing_dir_should_succeed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().join("a/b");

    FileManager::ensure_dir(&dir)?;
    FileManager::ensure_dir(&dir)?;
    FileManager::ensure_dir("")?;
    assert!(dir.is_dir());
    Ok(())
}
