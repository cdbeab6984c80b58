/*!
 * Tests for language utility functions
 */

use doctrans::language_utils::{
    LanguageCodeType, get_language_name, language_codes_match, normalize_to_part1_or_part2t,
    normalize_to_part2t, validate_language_code,
};

/// Test validation of language codes
#[test]
fn test_validate_language_code_with_valid_codes_should_return_correct_type() {
    // ISO 639-1 tests
    assert!(matches!(validate_language_code("en").unwrap(), LanguageCodeType::Part1));
    assert!(matches!(validate_language_code("fr").unwrap(), LanguageCodeType::Part1));
    assert!(matches!(validate_language_code("de").unwrap(), LanguageCodeType::Part1));

    // ISO 639-2/T tests
    assert!(matches!(validate_language_code("eng").unwrap(), LanguageCodeType::Part2T));
    assert!(matches!(validate_language_code("fra").unwrap(), LanguageCodeType::Part2T));
    assert!(matches!(validate_language_code("deu").unwrap(), LanguageCodeType::Part2T));

    // ISO 639-2/B tests
    assert!(matches!(validate_language_code("fre").unwrap(), LanguageCodeType::Part2B));
    assert!(matches!(validate_language_code("ger").unwrap(), LanguageCodeType::Part2B));

    // Whitespace and case tests
    assert!(matches!(validate_language_code(" EN ").unwrap(), LanguageCodeType::Part1));
    assert!(matches!(validate_language_code("ENG").unwrap(), LanguageCodeType::Part2T));

    // Invalid codes
    assert!(validate_language_code("xyz").is_err());
    assert!(validate_language_code("123").is_err());
    assert!(validate_language_code("e").is_err());
}

/// Test normalization of language codes to ISO 639-2/T format
#[test]
fn test_normalize_to_part2t_with_valid_codes_should_normalize_correctly() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("fr").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("eng").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("fra").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("ger").unwrap(), "deu");

    // Case insensitivity
    assert_eq!(normalize_to_part2t("EN").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("FRE").unwrap(), "fra");

    // Whitespace
    assert_eq!(normalize_to_part2t(" en ").unwrap(), "eng");
}

/// Test matching of different language code formats
#[test]
fn test_language_codes_match_with_matching_codes_should_return_true() {
    assert!(language_codes_match("en", "eng"));
    assert!(language_codes_match("eng", "en"));
    assert!(language_codes_match("eng", "eng"));
    assert!(language_codes_match("fr", "fra"));
    assert!(language_codes_match("fr", "fre"));
    assert!(language_codes_match("fra", "fre"));

    // Case insensitivity
    assert!(language_codes_match("EN", "eng"));
    assert!(language_codes_match("EN", "ENG"));

    // Whitespace
    assert!(language_codes_match(" en ", "eng"));

    // Non-matches
    assert!(!language_codes_match("en", "fra"));
    assert!(!language_codes_match("eng", "fre"));
}

/// Test retrieval of language names from codes
#[test]
fn test_get_language_name_with_valid_codes_should_return_correct_name() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("eng").unwrap(), "English");
    assert_eq!(get_language_name("fr").unwrap(), "French");
    assert_eq!(get_language_name("fra").unwrap(), "French");
    assert_eq!(get_language_name("fre").unwrap(), "French");

    // Invalid codes
    assert!(get_language_name("xyz").is_err());
}

/// Engines receive 2-letter codes whenever one exists
#[test]
fn test_normalize_to_part1_or_part2t_with_mixed_codes_should_prefer_two_letters() {
    assert_eq!(normalize_to_part1_or_part2t("spa").unwrap(), "es");
    assert_eq!(normalize_to_part1_or_part2t("ger").unwrap(), "de");
    assert_eq!(normalize_to_part1_or_part2t("fr").unwrap(), "fr");
    // No ISO 639-1 code for Hawaiian
    assert_eq!(normalize_to_part1_or_part2t("haw").unwrap(), "haw");
    assert!(normalize_to_part1_or_part2t("zz").is_err());
}
