/*!
 * Tests for ISO language code utilities
 */

use scriptprep::language_utils::{
    get_language_name, language_codes_match, normalize_language_code, validate_language_code,
    LanguageCodeType,
};

#[test]
fn test_validateLanguageCode_withEachCodeType_shouldClassify() {
    assert_eq!(validate_language_code("en").unwrap(), LanguageCodeType::Part1);
    assert_eq!(validate_language_code("fra").unwrap(), LanguageCodeType::Part2T);
    assert_eq!(validate_language_code("fre").unwrap(), LanguageCodeType::Part2B);
    assert_eq!(validate_language_code(" DE ").unwrap(), LanguageCodeType::Part1);
}

#[test]
fn test_validateLanguageCode_withInvalidCodes_shouldFail() {
    assert!(validate_language_code("").is_err());
    assert!(validate_language_code("english").is_err());
    assert!(validate_language_code("not-a-code").is_err());
}

#[test]
fn test_normalizeLanguageCode_shouldPreferTwoLetterForm() {
    assert_eq!(normalize_language_code("fra").unwrap(), "fr");
    assert_eq!(normalize_language_code("ger").unwrap(), "de");
    assert_eq!(normalize_language_code("ES").unwrap(), "es");
}

#[test]
fn test_languageCodesMatch_acrossCodeTypes_shouldMatch() {
    assert!(language_codes_match("en", "eng"));
    assert!(language_codes_match("de", "ger"));
    assert!(!language_codes_match("en", "fr"));
    assert!(!language_codes_match("en", "invalid"));
}

#[test]
fn test_getLanguageName_shouldReturnEnglishName() {
    assert_eq!(get_language_name("de").unwrap(), "German");
    assert_eq!(get_language_name("spa").unwrap(), "Spanish");
    assert!(get_language_name("??").is_err());
}
