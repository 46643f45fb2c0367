/*!
 * Tests for the glossary substitution engine
 */

use chapterwai::errors::GlossaryError;
use chapterwai::translation::glossary::find_residual_markers;
use chapterwai::translation::{GlossaryMap, map_terms, restore_terms};

fn names() -> GlossaryMap {
    GlossaryMap::from_pairs([("张三", "Zhang San"), ("李四", "Li Si")]).unwrap()
}

/// Text without any glossary term passes through mapping unchanged
#[test]
fn test_mapTerms_withNoOccurrences_shouldReturnTextUnchanged() {
    let text = "王五独自上山。";

    let mapped = map_terms(text, &names());

    assert_eq!(mapped.text, text);
    assert_eq!(mapped.markers.len(), 2);
    assert_eq!(mapped.substitution_count(), 0);
}

/// Empty text and empty glossary are both accepted
#[test]
fn test_mapTerms_withEmptyInputs_shouldBeIdentity() {
    assert_eq!(map_terms("", &names()).text, "");

    let mapped = map_terms("张三", &GlossaryMap::new());
    assert_eq!(mapped.text, "张三");
    assert!(mapped.markers.is_empty());
}

/// The canonical round trip with a provider that leaves tokens alone
#[test]
fn test_mapThenRestore_withPreservedTokens_shouldContainTargetTerms() {
    let mapped = map_terms("张三与李四同行", &names());

    assert!(!mapped.text.contains("张三"));
    assert!(!mapped.text.contains("李四"));

    let restored = restore_terms(&mapped.text, &mapped.markers);

    assert!(restored.contains("Zhang San"));
    assert!(restored.contains("Li Si"));
    assert!(find_residual_markers(&restored).is_empty());
}

/// Every occurrence of a term is replaced, not just the first
#[test]
fn test_mapTerms_withRepeatedTerm_shouldReplaceEveryOccurrence() {
    let mapped = map_terms("张三说，张三来了。", &names());
    let token = &mapped.markers[0].token;

    assert_eq!(mapped.text.matches(token.as_str()).count(), 2);
    assert_eq!(mapped.restore(&mapped.text), "Zhang San说，Zhang San来了。");
}

/// Restoring twice changes nothing the second time
#[test]
fn test_restoreTerms_calledTwice_shouldBeIdempotent() {
    let mapped = map_terms("张三与李四同行", &names());

    let once = restore_terms(&mapped.text, &mapped.markers);
    let twice = restore_terms(&once, &mapped.markers);

    assert_eq!(once, twice);
}

/// Regex metacharacters in a term only match themselves
#[test]
fn test_mapTerms_withRegexSpecialCharacters_shouldMatchLiterally() {
    let glossary = GlossaryMap::from_pairs([("a.b", "DOT"), ("(x)", "PAREN")]).unwrap();

    let mapped = map_terms("axb a.b (x) x", &glossary);
    let restored = mapped.restore(&mapped.text);

    assert_eq!(restored, "axb DOT PAREN x");
}

/// A later term that overlaps an earlier one never touches its token
#[test]
fn test_mapTerms_withOverlappingTerms_shouldHonorGlossaryOrder() {
    let glossary = GlossaryMap::from_pairs([("青云山", "Azure Cloud Mountain"), ("青云", "Azure Cloud")]).unwrap();

    let mapped = map_terms("青云山上有青云门", &glossary);

    assert_eq!(mapped.restore(&mapped.text), "Azure Cloud Mountain上有Azure Cloud门");
}

/// A target term that contains digits cannot be mistaken for a token
#[test]
fn test_mapTerms_withNumericTerms_shouldNotCorruptTokens() {
    let glossary = GlossaryMap::from_pairs([("甲", "Unit 1"), ("1", "one")]).unwrap();

    let mapped = map_terms("甲有1个", &glossary);

    assert_eq!(mapped.restore(&mapped.text), "Unit 1有one个");
}

/// Tokens already present in the source are never reused
#[test]
fn test_mapTerms_withTokenInSource_shouldAllocateFreshToken() {
    let mapped = map_terms("«0» 张三", &names());

    assert_ne!(mapped.markers[0].token, "«0»");
    assert!(mapped.text.starts_with("«0» "));
}

/// Mapping the same input twice yields the same result
#[test]
fn test_mapTerms_shouldBeDeterministic() {
    let first = map_terms("张三与李四同行", &names());
    let second = map_terms("张三与李四同行", &names());

    assert_eq!(first, second);
}

/// A mangled token leaks through and is reported
#[test]
fn test_findResidualMarkers_withDroppedToken_shouldReportIt() {
    let mapped = map_terms("张三与李四同行", &names());
    let provider_output = format!("{} traveled with someone", mapped.markers[0].token);
    let leaked = format!("{} and «9»", provider_output);

    let restored = restore_terms(&leaked, &mapped.markers);

    assert_eq!(find_residual_markers(&restored), vec!["«9»".to_string()]);
}

/// Empty source and target terms are rejected
#[test]
fn test_insert_withEmptyTerms_shouldFail() {
    let mut glossary = GlossaryMap::new();

    assert!(matches!(glossary.insert("  ", "x"), Err(GlossaryError::EmptySourceTerm)));
    assert!(matches!(
        glossary.insert("张三", ""),
        Err(GlossaryError::EmptyTargetTerm { .. })
    ));
    assert!(glossary.is_empty());
}

/// Re-inserting a key replaces the target without reordering
#[test]
fn test_insert_withExistingKey_shouldReplaceInPlace() {
    let mut glossary = names();
    glossary.insert("张三", "Zhang the Third").unwrap();

    let sources: Vec<&str> = glossary.iter().map(|e| e.source.as_str()).collect();

    assert_eq!(sources, vec!["张三", "李四"]);
    assert_eq!(glossary.get("张三"), Some("Zhang the Third"));
}

/// Line format accepts both separators and skips comments
#[test]
fn test_parseLines_withMixedSeparators_shouldParseAllEntries() {
    let content = "# names\n张三 = Zhang San\n\n李四\tLi Si\n";

    let glossary = GlossaryMap::parse_lines(content).unwrap();

    assert_eq!(glossary.len(), 2);
    assert_eq!(glossary.get("李四"), Some("Li Si"));
}

/// Both JSON shapes deserialize into a glossary
#[test]
fn test_deserialize_withListAndObject_shouldAcceptBoth() {
    let list: GlossaryMap =
        serde_json::from_str(r#"[{"source": "张三", "target": "Zhang San"}]"#).unwrap();
    let object: GlossaryMap = serde_json::from_str(r#"{"张三": "Zhang San"}"#).unwrap();

    assert_eq!(list, object);
}
