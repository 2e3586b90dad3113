use std::fs;

use chrono::NaiveDate;
use tempfile::TempDir;

use gita_core::corpus::Corpus;
use gita_core::error::Error;

const MIXED_SCHEMAS: &str = r#"[
  {"chapter_number": 2, "verse_number": 47, "text": "karmaṇy evādhikāras te",
   "translation": "You have the right to perform your actions, but never to the fruits of actions.",
   "transliteration": "karmany evadhikaras te", "word_meanings": "karmaṇi—in prescribed duties"},
  {"chapter_id": 4, "verse_order": 7, "text": "yadā yadā hi dharmasya"},
  {"chapter_number": 0, "chapter_id": 3, "verse_number": 35, "text": "śreyān sva-dharmo", "translation": ""},
  {"text": "no numbering at all"},
  {"chapter_number": 5, "text": "missing verse numbers"},
  {"chapter_number": 6, "verse_number": 1, "translation": "no original text"},
  {"chapter_number": 2, "verse_number": 47, "text": "duplicate"}
]"#;

#[test]
fn normalizes_both_numbering_schemes() {
    let corpus = Corpus::from_json_str(MIXED_SCHEMAS).expect("load");
    assert_eq!(corpus.len(), 3, "malformed and duplicate entries are skipped");

    let first = corpus.get(2, 47).expect("2.47");
    assert_eq!(first.id, "2.47");
    assert_eq!(first.translation, "You have the right to perform your actions, but never to the fruits of actions.");
    assert_eq!(first.transliteration, "karmany evadhikaras te");
    assert_eq!(first.annotations, "karmaṇi—in prescribed duties");

    let alternate = corpus.get(4, 7).expect("4.7 via chapter_id/verse_order");
    assert_eq!(alternate.translation, "yadā yadā hi dharmasya", "translation falls back to text");
    assert_eq!(alternate.transliteration, "");

    // chapter_number 0 is not a valid coordinate, so chapter_id wins
    let fallback = corpus.get(3, 35).expect("3.35");
    assert_eq!(fallback.translation, "śreyān sva-dharmo");
}

#[test]
fn keeps_source_order() {
    let corpus = Corpus::from_json_str(MIXED_SCHEMAS).expect("load");
    let ids: Vec<&str> = corpus.records().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["2.47", "4.7", "3.35"]);
}

#[test]
fn empty_or_unparsable_dataset_fails_fast() {
    assert!(matches!(Corpus::from_json_str("[]"), Err(Error::CorpusLoad(_))));
    assert!(matches!(Corpus::from_json_str("{not json"), Err(Error::CorpusLoad(_))));
    assert!(matches!(Corpus::from_json_str(r#"[{"text": "x"}]"#), Err(Error::CorpusLoad(_))));
}

#[test]
fn load_reads_file_and_reports_missing_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("verse.json");
    fs::write(&path, MIXED_SCHEMAS).unwrap();
    assert_eq!(Corpus::load(&path).expect("load").len(), 3);

    let missing = tmp.path().join("nope.json");
    assert!(matches!(Corpus::load(&missing), Err(Error::CorpusLoad(_))));
}

#[test]
fn shipped_dataset_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/verse.json");
    let corpus = Corpus::load(&path).expect("shipped corpus");
    assert!(corpus.get(2, 47).is_some());
    assert!(corpus.get(4, 7).is_some(), "alternate schema entries are present");
}

#[test]
fn fingerprint_tracks_content() {
    let a = Corpus::from_json_str(MIXED_SCHEMAS).unwrap();
    let b = Corpus::from_json_str(MIXED_SCHEMAS).unwrap();
    assert_eq!(a.fingerprint(), b.fingerprint());

    let changed = MIXED_SCHEMAS.replace("yadā yadā hi dharmasya", "changed");
    let c = Corpus::from_json_str(&changed).unwrap();
    assert_ne!(a.fingerprint(), c.fingerprint());
}

#[test]
fn verse_of_the_day_rotates_by_ordinal() {
    let corpus = Corpus::from_json_str(MIXED_SCHEMAS).unwrap();
    let jan1 = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let jan2 = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
    let jan3 = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();
    assert_eq!(corpus.verse_of_the_day(jan1).id, "4.7");
    assert_eq!(corpus.verse_of_the_day(jan2).id, "3.35");
    assert_eq!(corpus.verse_of_the_day(jan3).id, "2.47");
}
