use gita_core::corpus::Corpus;
use gita_core::reference::{parse_reference, try_match, ReferenceMatch, VERSE_NOT_FOUND_ANSWER};
use gita_core::types::{AnswerResponse, Record};

fn corpus() -> Corpus {
    let mut records = Vec::new();
    for chapter in 1..=3u32 {
        for verse in 1..=5u32 {
            records.push(Record::new(chapter, verse, format!("sanskrit {chapter}.{verse}"), Some(format!("translation {chapter}.{verse}"))));
        }
    }
    Corpus::from_records(records).unwrap()
}

#[test]
fn every_cited_verse_resolves_exactly() {
    let corpus = corpus();
    for chapter in 0..=5u32 {
        for verse in 0..=7u32 {
            let question = format!("chapter {chapter} verse {verse}");
            match try_match(&corpus, &question) {
                ReferenceMatch::Found(r) => {
                    assert_eq!((r.chapter, r.verse), (chapter, verse));
                    assert!((1..=3).contains(&chapter) && (1..=5).contains(&verse));
                }
                ReferenceMatch::NotFound { .. } => {
                    assert!(corpus.get(chapter, verse).is_none(), "{question} exists but was not found");
                }
                ReferenceMatch::NotAVerseRequest => panic!("{question} must be recognized"),
            }
        }
    }
}

#[test]
fn pattern_is_case_insensitive_and_ignores_surrounding_words() {
    let corpus = corpus();
    let m = try_match(&corpus, "Please tell me  CHAPTER 2\tVerse 3 , thanks!!");
    assert_eq!(m.into_response(), Some(AnswerResponse::from_verses("translation 2.3")));
    assert_eq!(parse_reference("what is chapter 12 verse 13 about"), Some(("12".into(), "13".into())));
}

#[test]
fn missing_verse_is_terminal_apology() {
    let corpus = corpus();
    let m = try_match(&corpus, "chapter 99 verse 1");
    assert_eq!(m, ReferenceMatch::NotFound { citation: Some((99, 1)) });
    let response = m.into_response().expect("terminal");
    assert_eq!(response.answer, VERSE_NOT_FOUND_ANSWER);
    assert!(response.used_verses);
}

#[test]
fn oversized_numbers_are_not_found() {
    let corpus = corpus();
    let m = try_match(&corpus, "chapter 99999999999999999999 verse 1");
    assert_eq!(m, ReferenceMatch::NotFound { citation: None });
    assert_eq!(m.into_response(), Some(AnswerResponse::from_verses(VERSE_NOT_FOUND_ANSWER)));
}

#[test]
fn non_ascii_numerals_are_left_to_semantic_search() {
    let corpus = corpus();
    for q in ["chapter २ verse ४", "what is chapter २ verse ३ about", "chapter ٢ verse ٣", "chapter ２ verse ３"] {
        assert_eq!(parse_reference(q), None, "{q}");
        assert_eq!(try_match(&corpus, q), ReferenceMatch::NotAVerseRequest, "{q}");
    }
    // Mixed scripts only match on the ASCII part.
    assert_eq!(parse_reference("chapter 2 verse 3४"), Some(("2".into(), "3".into())));
}

#[test]
fn other_questions_are_not_verse_requests() {
    let corpus = corpus();
    for q in ["what does Krishna say about duty", "chapter two verse three", "verse 2 chapter 47", "chapter 2, verse 47"] {
        assert_eq!(try_match(&corpus, q), ReferenceMatch::NotAVerseRequest, "{q}");
        assert!(try_match(&corpus, q).into_response().is_none());
    }
}

#[test]
fn found_verse_falls_back_to_original_text() {
    let corpus = Corpus::from_records(vec![Record::new(1, 1, "dharma-kṣetre kuru-kṣetre", None)]).unwrap();
    let response = try_match(&corpus, "chapter 1 verse 1").into_response().unwrap();
    assert_eq!(response.answer, "dharma-kṣetre kuru-kṣetre");
}
