use keyswarm_core::{
    score, score_with, Codebook, CorpusStore, KeywordScorer, Label, Polarity, RawRecord, Record,
};

fn sample_corpus() -> CorpusStore {
    let rows = [
        ("Free entry, win now!", "0"),
        ("Claim your free prize @winner http://bit.ly/xyz", "0"),
        ("thanks for the update", "1"),
        ("see you at the meeting, free after 5", "1"),
        ("win the match tonight", "1"),
    ];
    CorpusStore::load(rows.iter().enumerate().map(|(i, (text, class))| RawRecord {
        line: i + 2,
        text: Some(text.to_string()),
        class: Some(class.to_string()),
    }))
    .unwrap()
}

fn keywords(ks: &[&str]) -> Vec<String> {
    ks.iter().map(|k| k.to_string()).collect()
}

#[test]
fn two_record_scenario() {
    let corpus = CorpusStore::from_records(vec![
        Record { text: "free entry win now".into(), label: Label::Irrelevant },
        Record { text: "thanks for the update".into(), label: Label::Relevant },
    ])
    .unwrap();
    let s = score(&keywords(&["free"]), &corpus);
    assert!((s - 0.75).abs() < 1e-12, "{s}");
}

#[test]
fn scores_stay_in_unit_interval() {
    let corpus = sample_corpus();
    let sets: [&[&str]; 5] = [
        &["free"],
        &["win", "prize"],
        &["absent"],
        &["the", "free", "win"],
        &["update", "meeting", "claim", "entry"],
    ];
    for set in sets {
        for polarity in [Polarity::AsWritten, Polarity::FavorIrrelevant] {
            let s = score_with(&keywords(set), &corpus, polarity);
            assert!((0.0..=1.0).contains(&s), "{set:?} {polarity:?} -> {s}");
        }
    }
}

#[test]
fn empty_set_is_infinite_for_any_corpus() {
    assert_eq!(score(&[], &sample_corpus()), f64::INFINITY);
}

#[test]
fn cached_scorer_matches_direct_scoring() {
    let corpus = sample_corpus();
    let codebook = Codebook::build(["free", "win", "prize", "thanks", "meeting"]).unwrap();
    for polarity in [Polarity::AsWritten, Polarity::FavorIrrelevant] {
        let scorer = KeywordScorer::new(&corpus, &codebook, polarity);
        for set in [vec!["free"], vec!["win", "thanks"], vec!["prize", "meeting", "free"]] {
            let ks = keywords(&set);
            assert_eq!(scorer.score_set(&codebook, &ks), score_with(&ks, &corpus, polarity));
        }
        assert_eq!(scorer.score_indices(&[]), f64::INFINITY);
    }
}

#[test]
fn stats_count_masked_text() {
    let corpus = sample_corpus();
    let codebook = Codebook::build(["free", "bit.ly"]).unwrap();
    let scorer = KeywordScorer::new(&corpus, &codebook, Polarity::AsWritten);
    let free = scorer.stats(1).unwrap();
    assert_eq!(free.irrelevant_hits, 2);
    assert_eq!(free.total_hits, 3);
    // the URL was masked on load
    assert_eq!(scorer.stats(2).unwrap().total_hits, 0);
    assert!(scorer.stats(0).is_none());
}
