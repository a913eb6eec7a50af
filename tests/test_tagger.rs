use hmmtag::{build_model, decode, tokenize, Dataset, Error, HmmConfig, HmmModel, State};

fn strings(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}

fn toy_model() -> HmmModel {
    build_model(strings("dog barks"), strings("noun verb"), &[2], HmmConfig::default())
        .expect("failed to build model")
}

fn fixture_model() -> HmmModel {
    let ds = Dataset::from_files("tests/data/train-sentences.txt", "tests/data/train-tags.txt")
        .expect("failed to read corpus");
    HmmModel::train(&ds, HmmConfig::default()).expect("failed to train")
}

#[test]
fn test_toy_corpus() {
    let model = toy_model();
    assert_eq!(model.transition(None, "noun"), Some(0.0));
    assert_eq!(model.transition(Some("noun"), "verb"), Some(0.0));
    assert_eq!(model.emission("noun", "dog"), Some(0.0));
    assert_eq!(model.emission("verb", "barks"), Some(0.0));
    assert_eq!(decode(&model, &["dog", "barks"]).expect("failed to tag"), ["noun", "verb"]);
}

#[test]
fn test_unseen_word_penalty() {
    let model = toy_model();
    let tagger = model.tagger();
    assert_eq!(tagger.tag(&["dog", "meows"]).expect("failed to tag"), ["noun", "verb"]);
    assert_eq!(tagger.score(&["dog", "meows"], &["noun", "verb"]), Some(-100.0));
    assert_eq!(tagger.score(&["cat", "meows"], &["noun", "verb"]), Some(-200.0));
    assert_eq!(tagger.score(&["dog", "barks"], &["noun", "verb"]), Some(0.0));
}

#[test]
fn test_unknown_words_decode() {
    let model = fixture_model();
    let tokens = tokenize("The zyzzyva flibbers .");
    let tags = decode(&model, &tokens).expect("failed to tag");
    assert_eq!(tags.len(), tokens.len());
    assert_eq!(tags[0], "DET");
    assert_eq!(tags[3], ".");
}

#[test]
fn test_terminal_tag_absorption() {
    let model = build_model(strings("dog barks ."), strings("N V ."), &[3], HmmConfig::default())
        .expect("failed to build model");
    let dot = model.label_id(".").expect("missing label");
    assert_eq!(model.followers(State::Label(dot)).count(), 0);

    assert_eq!(decode(&model, &["dog", "barks", "."]).expect("failed to tag"), ["N", "V", "."]);
    match decode(&model, &["dog", "barks", ".", "dog"]) {
        Err(Error::DeadEnd { position: 3, token }) => assert_eq!(token, "dog"),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_empty_sentence() {
    let model = toy_model();
    let ret = decode::<&str>(&model, &[]);
    match ret {
        Err(e) => assert!(e.is_decode_failure()),
        Ok(tags) => panic!("unexpected tags: {:?}", tags),
    }
}

#[test]
fn test_overfit_training_sentences() {
    let model = fixture_model();
    let ds = Dataset::from_files("tests/data/train-sentences.txt", "tests/data/train-tags.txt")
        .expect("failed to read corpus");
    for seq in &ds.seqs {
        let tags = decode(&model, seq.tokens()).expect("failed to tag");
        assert_eq!(tags, seq.tags(), "{:?}", seq.tokens());
    }
}

#[test]
fn test_held_out_sentences() {
    let model = fixture_model();
    let ds = Dataset::from_files("tests/data/test-sentences.txt", "tests/data/test-tags.txt")
        .expect("failed to read corpus");
    assert_eq!(ds.len(), 2);
    for seq in &ds.seqs {
        assert_eq!(decode(&model, seq.tokens()).expect("failed to tag"), seq.tags());
    }
}

#[test]
fn test_length_and_determinism() {
    let model = fixture_model();
    let tagger = model.tagger();
    let lines = [
        "the cat",
        "a bird sings on the old mat .",
        "she walks",
        "unknown words everywhere",
    ];
    for line in lines {
        let tokens = tokenize(line);
        let first = tagger.tag(&tokens).expect("failed to tag");
        assert_eq!(first.len(), tokens.len());
        for _ in 0..5 {
            assert_eq!(tagger.tag(&tokens).expect("failed to tag"), first);
        }
    }
}

#[test]
fn test_probability_bound() {
    let model = fixture_model();
    let mut n = 0;
    for p in model.log_probs() {
        assert!(p <= 0.0, "{}", p);
        n += 1;
    }
    assert!(n > 0);
}

#[test]
fn test_shared_across_threads() {
    let model = fixture_model();
    let expected = decode(&model, &tokenize("the dog sees a cat .")).expect("failed to tag");
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let tags =
                    decode(&model, &tokenize("the dog sees a cat .")).expect("failed to tag");
                assert_eq!(tags, expected);
            });
        }
    });
}

#[test]
fn test_save_and_load() {
    let model = fixture_model();
    let fpath = std::env::temp_dir().join(format!("hmmtag-{}.json", std::process::id()));
    model.save(&fpath).expect("failed to save model");
    let loaded = HmmModel::from_path(&fpath).expect("failed to load model");
    std::fs::remove_file(&fpath).expect("failed to remove model");

    assert_eq!(loaded.num_labels(), model.num_labels());
    assert_eq!(loaded.num_words(), model.num_words());
    assert_eq!(loaded.config(), model.config());
    let tokens = tokenize("He likes the old dog .");
    assert_eq!(
        decode(&loaded, &tokens).expect("failed to tag"),
        decode(&model, &tokens).expect("failed to tag")
    );
}

#[test]
fn test_open_not_existing_model() {
    let ret = HmmModel::from_path("tests/does-not-exist.json");
    assert!(matches!(ret, Err(Error::Io(_))));
}
