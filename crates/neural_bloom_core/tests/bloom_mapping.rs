use neural_bloom_core::{
    map_to_bloom, visualize, AnalysisResult, BloomData, InferenceAdapter, LexicalAdapter,
    SentimentLabel, TextAnalyzer, TypeTag,
};
use std::collections::HashMap;
use std::f64::consts::TAU;

const CONTRACT_INPUT: &str = r#"{
    "embedding": [0.2, -0.1, 0.4],
    "sentiment": { "label": "NEGATIVE", "score": 0.6 },
    "stats": {
        "wordCount": 4,
        "sentenceCount": 2,
        "lexicalDiversity": 1.0,
        "questionScore": 0.5,
        "meanSentenceLength": 2.0
    },
    "hints": { "emotionHints": { "joy": 0, "anger": 0, "sadness": 1, "fear": 0 } },
    "sentences": [
        { "id": 0, "text": "Cold rain.", "start": 0, "end": 10, "wordCount": 2,
          "signedSentiment": -0.7, "score": 0.7 },
        { "id": 1, "text": "Why now?", "start": 11, "end": 19, "wordCount": 2,
          "signedSentiment": -0.2, "score": 0.2 }
    ],
    "tokens": [
        { "text": "Cold", "idx": 0, "charStart": 0, "charEnd": 4, "sentenceId": 0,
          "typeTag": "NAME", "salience": 0.9 },
        { "text": "rain", "idx": 1, "charStart": 5, "charEnd": 9, "sentenceId": 0,
          "typeTag": "WORD", "salience": 0.4 },
        { "text": ".", "idx": 2, "charStart": 9, "charEnd": 10, "sentenceId": 0,
          "typeTag": "PUNCT", "salience": 0.3 },
        { "text": "Why", "idx": 3, "charStart": 11, "charEnd": 14, "sentenceId": 7,
          "typeTag": "NAME", "salience": 0.2 },
        { "text": "now", "idx": 4, "charStart": 15, "charEnd": 18, "sentenceId": 1,
          "typeTag": "WORD", "salience": 0.6 },
        { "text": "?", "idx": 5, "charStart": 18, "charEnd": 19, "sentenceId": 1,
          "typeTag": "PUNCT" }
    ]
}"#;

fn analyzer() -> TextAnalyzer<LexicalAdapter> {
    let mut analyzer = TextAnalyzer::new(LexicalAdapter::default());
    analyzer.initialize().expect("lexical adapter init");
    analyzer
}

fn bloom_for(text: &str) -> BloomData {
    visualize(&analyzer(), text)
        .expect("pipeline should succeed")
        .expect("text is not empty")
}

fn assert_bounded(bloom: &BloomData) {
    let structure = &bloom.structure;
    assert!((3..=16).contains(&structure.branches));
    assert!((2..=7).contains(&structure.complexity));
    assert!((0.40..=0.95).contains(&structure.symmetry));
    assert!((15.0..=75.0).contains(&structure.angle));
    assert!((0.0..=1.0).contains(&bloom.energy.speed));
    assert!((50..=400).contains(&bloom.energy.count));
    assert!((0.0..=1.0).contains(&bloom.energy.question_factor));
    assert!((0.0..=1.0).contains(&bloom.energy.variance_factor));

    let hsl_colors = structure
        .rings
        .iter()
        .map(|ring| ring.hsl)
        .chain(structure.nodes.iter().map(|node| node.hsl));
    for hsl in hsl_colors {
        assert!((0.0..360.0).contains(&hsl.h), "hue out of range: {}", hsl.h);
        assert!((25.0..=100.0).contains(&hsl.s));
        assert!((35.0..=80.0).contains(&hsl.l));
    }

    for node in &structure.nodes {
        assert!((0.0..TAU).contains(&node.theta));
        assert_eq!(node.color.len(), 7);
    }
    for ring in &structure.rings {
        assert!((0.0..std::f64::consts::FRAC_PI_2).contains(&ring.tilt));
        assert!(ring.opacity >= 0.07 && ring.opacity <= 0.25);
    }
    for particle in &bloom.energy.tokens {
        assert!((-0.15..=0.15).contains(&particle.hue_bias));
        assert!([-1, 0, 1].contains(&particle.direction));
    }
}

fn assert_links_stay_in_sentence(bloom: &BloomData) {
    let sentence_of: HashMap<usize, usize> = bloom
        .structure
        .nodes
        .iter()
        .map(|node| (node.token_idx, node.sentence_id))
        .collect();
    for link in &bloom.structure.links {
        assert!(link.a < link.b);
        assert_eq!(sentence_of[&link.a], sentence_of[&link.b]);
    }
}

#[test]
fn love_scenario_maps_to_upward_bloom() {
    let bloom = bloom_for("I love this! Do you?");

    assert_eq!(bloom.metadata.sentiment, SentimentLabel::Positive);
    assert_eq!(bloom.metadata.sentence_count, 2);
    assert_eq!(bloom.energy.direction, 1);
    assert_eq!(bloom.energy.question_factor, 0.5);
    assert_eq!(bloom.structure.rings.len(), 2);
    assert_eq!(bloom.structure.nodes.len(), 5);
    assert_eq!(bloom.energy.tokens.len(), 5);
    assert_eq!(bloom.metadata.base_hue, 0.5);
    assert_bounded(&bloom);
    assert_links_stay_in_sentence(&bloom);
}

#[test]
fn repeated_word_gets_minimum_symmetry() {
    let bloom = bloom_for("aaa aaa aaa.");
    assert_eq!(bloom.metadata.lexical_diversity, 1.0 / 3.0);
    assert_eq!(bloom.structure.symmetry, 0.40);
    assert_eq!(bloom.structure.links.len(), 2);
}

#[test]
fn varied_texts_stay_in_range() {
    let long_text = (0..120)
        .map(|i| format!("word{}x", char::from(b'a' + (i % 26) as u8)))
        .collect::<Vec<_>>()
        .join(" ");
    let texts = [
        "Visit https://example.org on 12.05.2024 with Anna-Lena and 3.5 friends!",
        "ANGRY!!! So furious and sad. Why? WHY?",
        "Ein glücklicher Tag in Berlin. Freude überall… Oder nicht?",
        "?!",
        long_text.as_str(),
    ];

    for text in texts {
        let bloom = bloom_for(text);
        assert_bounded(&bloom);
        assert_links_stay_in_sentence(&bloom);
    }
}

#[test]
fn ring_radius_grows_with_sentence_order() {
    let long = vec!["word"; 90].join(" ");
    let text = format!("{long}. Short one. {long}. End.");
    let bloom = bloom_for(&text);

    let radii: Vec<f64> = bloom.structure.rings.iter().map(|r| r.radius).collect();
    assert_eq!(radii.len(), 4);
    assert!(radii.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn highlights_are_capped_and_ranked() {
    let text = (0..60)
        .map(|i| format!("Term{} stands here.", i))
        .collect::<Vec<_>>()
        .join(" ");
    let bloom = bloom_for(&text);
    let highlights = &bloom.structure.highlights;

    assert_eq!(highlights.len(), 24);
    for (rank, highlight) in highlights.iter().enumerate() {
        assert_eq!(highlight.rank, rank);
        assert!((0.0..TAU).contains(&highlight.theta));
    }
    assert!(highlights
        .windows(2)
        .all(|pair| pair[0].salience >= pair[1].salience));
}

#[test]
fn same_text_gives_byte_identical_json() {
    let text = "Stars drift over the harbor. Nobody sleeps tonight!";
    let first = bloom_for(text).to_json().unwrap();
    let second = bloom_for(text).to_json().unwrap();
    assert_eq!(first, second);
}

#[test]
fn mapper_input_contract_from_json() {
    let analysis = AnalysisResult::from_json(CONTRACT_INPUT).unwrap();

    // Unknown sentence id 7 was repaired to the containing sentence.
    assert_eq!(analysis.tokens()[3].sentence_id, 1);
    assert_eq!(analysis.tokens()[2].salience, 0.0);
    assert_eq!(analysis.topic_hash(), 19_220_917);

    let bloom = map_to_bloom(&analysis);
    let structure = &bloom.structure;

    assert!((structure.angle - 52.1).abs() < 1e-9);
    assert_eq!(structure.branches, 6);
    assert_eq!(structure.complexity, 2);
    assert_eq!(structure.symmetry, 0.95);
    assert_eq!(structure.color, "#6C5CE7");

    assert_eq!(structure.rings.len(), 2);
    assert!((structure.rings[0].radius - 1.21).abs() < 1e-12);
    assert!((structure.rings[1].radius - 1.56).abs() < 1e-12);
    assert!((structure.rings[0].thickness - 0.062).abs() < 1e-12);
    assert!((structure.rings[0].tilt - 0.03).abs() < 1e-12);
    assert!((structure.rings[1].opacity - 0.22).abs() < 1e-12);

    assert_eq!(structure.nodes.len(), 4);
    assert_eq!(structure.nodes[0].type_tag, TypeTag::Name);
    let links: Vec<(usize, usize)> = structure.links.iter().map(|l| (l.a, l.b)).collect();
    assert_eq!(links, vec![(0, 1), (3, 4)]);
    assert!((structure.links[0].weight - 0.79).abs() < 1e-12);
    assert!((structure.links[1].weight - 0.44).abs() < 1e-12);

    let ranked: Vec<usize> = structure.highlights.iter().map(|h| h.token_idx).collect();
    assert_eq!(ranked, vec![0, 4, 1, 3]);

    assert_eq!(bloom.energy.direction, -1);
    assert_eq!(bloom.energy.speed, 0.6);
    assert_eq!(bloom.energy.count, 50);
    assert_eq!(bloom.energy.question_factor, 0.5);
    assert!(bloom.energy.tokens.iter().all(|p| p.direction == -1));
    assert_eq!(bloom.metadata.base_hue, 0.8);
    assert_eq!(bloom.metadata.token_count, 6);
    assert_bounded(&bloom);
}

fn angular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(TAU);
    d.min(TAU - d)
}

#[test]
fn per_token_geometry_follows_sentence_word_count() {
    // Sentence 1 keeps two lexical tokens but reports five whitespace words.
    let input = CONTRACT_INPUT.replace(
        r#""end": 19, "wordCount": 2"#,
        r#""end": 19, "wordCount": 5"#,
    );
    let analysis = AnalysisResult::from_json(&input).unwrap();
    let bloom = map_to_bloom(&analysis);
    let structure = &bloom.structure;
    let word_counts: HashMap<usize, usize> = analysis
        .sentences()
        .iter()
        .map(|s| (s.id, s.word_count))
        .collect();
    let ring_radius: HashMap<usize, f64> =
        structure.rings.iter().map(|r| (r.id, r.radius)).collect();
    let tokens: HashMap<usize, _> = analysis.tokens().iter().map(|t| (t.idx, t)).collect();

    assert!((ring_radius[&1] - 1.575).abs() < 1e-12);

    let mut slot_in_sentence: HashMap<usize, usize> = HashMap::new();
    for node in &structure.nodes {
        let k = slot_in_sentence.entry(node.sentence_id).or_insert(0);
        let slots = word_counts[&node.sentence_id].max(2) as f64;
        let expected = TAU * *k as f64 / slots;
        assert!(
            angular_distance(node.theta, expected) <= 0.05,
            "token {} theta {} vs {}",
            node.token_idx,
            node.theta,
            expected
        );
        *k += 1;

        assert!((node.radius - ring_radius[&node.sentence_id]).abs() <= 0.05);
        let len = tokens[&node.token_idx].len as f64;
        assert!((node.size - (0.04 + len * 0.01)).abs() < 1e-12);
    }
    // "now" sits in slot 1 of 5, not 1 of 2.
    let now = structure.nodes.iter().find(|n| n.token_idx == 4).unwrap();
    assert!(angular_distance(now.theta, TAU / 5.0) <= 0.05);

    for highlight in &structure.highlights {
        let slots = word_counts[&highlight.sentence_id].max(6) as f64;
        let turns = highlight.theta * slots / TAU - highlight.rank as f64;
        assert!(
            turns > -1e-9 && turns < 1.0,
            "highlight {} offset {}",
            highlight.rank,
            turns
        );

        let len = tokens[&highlight.token_idx].len as f64;
        let salience = highlight.salience;
        assert!((highlight.size - (0.08 + len * 0.02 + salience * 0.12)).abs() < 1e-12);
        assert!((highlight.glow - (0.3 + salience * 0.7)).abs() < 1e-12);
    }

    for particle in &bloom.energy.tokens {
        let token = tokens[&particle.token_idx];
        assert!((particle.size - (0.1 + token.len as f64 * 0.03)).abs() < 1e-12);
        assert!((particle.speed - (0.5 + token.salience * 0.9)).abs() < 1e-12);
    }
}

#[test]
fn output_contract_uses_camel_case_keys() {
    let analysis = AnalysisResult::from_json(CONTRACT_INPUT).unwrap();
    let json = serde_json::to_value(map_to_bloom(&analysis)).unwrap();

    assert_eq!(json["structure"]["nodes"][0]["tokenIdx"], 0);
    assert_eq!(json["structure"]["nodes"][0]["typeTag"], "NAME");
    assert!(json["structure"]["rings"][0]["hsl"]["h"].is_number());
    assert!(json["energy"]["questionFactor"].is_number());
    assert!(json["energy"]["tokens"][0]["hueBias"].is_number());
    assert_eq!(json["metadata"]["sentiment"], "NEGATIVE");
    assert_eq!(json["metadata"]["emotionHints"]["sadness"], 1);
    assert_eq!(json["metadata"]["emotionHints"]["joy"], 0);
    assert!(json["metadata"]["bloomId"].is_string());
    assert!(json["metadata"]["mappingNotes"]["branches"].is_string());

    let decoded: BloomData = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, map_to_bloom(&analysis));
}

#[test]
fn malformed_contract_input_is_rejected() {
    let bad_span = CONTRACT_INPUT.replace(r#""charStart": 5, "charEnd": 9"#, r#""charStart": 9, "charEnd": 5"#);
    assert!(AnalysisResult::from_json(&bad_span).is_err());
    assert!(AnalysisResult::from_json("{\"embedding\": \"nope\"}").is_err());
}

#[test]
fn fallback_bloom_is_neutral_and_floating() {
    let adapter = LexicalAdapter::default();
    assert!(!adapter.is_ready());
    let analyzer = TextAnalyzer::new(adapter);
    let bloom = neural_bloom_core::visualize_or_fallback(&analyzer, "Calm water. Grey sky.")
        .unwrap()
        .unwrap();
    assert_eq!(bloom.metadata.sentiment, SentimentLabel::Neutral);
    assert_eq!(bloom.energy.direction, 0);
    assert_eq!(bloom.metadata.topic_hash, 106_925_365);
    assert_bounded(&bloom);
}
