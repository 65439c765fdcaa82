//! Alignment followed by both correction passes

use orf_correction::{
    detect_repeats, reclassify_self_corrections, reference_coverage, AlignmentEntry,
    GradedAligner, ProperNounForgiver, ReferenceAligner, RepeatEvent,
};
use orf_text::ReferencePassage;

#[test]
fn test_word_repeat_becomes_self_correction() {
    let entries = vec![
        AlignmentEntry::correct("the", 0, "the", 0),
        AlignmentEntry::correct("old", 1, "old", 1),
        AlignmentEntry::correct("man", 2, "man", 2),
        AlignmentEntry::correct("saw", 3, "saw", 3),
        AlignmentEntry::correct("a", 4, "a", 4),
        AlignmentEntry::insertion("a", 5),
        AlignmentEntry::correct("boat", 5, "boat", 6),
    ];

    let (out, indices) = reclassify_self_corrections(&entries, &[RepeatEvent::word(4, 2)]);

    assert_eq!(indices, vec![5]);
    assert_eq!(out[5], AlignmentEntry::SelfCorrection { hypothesis: "a".into(), hyp_index: 5 });
    let changed = entries.iter().zip(&out).filter(|(a, b)| a != b).count();
    assert_eq!(changed, 1);
}

#[test]
fn test_coverage_holds_through_every_pass() {
    let cases: &[(&str, &[&str])] = &[
        ("Then Hermione smiled at the dog.", &["then", "her", "my", "own", "smiled", "smiled", "at", "dog"]),
        ("The dog ran home.", &[]),
        ("A b c", &["x", "y", "z", "w", "v"]),
        ("Mr. Brown has 2 cats", &["mister", "brown", "brown", "has", "two", "cats", "cats"]),
        ("in the big house", &["in", "the", "in", "the", "big", "house"]),
    ];

    let aligner = GradedAligner::default();
    let forgiver = ProperNounForgiver::default();

    for (passage, spoken) in cases {
        let reference = ReferencePassage::from_text(passage);
        let expected = reference.len();

        let alignment = aligner.align(&reference, spoken);
        assert_eq!(reference_coverage(&alignment), expected, "aligner: {passage}");

        let repeats = detect_repeats(spoken, &alignment);
        let (corrected, _) = reclassify_self_corrections(&alignment, &repeats);
        assert_eq!(reference_coverage(&corrected), expected, "self-correction: {passage}");

        let (forgiven, _) = forgiver.forgive(&corrected, &reference);
        assert_eq!(reference_coverage(&forgiven), expected, "forgiveness: {passage}");
        assert_eq!(forgiven.len(), alignment.len());
        assert!(forgiven
            .iter()
            .filter_map(AlignmentEntry::forgiveness)
            .all(|f| f.phonetic_ratio >= 40));
    }
}

#[test]
fn test_split_name_and_repeat_in_one_reading() {
    let reference = ReferencePassage::from_text("Then Hermione smiled at the dog.");
    let spoken = ["then", "her", "my", "own", "smiled", "smiled", "at", "the", "dog"];

    let alignment = GradedAligner::default().align(&reference, &spoken);
    let repeats = detect_repeats(&spoken, &alignment);
    assert_eq!(repeats, vec![RepeatEvent::word(4, 2)]);

    let (corrected, indices) = reclassify_self_corrections(&alignment, &repeats);
    assert_eq!(indices, vec![5]);

    let (forgiven, log) = ProperNounForgiver::default().forgive(&corrected, &reference);
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].phonetic_ratio, 63);

    let insertions_left = forgiven
        .iter()
        .filter(|e| matches!(e, AlignmentEntry::Insertion { part_of_forgiven: false, .. }))
        .count();
    assert_eq!(insertions_left, 0);
}

#[test]
fn test_alignment_serializes_for_scoring() {
    let reference = ReferencePassage::from_text("the dog");
    let alignment = GradedAligner::default().align(&reference, &["the", "cat"]);
    let json = serde_json::to_value(&alignment).unwrap();
    assert_eq!(json[0]["type"], "correct");
    assert_eq!(json[1]["type"], "substitution");
    assert_eq!(json[1]["hypIndex"], 1);
    assert!(json[1]["forgiveness"].is_null());
}
