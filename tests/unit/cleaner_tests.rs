/*!
 * Tests for script cleaning
 */

use scriptprep::app_config::CleanerConfig;
use scriptprep::cleaner::dedup::cues;
use scriptprep::cleaner::{CueDeduplicator, CueMatching};
use scriptprep::{clean, PipelineWarning, ScriptCleaner, SpanKind};

use crate::common;

/// Test that a direction is removed from spoken text
#[test]
fn test_clean_withDirection_shouldRemoveIt() {
    assert_eq!(clean("Hello [CAMERA: Close-up]"), "Hello");
}

/// Test that leading time ranges are removed from every line
#[test]
fn test_clean_withTimestampLines_shouldStripRanges() {
    let script = "(0:00 - 0:05) Welcome!\n(0:05 - 0:10) Let's begin.";
    assert_eq!(clean(script), "Welcome!\nLet's begin.");
}

/// Test that narration starting with a scene or shot number is kept whole
#[test]
fn test_clean_withHeaderLookalikeNarration_shouldKeepWords() {
    let script = "Scene 2 shows the kitchen at dawn.\nShot 3 of espresso wakes you up.";
    assert_eq!(clean(script), script);
}

/// Test that a cue written twice under two labels is spoken once
#[test]
fn test_clean_withDuplicatedCue_shouldKeepOneCopy() {
    let script = "Character: Narrator: Transform your mornings in 3 simple steps!\n\
                  Dialogue: \"Transform your mornings in 3 simple steps!\"";
    let cleaned = clean(script);

    assert_eq!(cleaned, "Transform your mornings in 3 simple steps!");
    assert_eq!(cleaned.matches("Transform your mornings").count(), 1);
}

/// Test the full templated script
#[test]
fn test_cleanWithReport_withSampleScript_shouldProduceSpeakableText() {
    let cleaned = ScriptCleaner::default().clean_with_report(common::SAMPLE_SCRIPT);

    assert_eq!(cleaned.text, common::SAMPLE_SCRIPT_CLEANED);
    assert_eq!(cleaned.report.timestamps_removed, 2);
    assert_eq!(cleaned.report.spans_removed, 3);
    assert_eq!(cleaned.report.non_spoken_lines, 1);
    assert_eq!(cleaned.report.labels_removed, 5);
    assert_eq!(cleaned.report.duplicates_collapsed, 1);
    assert!(cleaned.report.warnings.is_empty());
}

/// Test that non-spoken lines are dropped and order is kept
#[test]
fn test_clean_withNonSpokenLines_shouldDropThemInOrder() {
    let script = "Visual: A sunrise\nFirst we wake up.\nB-roll: city traffic\nThen we stretch.\nSFX: birds";
    assert_eq!(clean(script), "First we wake up.\nThen we stretch.");
}

/// Test that markdown emphasis and bullets are stripped
#[test]
fn test_clean_withMarkdown_shouldStripMarkup() {
    let script = "## **Narrator:** Welcome to *the* show\n- Host: Grab a __coffee__";
    assert_eq!(clean(script), "Welcome to the show\nGrab a coffee");
}

/// Test that an unterminated direction stays in the text and is reported
#[test]
fn test_cleanWithReport_withUnterminatedBracket_shouldWarn() {
    let cleaned = ScriptCleaner::default().clean_with_report("Say hi [wave");

    assert_eq!(cleaned.text, "Say hi [wave");
    assert_eq!(
        cleaned.report.warnings,
        vec![PipelineWarning::MalformedSpan {
            kind: SpanKind::Bracketed,
            offset: 7,
        }]
    );
}

/// Test that text without structure only has its spacing tidied
#[test]
fn test_clean_withUnstructuredText_shouldReturnTrimmedText() {
    assert_eq!(clean("   Just talk to the camera.   "), "Just talk to the camera.");
}

/// Test that short repeated lines are not collapsed
#[test]
fn test_clean_withShortRepeats_shouldKeepBoth() {
    assert_eq!(clean("Yes!\nYes!"), "Yes!\nYes!");
}

/// Test that repeats outside the window are kept
#[test]
fn test_collapse_withRepeatOutsideWindow_shouldKeepIt() {
    let dedup = CueDeduplicator::new(3, 2, CueMatching::Exact);
    let lines = [
        "Drink water every morning.",
        "Stretch for five minutes.",
        "Write down three goals.",
        "Drink water every morning.",
    ];
    let (kept, dropped) = dedup.collapse(&lines);

    assert_eq!(kept.len(), 4);
    assert_eq!(dropped, 0);
}

/// Test that loose matching ignores case and punctuation
#[test]
fn test_collapse_withLooseMatching_shouldIgnoreCaseAndPunctuation() {
    let lines = ["Drink water every morning!", "drink water, every morning"];

    let (exact, _) = CueDeduplicator::new(3, 3, CueMatching::Exact).collapse(&lines);
    let (loose, dropped) = CueDeduplicator::new(3, 3, CueMatching::Loose).collapse(&lines);

    assert_eq!(exact.len(), 2);
    assert_eq!(loose, vec!["Drink water every morning!".to_string()]);
    assert_eq!(dropped, 1);
}

/// Test that quoted segments are the cues of a line
#[test]
fn test_cues_withQuotedSegment_shouldReturnSegment() {
    assert_eq!(cues("Sarah: \"Rise and shine\" she says"), vec!["Rise and shine"]);
    assert_eq!(cues("No quotes here"), vec!["No quotes here"]);
}

/// Test that voice notes can be kept
#[test]
fn test_scriptCleaner_withVoiceNotesKept_shouldLeaveParentheticals() {
    let config = CleanerConfig {
        strip_voice_notes: false,
        ..CleanerConfig::default()
    };
    let cleaner = ScriptCleaner::new(&config);

    assert_eq!(cleaner.clean("Well (pause) okay [cut]"), "Well (pause) okay");
}

/// Test that custom speaker labels replace the defaults
#[test]
fn test_scriptCleaner_withCustomSpeakerLabels_shouldStripThem() {
    let config = CleanerConfig {
        speaker_labels: vec!["Chef Anna".to_string()],
        ..CleanerConfig::default()
    };
    let cleaner = ScriptCleaner::new(&config);

    assert_eq!(cleaner.clean("Chef Anna: Add the salt."), "Add the salt.");
    assert_eq!(cleaner.clean("Narrator: Add the salt."), "Narrator: Add the salt.");
}
