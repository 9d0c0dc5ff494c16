/*!
 * End-to-end tests: mask, translate, restore, clean and speak
 */

use scriptprep::app_config::Config;
use scriptprep::errors::ProviderError;
use scriptprep::providers::mock::{MockSynthesizer, MockTranslator};
use scriptprep::{ScriptPipeline, ShotSignal, SpanKind};

use crate::common;

/// Test that prepare cleans and estimates the same script
#[test]
fn test_prepare_withSampleScript_shouldCleanAndEstimate() {
    common::init_test_logging();
    let pipeline = ScriptPipeline::default();
    let prepared = pipeline.prepare(common::SAMPLE_SCRIPT);

    assert_eq!(prepared.cleaned.text, common::SAMPLE_SCRIPT_CLEANED);
    assert_eq!(prepared.estimate.shot_count, 2);
    assert_eq!(prepared.estimate.signal, ShotSignal::TimestampRange);
}

/// Test that protected spans come back verbatim after translation
#[tokio::test]
async fn test_translateProtected_withUppercaseTranslator_shouldPreserveSpans() {
    let pipeline = ScriptPipeline::default();
    let translator = MockTranslator::uppercase();

    let result = pipeline
        .translate_protected(&translator, common::SIX_SPAN_SCRIPT)
        .await
        .unwrap();

    assert!(result.text.contains("AI IMAGE PROMPT: \"a red barn\""));
    assert!(result.text.contains("[Close-up]"));
    assert!(result.text.contains("HELLO THERE (softly) FRIEND."));
    assert!(result.restore_report.is_complete());
    assert_eq!(result.mask_report.count(SpanKind::ImagePrompt), 3);

    // The translator only ever saw placeholders
    let requests = translator.requests();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].text.contains("red barn"));
    assert_eq!(requests[0].source_language, "en");
    assert_eq!(requests[0].target_language, "es");
}

/// Test that drifted placeholders from the translator are restored
#[tokio::test]
async fn test_translateProtected_withDriftingTranslator_shouldRestoreAll() {
    let pipeline = ScriptPipeline::default();
    let translator = MockTranslator::drifting();

    let result = pipeline
        .translate_protected(&translator, "Hello [CAMERA: Close-up]")
        .await
        .unwrap();

    assert_eq!(result.text.trim(), "Hello  [CAMERA: Close-up]");
    assert!(result.restore_report.is_complete());
}

/// Test that a placeholder lost by the translator is reported
#[tokio::test]
async fn test_translateProtected_withDroppingTranslator_shouldReportMissing() {
    common::init_test_logging();
    let pipeline = ScriptPipeline::default();
    let translator = MockTranslator::dropping(2);

    let result = pipeline
        .translate_protected(&translator, common::SIX_SPAN_SCRIPT)
        .await
        .unwrap();

    assert_eq!(result.restore_report.expected, 6);
    assert_eq!(result.restore_report.restored, 5);
    assert_eq!(result.restore_report.missing, vec![2]);
    assert!(!result.text.contains("(softly)"));
}

/// Test that translator errors are propagated
#[tokio::test]
async fn test_translateProtected_withFailingTranslator_shouldReturnError() {
    let pipeline = ScriptPipeline::default();

    let failed = pipeline
        .translate_protected(&MockTranslator::failing(), "Hello [wave]")
        .await;
    assert!(matches!(failed, Err(ProviderError::RequestFailed(_))));

    let empty = pipeline
        .translate_protected(&MockTranslator::empty(), "Hello [wave]")
        .await;
    assert!(matches!(empty, Err(ProviderError::EmptyResponse)));
}

/// Test that configured languages are validated before calling out
#[tokio::test]
async fn test_translateProtected_withBadConfiguredLanguage_shouldFailFast() {
    let config = Config {
        target_language: "klingon".to_string(),
        ..Config::default()
    };
    let pipeline = ScriptPipeline::from_config(&config);
    let translator = MockTranslator::identity();

    let result = pipeline.translate_protected(&translator, "Hello").await;

    assert!(matches!(result, Err(ProviderError::InvalidLanguage(code)) if code == "klingon"));
    assert_eq!(translator.request_count(), 0);
}

/// Test that only cleaned text reaches the speech engine
#[tokio::test]
async fn test_speak_withSampleScript_shouldSynthesizeCleanedText() {
    let pipeline = ScriptPipeline::default();
    let synth = MockSynthesizer::working();

    let spoken = pipeline
        .speak(&synth, common::SAMPLE_SCRIPT, "alloy")
        .await
        .unwrap();

    assert_eq!(synth.spoken(), vec![common::SAMPLE_SCRIPT_CLEANED.to_string()]);
    assert_eq!(
        spoken.audio,
        format!("AUDIO[alloy]:{}", common::SAMPLE_SCRIPT_CLEANED).into_bytes()
    );
}

/// Test that an empty script never reaches the speech engine
#[tokio::test]
async fn test_speak_withOnlyDirections_shouldSkipSynthesis() {
    let pipeline = ScriptPipeline::default();
    let synth = MockSynthesizer::working();

    let spoken = pipeline.speak(&synth, "[CAMERA: pan]\nVisual: a lake", "alloy").await.unwrap();

    assert!(spoken.audio.is_empty());
    assert!(synth.spoken().is_empty());
}

/// Test the full translate-then-speak path
#[tokio::test]
async fn test_localizeAndSpeak_shouldVoiceCleanedTranslation() {
    let pipeline = ScriptPipeline::default();
    let translator = MockTranslator::uppercase();
    let synth = MockSynthesizer::working();

    let localized = pipeline
        .localize_and_speak(
            &translator,
            &synth,
            "Narrator: Hello friends [CAMERA: pan left] welcome back.",
            "nova",
        )
        .await
        .unwrap();

    assert_eq!(
        localized.translation.text,
        "NARRATOR: HELLO FRIENDS [CAMERA: pan left] WELCOME BACK."
    );
    assert_eq!(localized.spoken.cleaned.text, "HELLO FRIENDS WELCOME BACK.");
    assert_eq!(synth.spoken(), vec!["HELLO FRIENDS WELCOME BACK.".to_string()]);
}

/// Test that a synthesis failure surfaces as an error
#[tokio::test]
async fn test_localizeAndSpeak_withFailingSynthesizer_shouldReturnError() {
    let pipeline = ScriptPipeline::default();
    let result = pipeline
        .localize_and_speak(
            &MockTranslator::identity(),
            &MockSynthesizer::failing(),
            "Hello there",
            "nova",
        )
        .await;

    assert!(matches!(result, Err(ProviderError::SynthesisFailed(_))));
}

/// Test that every script in a batch is restored with its own session
#[tokio::test]
async fn test_translateBatch_withSeveralScripts_shouldRestoreEachIndependently() {
    let pipeline = ScriptPipeline::default();
    let translator = MockTranslator::uppercase();
    let scripts = ["one [first cue]", "two [second cue]", "three (third note)"];

    let results = pipeline.translate_batch(&translator, &scripts).await;
    let texts: Vec<String> = results
        .into_iter()
        .map(|result| result.unwrap().text)
        .collect();

    assert_eq!(
        texts,
        vec!["ONE [first cue]", "TWO [second cue]", "THREE (third note)"]
    );
    assert_eq!(translator.request_count(), 3);
}

/// Test that one failure in a batch leaves the others intact
#[tokio::test]
async fn test_translateBatch_withIntermittentTranslator_shouldKeepOrder() {
    let pipeline = ScriptPipeline::default();
    let translator = MockTranslator::intermittent(2);
    let scripts = vec!["a [x]".to_string(), "b [y]".to_string(), "c [z]".to_string()];

    let results = pipeline.translate_batch(&translator, &scripts).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    assert_eq!(results[0].as_ref().unwrap().text, "a [x]");
}

/// Test that identity translation gives back the exact script
#[test]
fn test_translateProtected_withIdentityTranslator_shouldRoundTrip() {
    common::init_test_logging();
    let pipeline = ScriptPipeline::default();
    let translator = MockTranslator::identity();

    let result = tokio_test::block_on(async {
        pipeline
            .translate_protected(&translator, common::SAMPLE_SCRIPT)
            .await
    });

    let translated = tokio_test::assert_ok!(result);
    assert_eq!(translated.text, common::SAMPLE_SCRIPT);
    assert_eq!(translated.restore_report.expected, 5);
    assert!(translated.restore_report.is_complete());
}
