/*!
 * Common test utilities for the scriptprep test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A templated two-scene script with every construct the pipeline handles
pub const SAMPLE_SCRIPT: &str = r#"**Scene 1: The Morning Routine**
(0:00 - 0:05)
[CAMERA: Slow zoom on a coffee mug]
AI IMAGE PROMPT: "A steaming mug on a sunlit kitchen table"
Narrator (warmly): Transform your mornings in 3 simple steps!
Dialogue: "Transform your mornings in 3 simple steps!"
Visual: Text overlay with the title

**Scene 2: Step One**
(0:05 - 0:15)
Host: First, drink a glass of water."#;

/// Speakable text of `SAMPLE_SCRIPT`
pub const SAMPLE_SCRIPT_CLEANED: &str = "The Morning Routine

Transform your mornings in 3 simple steps!

Step One

First, drink a glass of water.";

/// Three image prompts, two directions and one voice note
pub const SIX_SPAN_SCRIPT: &str = r#"AI IMAGE PROMPT: "a red barn"
[Wide shot]
Hello there (softly) friend.
AI IMAGE PROMPT: "a blue lake"
[Close-up]
AI IMAGE PROMPT: "a green field""#;

/// Route library logs to the test output; safe to call from every test
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// `count` plain narration lines with no structural markers
pub fn plain_lines(count: usize) -> String {
    (1..=count)
        .map(|n| format!("This is narration line number {}.", n))
        .collect::<Vec<_>>()
        .join("\n")
}
