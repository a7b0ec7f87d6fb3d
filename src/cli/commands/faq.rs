//! FAQ lookup command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the faq command.
pub async fn run_faq(question: &str, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(&settings)?;

    let spinner = Output::spinner("Searching FAQ...");
    let result = orchestrator.lookup_faq(question).await;
    spinner.finish_and_clear();

    match result {
        Ok(lookup) => {
            if lookup.answers.is_empty() {
                Output::warning("No FAQ entries found.");
            } else {
                Output::success(&format!("Found {} entries", lookup.answers.len()));
                for answer in &lookup.answers {
                    Output::faq(&answer.question, &answer.answer, answer.score);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("FAQ lookup failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
