//! Ask command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(query: &str, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(&settings)?;

    let spinner = Output::spinner("Searching knowledge base...");

    match orchestrator.answer(query).await {
        Ok(response) => {
            spinner.finish_and_clear();

            println!("\n{}\n", response.response);

            if response.faqs.is_empty() {
                Output::info("No FAQ entry matched closely enough to cite.");
            } else {
                Output::header("Sources");
                for faq in &response.faqs {
                    Output::faq(&faq.question, &faq.answer, faq.score);
                }
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
