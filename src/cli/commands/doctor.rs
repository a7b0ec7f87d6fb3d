//! Doctor command - verify credentials and endpoint configuration.

use crate::cli::Output;
use crate::config::{IndexProvider, Settings};
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(config_path: &Path, settings: &Settings) -> anyhow::Result<()> {
    Output::header("Learning Buddy Doctor");
    println!();

    let checks = collect_checks(config_path, settings);
    for check in &checks {
        check.print();
    }
    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. The server will refuse to start until they are fixed.",
            errors
        ));
        anyhow::bail!("configuration check failed");
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Learning Buddy is ready to serve.");
    }

    Ok(())
}

fn collect_checks(config_path: &Path, settings: &Settings) -> Vec<CheckResult> {
    let mut checks = Vec::new();

    if config_path.exists() {
        checks.push(CheckResult::ok("Config file", &config_path.display().to_string()));
    } else {
        checks.push(CheckResult::warning(
            "Config file",
            "not found, using defaults",
            &format!("Create {} to customize settings", config_path.display()),
        ));
    }

    let store = &settings.vector_store;
    let index_detail = match store.provider {
        IndexProvider::Pinecone => format!(
            "pinecone ({}, {})",
            store.courses.index_name, store.faq.index_name
        ),
        IndexProvider::Memory => "memory (seed files)".to_string(),
    };
    checks.push(CheckResult::ok("Vector store", &index_detail));
    checks.push(CheckResult::ok(
        "Generation",
        &format!("{} ({})", settings.generation.provider, settings.generation.model),
    ));

    let problems = settings.problems();
    if problems.is_empty() {
        checks.push(CheckResult::ok("Credentials", "all required values present"));
    }
    for problem in problems {
        checks.push(CheckResult::error(
            "Credentials",
            &problem.to_string(),
            "Set the variable in your shell or in a .env file",
        ));
    }

    checks
}
