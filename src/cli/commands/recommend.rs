//! Course recommendation command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the recommend command.
pub async fn run_recommend(areas: &[String], settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(&settings)?;

    let spinner = Output::spinner("Matching courses...");
    let result = orchestrator.recommend_courses(areas).await;
    spinner.finish_and_clear();

    let groups = match result {
        Ok(groups) => groups,
        Err(e) => {
            Output::error(&format!("Recommendation failed: {}", e));
            return Err(e.into());
        }
    };

    for group in &groups {
        Output::header(&group.area);
        if group.courses.is_empty() {
            Output::warning("No courses found.");
        }
        for course in &group.courses {
            Output::course(&course.course_name, &course.category, course.score, &course.text);
        }
    }

    Ok(())
}
