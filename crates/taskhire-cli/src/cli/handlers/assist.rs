//! AI assist command handlers

use super::CliContext;
use crate::cli::commands::QuizAnswers;
use crate::config::CliConfig;
use crate::error::Result;
use crate::output::{json_output, table_output};
use taskhire_sdk::RefineQuizDto;

/// Handle improve command
pub async fn handle_improve(config: &CliConfig, text: &str, json: bool) -> Result<()> {
    let ctx = CliContext::connect(config, "/tasks/new")?;
    let improved = ctx.client.improve_description(text).await?;

    if json {
        return json_output(&improved);
    }
    println!("{}", improved.result);
    Ok(())
}

/// Handle refine command
pub async fn handle_refine(config: &CliConfig, answers: QuizAnswers, json: bool) -> Result<()> {
    let ctx = CliContext::connect(config, "/tasks/new")?;
    let dto = RefineQuizDto {
        problem: answers.problem,
        context: answers.context,
        expected_outcome: answers.expected_outcome,
    };
    let response = ctx.client.refine_quiz(&dto).await?;

    if json {
        return json_output(&response);
    }
    table_output::display_suggestions("Problem", &response.problem);
    println!();
    table_output::display_suggestions("Context", &response.context);
    println!();
    table_output::display_suggestions("Expected outcome", &response.expected_outcome);
    Ok(())
}
