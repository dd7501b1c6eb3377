//! Task command handlers

use super::CliContext;
use crate::cli::commands::{TaskAction, TaskFields};
use crate::config::CliConfig;
use crate::error::Result;
use crate::output::{json_output, print_success, render, table_output};
use taskhire_sdk::{CreateTaskDto, QueryKey, UpdateTaskDto};

/// Handle tasks commands
pub async fn handle_tasks(config: &CliConfig, action: TaskAction, json: bool) -> Result<()> {
    let ctx = CliContext::connect(config, "/tasks")?;

    match action {
        TaskAction::List => {
            let tasks = ctx.client.list_tasks().await?;
            ctx.remember(QueryKey::new("tasks"), &tasks);
            render(json, tasks.as_slice(), table_output::display_tasks)
        }
        TaskAction::Create { title, fields } => {
            let TaskFields {
                description,
                ranking_criteria,
                time_limit,
                status,
                project_id,
            } = fields;
            let dto = CreateTaskDto {
                title,
                description,
                ranking_criteria,
                time_limit,
                status,
                project_id,
            };

            let created = ctx.client.create_task(&dto).await?;
            if json {
                return json_output(&created);
            }
            print_success(&format!("Created task {}", created.id));
            Ok(())
        }
        TaskAction::Update { id, title, fields } => {
            let dto = UpdateTaskDto {
                title,
                description: fields.description,
                ranking_criteria: fields.ranking_criteria,
                time_limit: fields.time_limit,
                status: fields.status,
                project_id: fields.project_id,
            };

            let updated = ctx.client.update_task(&id, &dto).await?;
            if json {
                return json_output(&updated);
            }
            print_success(&format!("Updated task {}", updated.id));
            Ok(())
        }
    }
}
