//! Project command handlers

use super::CliContext;
use crate::cli::commands::ProjectAction;
use crate::config::CliConfig;
use crate::error::Result;
use crate::output::{json_output, print_success, render, table_output};
use taskhire_sdk::{CreateProjectDto, QueryKey, UpdateProjectDto};

/// Handle projects commands
pub async fn handle_projects(config: &CliConfig, action: ProjectAction, json: bool) -> Result<()> {
    match action {
        ProjectAction::List => {
            let ctx = CliContext::connect(config, "/projects")?;
            let projects = ctx.client.list_projects().await?;
            ctx.remember(QueryKey::new("projects"), &projects);
            render(json, projects.as_slice(), table_output::display_projects)
        }
        ProjectAction::Show { id } => {
            let ctx = CliContext::connect(config, &format!("/projects/{id}"))?;
            let project = ctx.client.get_project(&id).await?;
            ctx.remember(QueryKey::new("project").arg(&id), &project);
            render(json, &project, table_output::display_project)
        }
        ProjectAction::Create {
            title,
            client_id,
            fields,
        } => {
            let ctx = CliContext::connect(config, "/projects")?;
            let dto = CreateProjectDto {
                title,
                description: fields.description,
                final_date: fields.final_date,
                is_active: fields.active,
                client_id,
            };

            let created = ctx.client.create_project(&dto).await?;
            if json {
                return json_output(&created);
            }
            print_success(&format!("Created project {}", created.id));
            Ok(())
        }
        ProjectAction::Update {
            id,
            title,
            client_id,
            fields,
        } => {
            let ctx = CliContext::connect(config, &format!("/projects/{id}"))?;
            let dto = UpdateProjectDto {
                title,
                description: fields.description,
                final_date: fields.final_date,
                is_active: fields.active,
                client_id,
            };

            let updated = ctx.client.update_project(&id, &dto).await?;
            if json {
                return json_output(&updated);
            }
            print_success(&format!("Updated project {}", updated.id));
            Ok(())
        }
    }
}
