//! Grand projects: paid up front, maintained monthly, rewarded on completion.

use tracing::{info, warn};

use crate::simulation::{
    ActiveProject, ContentLibrary, GameState, LogCategory, NotificationKind, ProjectTemplate,
    Rejection, ensure_budget,
};

pub fn start_project(state: &mut GameState, template: &ProjectTemplate) -> Result<(), Rejection> {
    if state
        .policies
        .active_projects
        .iter()
        .any(|p| p.template_id == template.id)
    {
        return Err(Rejection::precondition(format!(
            "{} is already under construction",
            template.name
        )));
    }
    ensure_budget(state, template.cost)?;
    state.adjust_budget(-template.cost);
    state.policies.active_projects.push(ActiveProject {
        template_id: template.id.clone(),
        name: template.name.clone(),
        months_remaining: template.duration_months.max(1),
        total_months: template.duration_months.max(1),
        monthly_upkeep: template.monthly_upkeep,
    });
    info!(project = %template.id, "project started");
    state.log(
        LogCategory::Project,
        format!("Construction began on {}", template.name),
    );
    Ok(())
}

/// Charges upkeep, counts down, and pays out finished projects.
pub fn advance_projects(state: &mut GameState, content: &ContentLibrary) {
    let mut projects = std::mem::take(&mut state.policies.active_projects);
    let mut finished = Vec::new();
    for project in &mut projects {
        state.adjust_budget(-project.monthly_upkeep);
        project.months_remaining = project.months_remaining.saturating_sub(1);
        if project.months_remaining == 0 {
            finished.push(project.clone());
        }
    }
    projects.retain(|p| p.months_remaining > 0);
    state.policies.active_projects = projects;

    for project in finished {
        match content.project(&project.template_id) {
            Some(template) => template.payoff.apply(state),
            None => warn!(project = %project.template_id, "finished project missing from content"),
        }
        info!(project = %project.template_id, "project completed");
        state.log(LogCategory::Project, format!("{} completed", project.name));
        state.notify(
            NotificationKind::Success,
            "Project completed",
            format!("{} is open.", project.name),
        );
    }
}
