use clap::Subcommand;
use studbud_core::StudyGoal;

use super::Workspace;

#[derive(Subcommand)]
pub enum GoalAction {
    /// Set the study goal
    Set {
        /// exam, skill, daily or custom
        goal: StudyGoal,
        /// Free-text details (e.g. "Calculus final")
        #[arg(long)]
        details: Option<String>,
    },
    /// Show the current goal
    Show,
}

pub fn run(action: GoalAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut ws = Workspace::open()?;

    match action {
        GoalAction::Set { goal, details } => {
            let mut next = ws.state().with_goal(goal);
            if let Some(details) = details {
                next = next.with_goal_details(details.trim());
            }
            ws.commit(next)?;
            println!("goal set to {goal}");
        }
        GoalAction::Show => {
            let state = ws.state();
            println!("{}", state.goal);
            println!("{}", state.goal.headline(&state.goal_details));
        }
    }
    Ok(())
}
