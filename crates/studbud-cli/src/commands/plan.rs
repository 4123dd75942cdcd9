//! Study plan commands for CLI.

use clap::Subcommand;
use studbud_core::{
    format_duration, sessions_by_day, Allocator, Config, GeminiGenerator, PlanOrchestrator,
    PlanSummary,
};

use super::Workspace;

#[derive(Subcommand)]
pub enum PlanAction {
    /// Generate a new plan from the current subjects and time slots
    Generate {
        /// Ask the remote generator first, falling back to the built-in allocator
        #[arg(long)]
        ai: bool,
    },
    /// Show the current plan
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove the current plan
    Clear,
}

pub fn run(action: PlanAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut ws = Workspace::open()?;

    match action {
        PlanAction::Generate { ai } => {
            let config = Config::load_or_default();
            let allocator = Allocator::with_config(config.allocator_config());

            let generation = if ai {
                let generator = GeminiGenerator::configured(&config.generator);
                let orchestrator = PlanOrchestrator::new(allocator, generator);
                let runtime = tokio::runtime::Runtime::new()?;
                runtime.block_on(orchestrator.generate_ai(ws.state()))?
            } else {
                PlanOrchestrator::without_generator(allocator).generate_basic(ws.state())?
            };

            let notice = generation.source.notice();
            if generation.source.is_degraded() {
                eprintln!("{notice}");
            } else {
                println!("{notice}");
            }
            let count = generation.state.study_plan.len();
            ws.commit(generation.state)?;
            println!("{count} sessions planned");
        }
        PlanAction::Show { json } => {
            let state = ws.state();
            if json {
                println!("{}", serde_json::to_string_pretty(&state.study_plan)?);
                return Ok(());
            }
            if state.study_plan.is_empty() {
                println!("no plan yet; run `studbud plan generate`");
                return Ok(());
            }

            println!("{}", state.goal.headline(&state.goal_details));
            for (day, sessions) in sessions_by_day(&state.study_plan) {
                println!("{day}");
                for session in sessions {
                    println!(
                        "  {}-{}  {} ({})  {}",
                        session.start_time,
                        session.end_time,
                        session.subject.name,
                        session.subject.difficulty,
                        format_duration(session.duration)
                    );
                }
            }

            let summary = PlanSummary::from_sessions(&state.study_plan);
            println!(
                "Total: {} in {} sessions",
                format_duration(summary.total_minutes),
                summary.session_count
            );
            for total in &summary.per_subject {
                println!("  {}: {}", total.name, format_duration(total.minutes));
            }
        }
        PlanAction::Clear => {
            let next = ws.state().clear_plan();
            ws.commit(next)?;
            println!("plan cleared");
        }
    }
    Ok(())
}
