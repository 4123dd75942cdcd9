//! Subject management commands for CLI.

use clap::Subcommand;
use studbud_core::{Difficulty, Subject, SubjectUpdate};

use super::Workspace;

#[derive(Subcommand)]
pub enum SubjectAction {
    /// Add a subject
    Add {
        /// Subject name
        name: String,
        /// easy, easyToModerate, moderate, aboveModerate or tough
        #[arg(long, default_value = "moderate")]
        difficulty: Difficulty,
    },
    /// List subjects
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a subject
    Update {
        /// Subject ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New difficulty
        #[arg(long)]
        difficulty: Option<Difficulty>,
    },
    /// Remove a subject
    Remove {
        /// Subject ID
        id: String,
    },
}

pub fn run(action: SubjectAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut ws = Workspace::open()?;

    match action {
        SubjectAction::Add { name, difficulty } => {
            let subject = Subject::new(&name, difficulty)?;
            let id = subject.id.clone();
            let next = ws.state().add_subject(subject)?;
            ws.commit(next)?;
            println!("Subject added: {id}");
        }
        SubjectAction::List { json } => {
            let subjects = &ws.state().subjects;
            if json {
                println!("{}", serde_json::to_string_pretty(subjects)?);
            } else if subjects.is_empty() {
                println!("no subjects");
            } else {
                for subject in subjects {
                    println!("{}  {}  ({})", subject.id, subject.name, subject.difficulty);
                }
            }
        }
        SubjectAction::Update {
            id,
            name,
            difficulty,
        } => {
            let next = ws
                .state()
                .update_subject(&id, SubjectUpdate { name, difficulty })?;
            ws.commit(next)?;
            println!("Subject updated: {id}");
        }
        SubjectAction::Remove { id } => {
            let next = ws.state().remove_subject(&id)?;
            ws.commit(next)?;
            println!("Subject removed: {id}");
        }
    }
    Ok(())
}
