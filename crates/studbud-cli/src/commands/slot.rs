//! Weekly time slot commands for CLI.

use clap::Subcommand;
use studbud_core::{format_duration, ClockTime, Day, TimeSlot};

use super::Workspace;

#[derive(Subcommand)]
pub enum SlotAction {
    /// Add a time slot
    Add {
        /// Day of week (e.g. Monday)
        day: Day,
        /// Start time, 24-hour HH:MM
        start: ClockTime,
        /// End time, 24-hour HH:MM; must be after start
        end: ClockTime,
    },
    /// List time slots
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a time slot
    Remove {
        /// Time slot ID
        id: String,
    },
}

pub fn run(action: SlotAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut ws = Workspace::open()?;

    match action {
        SlotAction::Add { day, start, end } => {
            let slot = TimeSlot::new(day, start, end)?;
            let id = slot.id.clone();
            let next = ws.state().add_time_slot(slot)?;
            ws.commit(next)?;
            println!("Time slot added: {id}");
        }
        SlotAction::List { json } => {
            let slots = &ws.state().time_slots;
            if json {
                println!("{}", serde_json::to_string_pretty(slots)?);
            } else if slots.is_empty() {
                println!("no time slots");
            } else {
                for slot in slots {
                    println!(
                        "{}  {} {}-{}  ({})",
                        slot.id,
                        slot.day,
                        slot.start_time,
                        slot.end_time,
                        format_duration(slot.duration_minutes().max(0) as u32)
                    );
                }
            }
        }
        SlotAction::Remove { id } => {
            let next = ws.state().remove_time_slot(&id)?;
            ws.commit(next)?;
            println!("Time slot removed: {id}");
        }
    }
    Ok(())
}
