pub mod config;
pub mod goal;
pub mod plan;
pub mod slot;
pub mod subject;

use studbud_core::{AppState, SnapshotStore};

/// Loaded snapshot plus the store it came from.
///
/// Each command applies one state transition through [`Workspace::commit`],
/// which writes only the snapshot values that changed.
pub struct Workspace {
    store: SnapshotStore,
    state: AppState,
}

impl Workspace {
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let store = SnapshotStore::open()?;
        let state = store.load()?;
        Ok(Self { store, state })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn commit(&mut self, next: AppState) -> Result<(), Box<dyn std::error::Error>> {
        self.store.persist(&self.state, &next)?;
        self.state = next;
        Ok(())
    }
}

/// Reset goal, subjects, slots and plan to defaults.
pub fn reset() -> Result<(), Box<dyn std::error::Error>> {
    let mut ws = Workspace::open()?;
    let next = ws.state().reset();
    ws.commit(next)?;
    println!("all study data reset");
    Ok(())
}
