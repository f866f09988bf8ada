pub mod classify;
pub mod dashboard;
pub mod init;
pub mod submit;
pub mod tick;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use coursetrack_core::parser::{parse_roster, Roster};
use coursetrack_core::traits::{Clock, FixedClock, SystemClock};
use coursetrack_providers::MemoryStore;

/// Load a roster and build the store it populates.
pub(crate) fn load_store(roster_path: &Path) -> Result<(Roster, Arc<MemoryStore>)> {
    let roster = parse_roster(roster_path)?;
    let store = Arc::new(MemoryStore::from_roster(&roster));
    Ok((roster, store))
}

/// Build a clock: fixed when `--now` was given, wall-clock otherwise.
pub(crate) fn build_clock(now: Option<&str>) -> Result<Arc<dyn Clock>> {
    match now {
        Some(raw) => {
            let instant: DateTime<Utc> = DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("invalid --now value: {raw}"))?
                .with_timezone(&Utc);
            Ok(Arc::new(FixedClock::new(instant)))
        }
        None => Ok(Arc::new(SystemClock)),
    }
}
