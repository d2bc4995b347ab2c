//! Fixed demonstration scenarios
//!
//! Both scenarios store the reference strings and print what the log holds
//! afterwards. They differ only in the storage layout.

use anyhow::Context;
use ringlog_core::ObjectLog;
use ringlog_core::scatter::split_regions;
use tracing::info;

use crate::integrity::{IntegrityReport, check_integrity};
use crate::workload::{REFERENCE_STRINGS, dump_regions, stored_strings};

/// Single buffer used by the hello scenario
pub const HELLO_STORAGE_LEN: usize = 1235;

/// Uneven regions used by the fragmented scenario
pub const FRAGMENTED_REGIONS: [usize; 4] = [175, 100, 180, 150];

/// What a scenario left in its log
#[derive(Debug, Clone)]
pub struct ScenarioSummary {
    pub capacity: usize,
    pub objects: Vec<String>,
    pub integrity: IntegrityReport,
}

/// The reference strings in one contiguous buffer
pub fn run_hello_scenario(dump: bool) -> anyhow::Result<ScenarioSummary> {
    println!("=== Hello: one {HELLO_STORAGE_LEN}-byte buffer ===");
    run_reference_scenario(&[HELLO_STORAGE_LEN], dump)
}

/// The reference strings spread over four uneven regions
pub fn run_fragmented_scenario(dump: bool) -> anyhow::Result<ScenarioSummary> {
    println!("=== Fragmented: regions {FRAGMENTED_REGIONS:?} ===");
    run_reference_scenario(&FRAGMENTED_REGIONS, dump)
}

fn run_reference_scenario(regions: &[usize], dump: bool) -> anyhow::Result<ScenarioSummary> {
    let mut storage = vec![0u8; regions.iter().sum()];
    let mut log = ObjectLog::new_fragmented(split_regions(&mut storage, regions))?;

    for text in REFERENCE_STRINGS {
        log.write_string(text)
            .with_context(|| format!("failed to store {} bytes", text.len()))?;
    }

    let integrity = check_integrity(&log)?;
    let objects = stored_strings(&log);
    for (index, text) in objects.iter().enumerate() {
        let size = log.get_size(index as isize)?;
        println!("String {index} ({size} bytes): {text}");
    }
    if dump {
        print!("{}", dump_regions(log.ring()));
    }

    info!(
        objects = integrity.objects,
        fragments = integrity.fragments,
        free = log.free_space(),
        "Scenario complete"
    );

    Ok(ScenarioSummary {
        capacity: log.capacity(),
        objects,
        integrity,
    })
}
