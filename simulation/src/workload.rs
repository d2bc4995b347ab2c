//! Randomized workloads
//!
//! The string workload pushes a stream of text objects through an
//! [`ObjectLog`], scattering each one over several input buffers, and checks
//! after every write that the log still holds exactly the newest strings in
//! write order. The ring workload does plain write/read round trips through
//! a [`MultiRing`] over a random region layout.

use anyhow::{Context, bail, ensure};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ringlog_core::scatter::split_regions;
use ringlog_core::{LogError, MultiRing, ObjectLog};
use tracing::{debug, info, warn};

use crate::config::WorkloadConfig;
use crate::hexdump::hexdump;
use crate::integrity::{IntegrityReport, check_integrity};

/// Fits into a single fragment
pub const SHORT_STRING: &str = "Hello World!";

/// Still a single fragment
pub const MEDIUM_STRING: &str = "This is a longer test string";

/// Needs at least two fragments
pub const LONG_STRING: &str = "This is a very long test string. It goes on for well over one \
hundred and twenty seven bytes, so the log has to split it into several fragments and stitch \
them back together again when somebody reads it. Have a nice day!";

/// Strings every workload starts with
pub const REFERENCE_STRINGS: [&str; 3] = [SHORT_STRING, MEDIUM_STRING, LONG_STRING];

/// Outcome of [`run_string_workload`]
#[derive(Debug, Clone, Default)]
pub struct StringReport {
    /// Strings accepted by the log
    pub written: usize,
    pub written_bytes: usize,
    /// Strings too large for the log even when empty
    pub rejected: usize,
    /// Write-order index of the oldest surviving string
    pub oldest_live: usize,
    /// Number of integrity walks that passed
    pub checks: usize,
    pub last_check: Option<IntegrityReport>,
    /// Live strings, oldest first
    pub survivors: Vec<String>,
    /// Hexdump of every region, if requested
    pub dump: Option<String>,
}

/// Outcome of [`run_ring_workload`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RingReport {
    /// Region layout that was used
    pub regions: Vec<usize>,
    pub rounds: usize,
    pub bytes: usize,
    /// Hexdump of every region, if requested
    pub dump: Option<String>,
}

/// Random region sizes adding up to exactly `total`
pub fn random_layout(rng: &mut impl Rng, total: usize, max_regions: usize) -> Vec<usize> {
    let max_regions = max_regions.max(1);
    let mut sizes = Vec::new();
    let mut left = total;
    while left > 0 && sizes.len() < max_regions - 1 {
        let size = rng.random_range(1..=left);
        sizes.push(size);
        left -= size;
    }
    if left > 0 {
        sizes.push(left);
    }
    sizes
}

/// Cut `data` into at most `max_parts` non-empty pieces
pub fn random_parts<'d>(rng: &mut impl Rng, data: &'d [u8], max_parts: usize) -> Vec<&'d [u8]> {
    let max_parts = max_parts.max(1);
    let mut parts = Vec::new();
    let mut rest = data;
    while !rest.is_empty() && parts.len() < max_parts - 1 {
        let len = rng.random_range(1..=rest.len());
        let (part, tail) = rest.split_at(len);
        parts.push(part);
        rest = tail;
    }
    if !rest.is_empty() {
        parts.push(rest);
    }
    parts
}

/// Every live object of `log` as text, oldest first
pub fn stored_strings(log: &ObjectLog<'_>) -> Vec<String> {
    log.objects()
        .map(|fragments| {
            let bytes: Vec<u8> = fragments.flatten().copied().collect();
            String::from_utf8_lossy(&bytes).into_owned()
        })
        .collect()
}

/// Hexdump of each region of `ring` under a short title line
pub fn dump_regions(ring: &MultiRing<'_>) -> String {
    let mut out = String::new();
    for region in 0..ring.region_count() {
        out.push_str(&format!(
            "Region {region} ({} bytes):\n",
            ring.region_len(region)
        ));
        out.push_str(&hexdump(ring.region(region)));
    }
    out
}

struct StringWorkload<'c, 'a> {
    config: &'c WorkloadConfig,
    log: ObjectLog<'a>,
    rng: StdRng,
    history: Vec<String>,
    report: StringReport,
}

impl StringWorkload<'_, '_> {
    fn append(&mut self, text: String) -> anyhow::Result<()> {
        let parts = random_parts(&mut self.rng, text.as_bytes(), self.config.max_scatter_entries);
        match self.log.write_scattered_object(&parts) {
            Ok(()) => {}
            Err(LogError::InsufficientCapacity { deficit, .. }) => {
                warn!(len = text.len(), deficit = deficit, "String does not fit, skipped");
                self.report.rejected += 1;
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }

        let index = self.history.len();
        self.report.written += 1;
        self.report.written_bytes += text.len();
        self.history.push(text);

        if self.config.check_integrity {
            let check = check_integrity(&self.log)
                .with_context(|| format!("integrity compromised after adding string {index}"))?;
            self.report.checks += 1;
            self.report.last_check = Some(check);
        }
        self.verify_survivors()
            .with_context(|| format!("wrong contents after adding string {index}"))?;

        debug!(
            index = index,
            entries = self.log.len(),
            free = self.log.free_space(),
            "Added string"
        );
        Ok(())
    }

    /// The live objects must be the newest strings, in write order
    fn verify_survivors(&self) -> anyhow::Result<()> {
        let live = self.log.len();
        ensure!(
            live <= self.history.len(),
            "log holds {live} objects but only {} were written",
            self.history.len()
        );

        let oldest = self.history.len() - live;
        for (offset, (fragments, wanted)) in self
            .log
            .objects()
            .zip(&self.history[oldest..])
            .enumerate()
        {
            let actual: Vec<u8> = fragments.flatten().copied().collect();
            ensure!(
                actual == wanted.as_bytes(),
                "object {offset} does not match string {}",
                oldest + offset
            );
        }
        Ok(())
    }
}

/// Write the reference strings and then `config.writes` random strings,
/// verifying the log after every write.
pub fn run_string_workload(config: &WorkloadConfig) -> anyhow::Result<StringReport> {
    let mut storage = vec![0u8; config.total_size()];
    let log = ObjectLog::new_fragmented(split_regions(&mut storage, &config.regions))
        .context("failed to set up object log")?;

    info!(
        capacity = log.capacity(),
        regions = log.ring().region_count(),
        writes = config.writes,
        seed = config.seed,
        "Starting string workload"
    );

    let mut workload = StringWorkload {
        config,
        log,
        rng: StdRng::seed_from_u64(config.seed),
        history: Vec::new(),
        report: StringReport::default(),
    };

    for text in REFERENCE_STRINGS {
        workload.append(text.to_string())?;
    }
    for i in 0..config.writes {
        let prefix = workload.rng.random_range(0..LONG_STRING.len());
        workload.append(format!("This is test string {i} {}", &LONG_STRING[..prefix]))?;
    }

    let mut report = workload.report;
    report.oldest_live = workload.history.len() - workload.log.len();
    report.survivors = stored_strings(&workload.log);
    if config.dump {
        report.dump = Some(dump_regions(workload.log.ring()));
    }

    info!(
        written = report.written,
        rejected = report.rejected,
        live = report.survivors.len(),
        oldest_live = report.oldest_live,
        "String workload finished"
    );
    Ok(report)
}

/// Write and read back random byte runs through a multiring laid over a
/// random split of the configured storage size.
pub fn run_ring_workload(config: &WorkloadConfig) -> anyhow::Result<RingReport> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let total = config.total_size();
    let layout = random_layout(&mut rng, total, config.max_scatter_entries);
    let mut storage = vec![0u8; total];
    let mut ring = MultiRing::new(split_regions(&mut storage, &layout))
        .context("failed to set up multiring")?;

    info!(
        capacity = ring.capacity(),
        regions = layout.len(),
        rounds = config.writes,
        "Starting ring workload"
    );

    let mut report = RingReport {
        regions: layout,
        ..Default::default()
    };

    for round in 0..config.writes {
        let len = rng.random_range(0..ring.capacity());
        let data: Vec<u8> = (0..len).map(|_| rng.random()).collect();

        ring.write(&data);
        ensure!(
            ring.available() == len,
            "round {round}: {} bytes available after writing {len}",
            ring.available()
        );

        let mut out = vec![0u8; len];
        ring.read(&mut out);
        if out != data {
            bail!(
                "round {round}: read back differs\nwritten:\n{}read:\n{}",
                hexdump(&data),
                hexdump(&out)
            );
        }

        debug!(round = round, len = len, at = %ring.write_cursor(), "Round trip");
        report.rounds += 1;
        report.bytes += len;
    }

    if config.dump {
        report.dump = Some(dump_regions(&ring));
    }

    info!(rounds = report.rounds, bytes = report.bytes, "Ring workload finished");
    Ok(report)
}
