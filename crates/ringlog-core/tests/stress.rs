//! # Stress Tests for Ringlog Core
//!
//! Long randomized runs against the public API:
//! - Round trips across random region layouts
//! - FIFO eviction under sustained overflow
//! - Degenerate single-byte regions
//! - Raw multiring write/read cycles

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ringlog_core::scatter::split_regions;
use ringlog_core::{LogError, MultiRing, ObjectLog};

/// Random region sizes adding up to exactly `total`
fn random_layout(rng: &mut StdRng, total: usize, max_regions: usize) -> Vec<usize> {
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

/// Split `data` into up to `max_parts` non-empty pieces
fn random_parts<'d>(rng: &mut StdRng, data: &'d [u8], max_parts: usize) -> Vec<&'d [u8]> {
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

fn read_all(log: &ObjectLog<'_>) -> Vec<Vec<u8>> {
    log.objects()
        .map(|fragments| fragments.flatten().copied().collect())
        .collect()
}

fn assert_fragments_within_regions(log: &ObjectLog<'_>) {
    for index in 0..log.len() as isize {
        let mut iter = log.iterator(index);
        while let Some(fragment) = log.get_fragment(&iter) {
            let header = iter.position().unwrap();
            assert!(
                log.ring().contiguous(header) > fragment.len(),
                "fragment at {header} with {} bytes crosses its region",
                fragment.len()
            );
            log.next(&mut iter);
        }
    }
}

/// Test 1: Scattered writes over random region layouts
///
/// After every write the live objects must be the newest suffix of
/// everything written, byte for byte.
#[test]
fn test_random_layouts_round_trip() {
    for seed in 0..20u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut storage = vec![0u8; 4096];
        let layout = random_layout(&mut rng, 4096, 18);
        let mut log = ObjectLog::new_fragmented(split_regions(&mut storage, &layout)).unwrap();
        let mut expected: VecDeque<Vec<u8>> = VecDeque::new();

        for _ in 0..200 {
            let len = rng.random_range(0..600);
            let data: Vec<u8> = (0..len).map(|_| rng.random()).collect();
            let parts = random_parts(&mut rng, &data, 20);

            log.write_scattered_object(&parts).unwrap();
            expected.push_back(data);
            while expected.len() > log.len() {
                expected.pop_front();
            }

            assert!(log.used() <= log.capacity());
            assert_eq!(log.get_size(-1).unwrap(), expected.back().unwrap().len());
        }

        let live = read_all(&log);
        assert_eq!(live.len(), expected.len(), "seed {seed}");
        for (actual, wanted) in live.iter().zip(expected.iter()) {
            assert_eq!(actual, wanted, "seed {seed}");
        }
        assert_fragments_within_regions(&log);
    }
}

/// Test 2: Writing far beyond capacity into a small buffer
///
/// The entry count settles and the oldest survivor is always recent.
#[test]
fn test_sustained_overflow() {
    let mut rng = StdRng::seed_from_u64(1622589983);
    let mut storage = [0u8; 512];
    let mut log = ObjectLog::new(&mut storage).unwrap();
    let mut written: Vec<String> = Vec::new();
    let mut total = 0usize;

    for i in 0..2000 {
        let entry = format!("event {i} {}", "x".repeat(rng.random_range(0..40)));
        total += entry.len();
        log.write_string(&entry).unwrap();
        written.push(entry);

        // Every live object takes at least "event N " plus one header
        let shortest = "event 0 ".len() + 1;
        assert!(log.len() * shortest <= log.capacity());

        let oldest = written.len() - log.len();
        let mut out = Vec::new();
        log.read_object(0, &mut out).unwrap();
        assert_eq!(out, written[oldest].as_bytes());
    }

    assert!(total > 20 * log.capacity());
    assert!(log.len() > 5, "only {} entries survived", log.len());
}

/// Test 3: Oversize objects are rejected without touching live data
#[test]
fn test_oversize_rejected_at_any_fill_level() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut storage = vec![0u8; 1000];
    let mut log =
        ObjectLog::new_fragmented(split_regions(&mut storage, &[300, 200, 500])).unwrap();

    for _ in 0..50 {
        let len = rng.random_range(1..200);
        log.write_object(&vec![0x5au8; len]).unwrap();

        let before = read_all(&log);
        let end = log.end_cursor();
        let first = log.first_cursor();

        let err = log.write_object(&vec![0xa5u8; 1000]).unwrap_err();
        match err {
            LogError::InsufficientCapacity {
                required,
                capacity,
                deficit,
            } => {
                assert_eq!(capacity, 1000);
                assert_eq!(deficit, required - capacity);
                assert!(deficit > 0);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(read_all(&log), before);
        assert_eq!(log.end_cursor(), end);
        assert_eq!(log.first_cursor(), first);
    }
}

/// Test 4: Layout with single-byte regions
///
/// Those regions only ever hold empty padding fragments.
#[test]
fn test_single_byte_regions() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut storage = [0u8; 64];
    let layout = [1, 1, 40, 1, 20, 1];
    let mut log = ObjectLog::new_fragmented(split_regions(&mut storage, &layout)).unwrap();
    let mut written = Vec::new();

    for _ in 0..500 {
        let len = rng.random_range(0..=40);
        let data: Vec<u8> = (0..len).map(|_| rng.random()).collect();
        log.write_object(&data).unwrap();
        written.push(data);

        let live = read_all(&log);
        assert_eq!(live.as_slice(), &written[written.len() - live.len()..]);
        assert_fragments_within_regions(&log);
    }
}

/// Test 5: Raw multiring write/read cycles over random layouts
#[test]
fn test_multiring_random_round_trip() {
    for seed in 0..50u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut storage = vec![0u8; 4096];
        let layout = random_layout(&mut rng, 4096, 19);
        let mut ring = MultiRing::new(split_regions(&mut storage, &layout)).unwrap();

        for _ in 0..20 {
            let len = rng.random_range(0..ring.capacity());
            let data: Vec<u8> = (0..len).map(|_| rng.random()).collect();
            ring.write(&data);
            assert_eq!(ring.available(), len);

            let mut out = vec![0u8; len];
            ring.read(&mut out);
            assert_eq!(out, data, "seed {seed}");
            assert_eq!(ring.read_cursor(), ring.write_cursor());
        }
    }
}
