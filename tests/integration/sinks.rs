//! File sink behavior under concurrency.

use std::sync::Arc;

use miner_rs::{FilePatternSink, PatternSink};

#[test]
fn file_sink_writes_parseable_lines() {
    let dir = std::env::temp_dir().join(format!(
        "miner-sink-test-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("patterns.tsv");

    let sink = Arc::new(FilePatternSink::create(&path).unwrap());
    let n_threads = 4u32;
    let per_thread = 200u32;

    std::thread::scope(|scope| {
        for tid in 0..n_threads {
            let sink = Arc::clone(&sink);
            scope.spawn(move || {
                for i in 0..per_thread {
                    sink.collect(tid * per_thread + i, &[tid, 100 + i]);
                }
            });
        }
    });
    assert_eq!(sink.close(), (n_threads * per_thread) as u64);

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), (n_threads * per_thread) as usize);

    // Concurrent collectors may order lines arbitrarily, but every line
    // must be a whole, well-formed record.
    for line in lines {
        let (support, items) = line.split_once('\t').expect("support TAB items");
        support.parse::<u32>().unwrap();
        let items: Vec<u32> = items
            .split(' ')
            .map(|s| s.parse().unwrap())
            .collect();
        assert_eq!(items.len(), 2);
    }

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn average_pattern_length_is_floored_mean() {
    let sink = miner_rs::VecPatternSink::new();
    assert_eq!(sink.average_pattern_length(), 0);

    sink.collect(10, &[1]);
    sink.collect(9, &[1, 2]);
    sink.collect(8, &[1, 2, 3, 4]);
    // (1 + 2 + 4) / 3 = 2 (floored).
    assert_eq!(sink.average_pattern_length(), 2);
    assert_eq!(sink.collected_length(), 7);
}
