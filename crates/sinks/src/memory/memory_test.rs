use super::*;
use std::thread;

#[test]
fn test_read_back_lines() {
    let sink = MemoryWritable::new();
    sink.write(b"first\nsecond\n").unwrap();
    sink.write_str("third").unwrap();

    assert_eq!(sink.read_line().unwrap().as_deref(), Some("first"));
    assert_eq!(sink.read_line().unwrap().as_deref(), Some("second"));
    assert_eq!(sink.read_line().unwrap().as_deref(), Some("third"));
    assert_eq!(sink.read_line().unwrap(), None);
}

#[test]
fn test_empty_lines_preserved() {
    let sink = MemoryWritable::new();
    sink.write(b"a\n\nb\n").unwrap();

    assert_eq!(sink.read_line().unwrap().as_deref(), Some("a"));
    assert_eq!(sink.read_line().unwrap().as_deref(), Some(""));
    assert_eq!(sink.read_line().unwrap().as_deref(), Some("b"));
    assert_eq!(sink.read_line().unwrap(), None);
}

#[test]
fn test_cursor_independent_of_writes() {
    let sink = MemoryWritable::new();
    assert_eq!(sink.read_line().unwrap(), None);

    sink.write(b"one\n").unwrap();
    assert_eq!(sink.read_line().unwrap().as_deref(), Some("one"));
    assert_eq!(sink.read_line().unwrap(), None);

    sink.write(b"two\n").unwrap();
    assert_eq!(sink.read_line().unwrap().as_deref(), Some("two"));

    // Reading does not consume the buffer
    assert_eq!(sink.contents().unwrap(), b"one\ntwo\n");
    assert_eq!(sink.len(), 8);
}

#[test]
fn test_close_releases_buffer() {
    let sink = MemoryWritable::new();
    sink.write(b"data\n").unwrap();
    sink.close().unwrap();

    assert!(sink.is_closed());
    assert!(sink.is_empty());
    assert!(matches!(sink.write(b"more"), Err(SinkError::Closed)));
    assert!(matches!(sink.read_line(), Err(SinkError::Closed)));
    assert!(matches!(sink.contents(), Err(SinkError::Closed)));

    // Second close is a no-op
    sink.close().unwrap();
    assert_eq!(sink.metrics().snapshot().closes, 1);
}

#[test]
fn test_metrics() {
    let sink = MemoryWritable::new();
    let handle = sink.metrics_handle();
    sink.write(b"abc").unwrap();
    sink.write(b"de").unwrap();

    let snapshot = handle.snapshot();
    assert_eq!(handle.name(), "memory");
    assert_eq!(snapshot.writes, 2);
    assert_eq!(snapshot.bytes_written, 5);
}

#[test]
fn test_shared_across_threads() {
    let sink = Arc::new(MemoryWritable::new());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let sink = Arc::clone(&sink);
            thread::spawn(move || {
                for _ in 0..100 {
                    sink.write_str(&format!("{t}{t}{t}\n")).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut count = 0;
    while let Some(line) = sink.read_line().unwrap() {
        assert_eq!(line.len(), 3);
        assert!(line.chars().all(|c| Some(c) == line.chars().next()));
        count += 1;
    }
    assert_eq!(count, 400);
}

#[test]
fn test_usable_as_trait_object() {
    let sink: Arc<dyn Writable> = Arc::new(MemoryWritable::new());
    sink.write_str("via trait\n").unwrap();
    sink.close().unwrap();
}
