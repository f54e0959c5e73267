// tests/property_buffers.rs

use proptest::prelude::*;

use cmdqueue::engine::{ChangeNotifier, LineKind, LogBuffer, QueueItem, Task, TaskQueue};
use cmdqueue::exec::CommandLine;
use cmdqueue::types::FullQueuePolicy;

// Whitespace-free tokens, so joining with spaces round-trips through the
// tokenizer.
fn token() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9:/._=-]{1,8}"
}

proptest! {
    #[test]
    fn log_buffer_keeps_the_newest_lines(
        capacity in 1usize..20,
        lines in proptest::collection::vec("[a-z]{0,6}", 0..60),
    ) {
        let log = LogBuffer::new(capacity, ChangeNotifier::new());
        for line in &lines {
            log.append(LineKind::Stdout, line.clone());
        }

        let snapshot = log.snapshot();
        prop_assert_eq!(snapshot.len(), lines.len().min(capacity));

        let keep_from = lines.len().saturating_sub(capacity);
        let texts: Vec<String> = snapshot.iter().map(|l| l.text.clone()).collect();
        prop_assert_eq!(&texts[..], &lines[keep_from..]);

        // Sequence numbers stay contiguous and end at the total appended.
        for pair in snapshot.windows(2) {
            prop_assert_eq!(pair[1].seq, pair[0].seq + 1);
        }
        if let Some(last) = snapshot.last() {
            prop_assert_eq!(last.seq, lines.len() as u64);
        }
    }

    #[test]
    fn command_line_is_prefix_tokens_then_suffix_tokens(
        prefix in proptest::collection::vec(token(), 1..4),
        suffix in proptest::collection::vec(token(), 0..4),
        pad in "[ \t]{0,3}",
    ) {
        let prefix_str = format!("{pad}{}{pad}", prefix.join("  "));
        let suffix_str = format!("{pad}{}", suffix.join(" \t"));

        let cmd = CommandLine::assemble(&prefix_str, &suffix_str).unwrap();

        let mut all: Vec<String> = prefix.clone();
        all.extend(suffix.iter().cloned());

        prop_assert_eq!(cmd.program(), all[0].as_str());
        prop_assert_eq!(cmd.args(), &all[1..]);
        prop_assert_eq!(cmd.to_string(), all.join(" "));
    }

    #[test]
    fn queue_never_exceeds_capacity_and_stays_fifo(
        capacity in 1usize..10,
        pushes in 0usize..30,
    ) {
        let queue = TaskQueue::new(capacity, FullQueuePolicy::Reject, ChangeNotifier::new());

        let mut accepted = Vec::new();
        for i in 0..pushes {
            let item = QueueItem::Run(Task::new("echo", i.to_string()));
            if queue.try_push(item.clone()).is_ok() {
                accepted.push(item);
            }
            prop_assert!(queue.len() <= capacity);
        }

        prop_assert_eq!(accepted.len(), pushes.min(capacity));
        let mut drained = Vec::new();
        while let Some(item) = queue.try_pop() {
            drained.push(item);
        }
        prop_assert_eq!(drained, accepted);
    }
}
