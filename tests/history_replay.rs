use editor_undo::command::{Command, CommandError, CommandResult, History, TrackGuard};
use editor_undo::HistoryConfig;
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<String>>>;

// A command that writes every call into a shared log
#[derive(Debug)]
struct Recorded {
    name: &'static str,
    log: Log,
    fail: bool,
}

impl Recorded {
    fn new(name: &'static str, log: &Log) -> Box<dyn Command> {
        Box::new(Self {
            name,
            log: log.clone(),
            fail: false,
        })
    }

    fn failing(name: &'static str, log: &Log) -> Box<dyn Command> {
        Box::new(Self {
            name,
            log: log.clone(),
            fail: true,
        })
    }

    fn push(&self, event: &str) -> CommandResult {
        if self.fail {
            return Err(CommandError::ExpiredTarget);
        }
        self.log.borrow_mut().push(format!("{}:{}", event, self.name));
        Ok(())
    }
}

impl Command for Recorded {
    fn undo(&mut self) -> CommandResult {
        self.push("undo")
    }

    fn redo(&mut self) -> CommandResult {
        self.push("redo")
    }

    fn on_modified(&mut self) {
        self.log.borrow_mut().push(format!("modified:{}", self.name));
    }
}

fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

#[test]
fn test_undo_reverse_order_then_notify_forward() {
    let log = new_log();
    let mut history = History::new();
    history.record(vec![
        Recorded::new("a", &log),
        Recorded::new("b", &log),
        Recorded::new("c", &log),
    ]);

    assert!(history.undo());
    assert_eq!(
        take(&log),
        vec![
            "undo:c", "undo:b", "undo:a", "modified:a", "modified:b", "modified:c"
        ]
    );
    assert_eq!(history.cursor(), 0);

    assert!(history.redo());
    assert_eq!(
        take(&log),
        vec![
            "redo:a", "redo:b", "redo:c", "modified:a", "modified:b", "modified:c"
        ]
    );
    assert_eq!(history.cursor(), 1);
}

#[test]
fn test_empty_history_reports_nothing_to_do() {
    let mut history = History::new();
    assert!(!history.undo());
    assert!(!history.redo());
    assert_eq!(history.cursor(), 0);
    assert!(history.last_replay().is_none());
}

#[test]
fn test_redo_at_end_is_noop() {
    let log = new_log();
    let mut history = History::new();
    history.record(vec![Recorded::new("a", &log)]);

    assert!(!history.redo());
    assert!(take(&log).is_empty());
    assert_eq!(history.cursor(), 1);
}

#[test]
fn test_recording_truncates_redo_branch() {
    let log = new_log();
    let mut history = History::new();
    history.record(vec![Recorded::new("a", &log)]);
    history.record(vec![Recorded::new("b", &log)]);
    history.record(vec![Recorded::new("c", &log)]);
    history.undo();
    history.undo();
    take(&log);

    history.record(vec![Recorded::new("d", &log)]);
    assert_eq!(history.len(), 2);
    assert_eq!(history.cursor(), 2);
    assert!(!history.redo());

    history.undo();
    history.undo();
    assert_eq!(
        take(&log),
        vec!["undo:d", "modified:d", "undo:a", "modified:a"]
    );
}

#[test]
fn test_failed_commands_are_skipped() {
    let log = new_log();
    let mut history = History::new();
    history.record(vec![
        Recorded::new("a", &log),
        Recorded::failing("gone", &log),
        Recorded::new("c", &log),
    ]);

    assert!(history.undo());
    assert_eq!(
        take(&log),
        vec!["undo:c", "undo:a", "modified:a", "modified:c"]
    );
    let report = history.last_replay().unwrap();
    assert_eq!((report.applied, report.failed), (2, 1));
    assert!(report.is_partial());
    assert_eq!(history.cursor(), 0);
}

#[test]
fn test_group_with_only_failures_still_moves_cursor() {
    let log = new_log();
    let mut history = History::new();
    history.record(vec![Recorded::new("a", &log)]);
    history.record(vec![Recorded::failing("gone", &log)]);

    assert!(history.undo());
    assert_eq!(history.cursor(), 1);
    assert!(history.last_replay().unwrap().is_inert());
    assert!(take(&log).is_empty());
}

#[test]
fn test_disabled_tracking_drops_records() {
    let log = new_log();
    let mut history = History::new();
    history.set_tracking_enabled(false);

    let handle = history.record(vec![Recorded::new("a", &log)]);
    assert!(!handle.is_recorded());
    history.add(Recorded {
        name: "b",
        log: log.clone(),
        fail: false,
    });
    assert_eq!(history.pending_len(), 0);
    assert!(history.end_frame().is_none());
    assert!(history.is_empty());
}

#[test]
fn test_track_guard_suppresses_recording() {
    let log = new_log();
    let mut history = History::new();
    {
        let mut guard = TrackGuard::new(&mut history, false);
        guard.record(vec![Recorded::new("a", &log)]);
    }
    assert!(history.is_tracking_enabled());
    assert!(history.is_empty());

    history.record(vec![Recorded::new("b", &log)]);
    assert_eq!(history.len(), 1);
}

#[test]
fn test_end_frame_groups_added_commands() {
    let log = new_log();
    let mut history = History::new();
    history.add_boxed(Recorded::new("a", &log));
    history.add_boxed(Recorded::new("b", &log));
    assert_eq!(history.pending_len(), 2);

    let handle = history.end_frame().unwrap();
    assert!(handle.is_recorded());
    assert_eq!(handle.frame(), 0);
    assert_eq!(history.frame(), 1);
    assert_eq!(history.len(), 1);
    assert_eq!(history.group(0).map(|group| group.len()), Some(2));

    assert!(history.end_frame().is_none());
    assert_eq!(history.len(), 1);

    history.undo();
    assert_eq!(
        take(&log),
        vec!["undo:b", "undo:a", "modified:a", "modified:b"]
    );
}

#[test]
fn test_execute_applies_before_queueing() {
    let log = new_log();
    let mut history = History::new();
    history
        .execute(Recorded {
            name: "a",
            log: log.clone(),
            fail: false,
        })
        .unwrap();
    assert_eq!(take(&log), vec!["redo:a"]);
    assert_eq!(history.pending_len(), 1);

    let result = history.execute(Recorded {
        name: "b",
        log: log.clone(),
        fail: true,
    });
    assert_eq!(result, Err(CommandError::ExpiredTarget));
    assert_eq!(history.pending_len(), 1);
}

#[test]
fn test_history_limit_keeps_newest_groups() {
    let log = new_log();
    let mut history = History::with_config(HistoryConfig {
        max_groups: Some(2),
        ..HistoryConfig::default()
    });
    for name in ["a", "b", "c"] {
        history.record(vec![Recorded::new(name, &log)]);
    }
    assert_eq!(history.len(), 2);

    while history.undo() {}
    assert_eq!(
        take(&log),
        vec!["undo:c", "modified:c", "undo:b", "modified:b"]
    );
}

#[test]
fn test_clear_releases_everything() {
    let log = new_log();
    let mut history = History::new();
    history.record(vec![Recorded::new("a", &log)]);
    history.add_boxed(Recorded::new("b", &log));
    history.clear();

    assert!(history.is_empty());
    assert_eq!(history.cursor(), 0);
    assert_eq!(history.pending_len(), 0);
    assert!(!history.can_undo());
    assert_eq!(Rc::strong_count(&log), 1);
}
