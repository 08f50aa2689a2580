use log::{debug, trace, warn};

use super::{Command, CommandResult, TrackGuard};
use crate::config::HistoryConfig;
use crate::value_cache::ValueCache;

/// Where a [`History::record`] call left its group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupHandle {
    index: usize,
    frame: u64,
    recorded: bool,
}

impl GroupHandle {
    /// Position of the group in the history (the cursor when nothing was recorded)
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// False when tracking was disabled or the command list was empty
    pub fn is_recorded(&self) -> bool {
        self.recorded
    }
}

/// Outcome of replaying one group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub applied: usize,
    pub failed: usize,
}

impl ReplayReport {
    /// Some commands applied and some did not
    pub fn is_partial(&self) -> bool {
        self.applied > 0 && self.failed > 0
    }

    /// Nothing applied
    pub fn is_inert(&self) -> bool {
        self.applied == 0
    }
}

/// Commands produced within one edit step, undone and redone together
#[derive(Debug)]
pub struct CommandGroup {
    commands: Vec<Box<dyn Command>>,
    frame: u64,
}

impl CommandGroup {
    /// Frame the group was sealed in
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> impl Iterator<Item = &dyn Command> + '_ {
        self.commands.iter().map(|command| command.as_ref())
    }

    fn undo(&mut self) -> ReplayReport {
        let mut succeeded = vec![false; self.commands.len()];
        for (index, command) in self.commands.iter_mut().enumerate().rev() {
            succeeded[index] = Self::check(command.undo(), &**command);
        }
        self.notify(&succeeded)
    }

    fn redo(&mut self) -> ReplayReport {
        let succeeded: Vec<bool> = self
            .commands
            .iter_mut()
            .map(|command| Self::check(command.redo(), &**command))
            .collect();
        self.notify(&succeeded)
    }

    fn check(result: CommandResult, command: &dyn Command) -> bool {
        match result {
            Ok(()) => true,
            Err(error) => {
                debug!("{:?} was not applied: {}", command, error);
                false
            }
        }
    }

    /// Fire `on_modified` in insertion order for every command that applied
    fn notify(&mut self, succeeded: &[bool]) -> ReplayReport {
        let mut report = ReplayReport::default();
        for (command, &ok) in self.commands.iter_mut().zip(succeeded) {
            if ok {
                command.on_modified();
                report.applied += 1;
            } else {
                report.failed += 1;
            }
        }
        report
    }
}

/// Ordered list of command groups with a cursor.
///
/// Groups before the cursor can be undone, groups at or after it can be
/// redone. Recording while the cursor is not at the end discards the redo
/// branch.
#[derive(Debug)]
pub struct History {
    groups: Vec<CommandGroup>,
    cursor: usize,
    tracking: bool,
    /// Commands added during the current frame
    pending: Vec<Box<dyn Command>>,
    frame: u64,
    /// In-flight continuous-edit trackers
    working_values: ValueCache,
    config: HistoryConfig,
    last_replay: Option<ReplayReport>,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            groups: Vec::new(),
            cursor: 0,
            tracking: true,
            pending: Vec::new(),
            frame: 0,
            working_values: ValueCache::new(config.expire_frames),
            config,
            last_replay: None,
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Append `commands` as one group at the cursor.
    ///
    /// Does nothing when tracking is disabled or `commands` is empty; the
    /// returned handle reports whether a group was recorded.
    pub fn record(&mut self, commands: Vec<Box<dyn Command>>) -> GroupHandle {
        if !self.tracking || commands.is_empty() {
            trace!("not recording {} commands", commands.len());
            return GroupHandle {
                index: self.cursor,
                frame: self.frame,
                recorded: false,
            };
        }

        self.groups.truncate(self.cursor);
        debug!("recording group of {} commands at {}", commands.len(), self.cursor);
        self.groups.push(CommandGroup {
            commands,
            frame: self.frame,
        });
        self.cursor += 1;

        if let Some(limit) = self.config.max_groups {
            let limit = limit.max(1);
            if self.groups.len() > limit {
                let excess = self.groups.len() - limit;
                self.groups.drain(..excess);
                self.cursor -= excess;
            }
        }

        GroupHandle {
            index: self.cursor - 1,
            frame: self.frame,
            recorded: true,
        }
    }

    /// Undo the group before the cursor. Returns false if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        let skip_inert = self.config.skip_inert_groups;
        let mut history = self.suspend_tracking();
        history.working_values.clear();

        let mut report = ReplayReport::default();
        while history.cursor > 0 {
            history.cursor -= 1;
            let index = history.cursor;
            report = history.groups[index].undo();
            if !(skip_inert && report.is_inert()) {
                break;
            }
            trace!("skipping inert group {} on undo", index);
        }
        history.finish_replay("undo", report);
        true
    }

    /// Redo the group at the cursor. Returns false if there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        let skip_inert = self.config.skip_inert_groups;
        let mut history = self.suspend_tracking();
        history.working_values.clear();

        let mut report = ReplayReport::default();
        while history.cursor < history.groups.len() {
            let index = history.cursor;
            report = history.groups[index].redo();
            history.cursor += 1;
            if !(skip_inert && report.is_inert()) {
                break;
            }
            trace!("skipping inert group {} on redo", index);
        }
        history.finish_replay("redo", report);
        true
    }

    fn finish_replay(&mut self, direction: &str, report: ReplayReport) {
        if report.failed > 0 {
            warn!(
                "{} applied {} of {} commands",
                direction,
                report.applied,
                report.applied + report.failed
            );
        }
        self.last_replay = Some(report);
    }

    /// Drop every group, pending command and tracker
    pub fn clear(&mut self) {
        debug!("clearing {} groups", self.groups.len());
        self.groups.clear();
        self.pending.clear();
        self.working_values.clear();
        self.cursor = 0;
        self.last_replay = None;
    }

    pub fn set_tracking_enabled(&mut self, enabled: bool) {
        self.tracking = enabled;
    }

    pub fn is_tracking_enabled(&self) -> bool {
        self.tracking
    }

    /// Disable tracking until the returned guard is dropped
    pub fn suspend_tracking(&mut self) -> TrackGuard<'_> {
        TrackGuard::new(self, false)
    }

    /// Queue a command for the group sealed by the next [`History::end_frame`]
    pub fn add<C: Command + 'static>(&mut self, command: C) {
        self.add_boxed(Box::new(command));
    }

    pub fn add_boxed(&mut self, command: Box<dyn Command>) {
        if !self.tracking {
            trace!("tracking disabled, dropping {:?}", command);
            return;
        }
        self.pending.push(command);
    }

    /// Apply a command that was captured before its edit, then queue it
    pub fn execute<C: Command + 'static>(&mut self, mut command: C) -> CommandResult {
        command.redo()?;
        self.add(command);
        Ok(())
    }

    /// Seal the commands added this frame into one group and start the next frame.
    ///
    /// Returns the handle of the sealed group, or `None` if nothing was pending.
    pub fn end_frame(&mut self) -> Option<GroupHandle> {
        let pending = std::mem::take(&mut self.pending);
        let handle = (!pending.is_empty()).then(|| self.record(pending));
        self.frame += 1;
        self.working_values.expire(self.frame);
        handle
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.groups.len()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Report of the most recent undo or redo
    pub fn last_replay(&self) -> Option<ReplayReport> {
        self.last_replay
    }

    pub fn group(&self, index: usize) -> Option<&CommandGroup> {
        self.groups.get(index)
    }

    /// Number of continuous-edit trackers currently held
    pub fn tracked_value_count(&self) -> usize {
        self.working_values.len()
    }

    pub(super) fn working_values_mut(&mut self) -> &mut ValueCache {
        &mut self.working_values
    }

    pub(super) fn push_pending(&mut self, command: Box<dyn Command>) {
        self.add_boxed(command);
    }
}
