// Undo/redo history for the editor.

use tracing::{debug, info, trace, warn};

use easel_canvas::{Canvas, CanvasError, HISTORY_JSON_KEYS, WORKSPACE_NAME};

use crate::{HistoryConfig, HistoryError, SavePayload, SaveSink, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}

/// A restore that has been started but not yet committed.
///
/// Obtained from [`History::begin_undo`] / [`History::begin_redo`] and handed
/// back to [`History::complete_restore`] once the canvas finished loading.
#[derive(Debug)]
#[must_use = "a started restore blocks history until it is completed"]
pub struct Restore {
    direction: Direction,
    from: usize,
    target: usize,
    snapshot: Snapshot,
}

impl Restore {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

#[derive(Debug, Clone, Default)]
pub struct History {
    states: Vec<Snapshot>,
    cursor: usize,
    restoring: bool,
    config: HistoryConfig,
}

impl History {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            states: Vec::new(),
            cursor: 0,
            restoring: false,
            config,
        }
    }

    /// Forget everything and start over from the canvas as it is now.
    ///
    /// The save sink is not involved: the state being seeded is already persisted.
    pub fn reset<C: Canvas + ?Sized>(&mut self, canvas: &C) -> Result<(), HistoryError> {
        let json = canvas.serialize(HISTORY_JSON_KEYS)?;
        self.states = vec![Snapshot::new(json)];
        self.cursor = 0;
        self.restoring = false;
        info!("History reset to initial snapshot");
        Ok(())
    }

    /// Record the canvas state and report it to `sink`.
    ///
    /// With `skip` set, or while a restore is in flight, nothing is pushed;
    /// the sink is still called exactly once.
    pub fn capture<C, S>(&mut self, canvas: &C, skip: bool, sink: &mut S) -> Result<(), HistoryError>
    where
        C: Canvas + ?Sized,
        S: SaveSink + ?Sized,
    {
        let json = canvas.serialize(HISTORY_JSON_KEYS)?;

        if !skip && !self.restoring {
            self.push(Snapshot::new(json.clone()));
        } else {
            trace!(skip, restoring = self.restoring, "Capture not recorded");
        }

        let (width, height) = match canvas.find_object_by_name(WORKSPACE_NAME) {
            Some(ws) => (ws.width, ws.height),
            None => {
                warn!("Workspace object not found, saving with 0x0 dimensions");
                (0.0, 0.0)
            }
        };

        sink.save(SavePayload { json, width, height });
        Ok(())
    }

    fn push(&mut self, snapshot: Snapshot) {
        if self.config.truncate_redo_on_new_action && self.cursor + 1 < self.states.len() {
            let dropped = self.states.len() - self.cursor - 1;
            self.states.truncate(self.cursor + 1);
            debug!(dropped, "Truncated redo history");
        }

        self.states.push(snapshot);

        if let Some(max) = self.config.max_states.filter(|&m| m > 0) {
            if self.states.len() > max {
                let excess = self.states.len() - max;
                self.states.drain(..excess);
                trace!(excess, "Dropped oldest snapshots");
            }
        }

        self.cursor = self.states.len() - 1;
        debug!(cursor = self.cursor, len = self.states.len(), "Snapshot recorded");
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.states.len()
    }

    /// Start stepping back. `None` at the start of history or while a restore is in flight.
    pub fn begin_undo(&mut self) -> Option<Restore> {
        if !self.can_undo() {
            return None;
        }
        self.begin(Direction::Undo, self.cursor - 1)
    }

    /// Start stepping forward. `None` at the end of history or while a restore is in flight.
    pub fn begin_redo(&mut self) -> Option<Restore> {
        if !self.can_redo() {
            return None;
        }
        self.begin(Direction::Redo, self.cursor + 1)
    }

    fn begin(&mut self, direction: Direction, target: usize) -> Option<Restore> {
        if self.restoring {
            debug!(?direction, "Restore already in flight, ignoring");
            return None;
        }
        let snapshot = self.states.get(target)?.clone();
        self.restoring = true;
        trace!(?direction, from = self.cursor, to = target, "Restore started");
        Some(Restore {
            direction,
            from: self.cursor,
            target,
            snapshot,
        })
    }

    /// Finish a restore. The cursor moves to the target only if `outcome` is `Ok`.
    pub fn complete_restore(
        &mut self,
        restore: Restore,
        outcome: Result<(), CanvasError>,
    ) -> Result<usize, HistoryError> {
        let was_restoring = std::mem::replace(&mut self.restoring, false);
        if !was_restoring || restore.from != self.cursor || restore.target >= self.states.len() {
            warn!(index = restore.target, "Discarding stale restore");
            return Err(HistoryError::StaleRestore {
                index: restore.target,
            });
        }

        match outcome {
            Ok(()) => {
                self.cursor = restore.target;
                debug!(direction = ?restore.direction, cursor = self.cursor, "Restore committed");
                Ok(self.cursor)
            }
            Err(source) => Err(HistoryError::Load {
                index: restore.target,
                source,
            }),
        }
    }

    /// Step back one snapshot. Returns `false` when there was nothing to do.
    pub fn undo<C: Canvas + ?Sized>(&mut self, canvas: &mut C) -> Result<bool, HistoryError> {
        match self.begin_undo() {
            Some(restore) => self.apply(canvas, restore).map(|_| true),
            None => Ok(false),
        }
    }

    /// Step forward one snapshot. Returns `false` when there was nothing to do.
    pub fn redo<C: Canvas + ?Sized>(&mut self, canvas: &mut C) -> Result<bool, HistoryError> {
        match self.begin_redo() {
            Some(restore) => self.apply(canvas, restore).map(|_| true),
            None => Ok(false),
        }
    }

    fn apply<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        restore: Restore,
    ) -> Result<usize, HistoryError> {
        canvas.clear();
        canvas.render_all();

        let outcome = canvas.load_from_serialized(restore.snapshot.as_str());
        match &outcome {
            Ok(()) => canvas.render_all(),
            Err(err) => {
                warn!(index = restore.target, "Snapshot failed to load: {}", err);
                self.reload_current(canvas);
            }
        }

        self.complete_restore(restore, outcome)
    }

    // Put the canvas back on the snapshot under the cursor after a failed load.
    fn reload_current<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        if let Some(current) = self.current() {
            if let Err(err) = canvas.load_from_serialized(current.as_str()) {
                warn!(cursor = self.cursor, "Current snapshot failed to reload: {}", err);
            }
            canvas.render_all();
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Snapshot under the cursor.
    pub fn current(&self) -> Option<&Snapshot> {
        self.states.get(self.cursor)
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.states.get(index)
    }

    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_canvas::{CanvasObject, Document, ShapePreset};

    fn doc_with(n: usize) -> Document {
        let mut doc = Document::with_workspace(500.0, 400.0);
        for _ in 0..n {
            doc.add(CanvasObject::from_preset(ShapePreset::Circle));
        }
        doc
    }

    fn record(history: &mut History, doc: &Document) -> Vec<SavePayload> {
        let mut saved = Vec::new();
        history
            .capture(doc, false, &mut |p: SavePayload| saved.push(p))
            .unwrap();
        saved
    }

    #[test]
    fn test_captures_advance_cursor() {
        let mut history = History::default();
        for n in 0..5 {
            record(&mut history, &doc_with(n));
            assert_eq!(history.len(), n + 1);
            assert_eq!(history.cursor(), n);
        }
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_history_cannot_move() {
        let mut history = History::default();
        let mut doc = doc_with(0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(!history.undo(&mut doc).unwrap());
        assert!(!history.redo(&mut doc).unwrap());
    }

    #[test]
    fn test_skip_capture_does_not_push_but_saves() {
        let mut history = History::default();
        let doc = doc_with(1);
        record(&mut history, &doc);

        let mut calls = 0;
        history
            .capture(&doc_with(2), true, &mut |_p: SavePayload| calls += 1)
            .unwrap();

        assert_eq!(calls, 1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn test_payload_carries_workspace_size() {
        let mut history = History::default();
        let saved = record(&mut history, &doc_with(1));
        assert_eq!(saved.len(), 1);
        assert_eq!((saved[0].width, saved[0].height), (500.0, 400.0));
        assert_eq!(Some(saved[0].json.as_str()), history.current().map(|s| s.as_str()));
    }

    #[test]
    fn test_missing_workspace_reports_zero() {
        let mut history = History::default();
        let mut doc = Document::new();
        doc.add(CanvasObject::from_preset(ShapePreset::Triangle));
        let saved = record(&mut history, &doc);
        assert_eq!((saved[0].width, saved[0].height), (0.0, 0.0));
    }

    #[test]
    fn test_new_action_truncates_redo_by_default() {
        let mut history = History::default();
        let mut doc = doc_with(0);
        for n in 0..3 {
            record(&mut history, &doc_with(n));
        }
        history.undo(&mut doc).unwrap();
        history.undo(&mut doc).unwrap();
        record(&mut history, &doc_with(7));

        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), 1);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_new_action_appends_when_truncation_disabled() {
        let mut history = History::new(HistoryConfig {
            truncate_redo_on_new_action: false,
            max_states: None,
        });
        let mut doc = doc_with(0);
        for n in 0..3 {
            record(&mut history, &doc_with(n));
        }
        history.undo(&mut doc).unwrap();
        record(&mut history, &doc_with(7));

        assert_eq!(history.len(), 4);
        assert_eq!(history.cursor(), 3);
    }

    #[test]
    fn test_max_states_drops_oldest() {
        let mut history = History::new(HistoryConfig {
            truncate_redo_on_new_action: true,
            max_states: Some(3),
        });
        for n in 0..5 {
            record(&mut history, &doc_with(n));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 2);
        let oldest = doc_with(2).serialize(HISTORY_JSON_KEYS).unwrap();
        assert_eq!(history.get(0).map(|s| s.as_str()), Some(oldest.as_str()));
    }

    #[test]
    fn test_in_flight_restore_blocks_moves_and_pushes() {
        let mut history = History::default();
        for n in 0..3 {
            record(&mut history, &doc_with(n));
        }

        let restore = history.begin_undo().unwrap();
        assert!(history.is_restoring());
        assert!(history.begin_undo().is_none());
        assert!(history.begin_redo().is_none());

        let saved = record(&mut history, &doc_with(9));
        assert_eq!(saved.len(), 1);
        assert_eq!(history.len(), 3);

        assert_eq!(history.complete_restore(restore, Ok(())).unwrap(), 1);
        assert!(!history.is_restoring());
    }

    #[test]
    fn test_failed_restore_keeps_cursor() {
        let mut history = History::default();
        record(&mut history, &doc_with(1));
        history.states.insert(0, Snapshot::new("{ broken"));
        history.cursor = 1;

        let mut doc = doc_with(1);
        let before = doc.objects().to_vec();
        let err = history.undo(&mut doc).unwrap_err();

        assert!(matches!(err, HistoryError::Load { index: 0, .. }));
        assert_eq!(history.cursor(), 1);
        assert!(!history.is_restoring());
        assert_eq!(doc.objects(), before.as_slice());
    }

    #[test]
    fn test_stale_restore_rejected() {
        let mut history = History::default();
        for n in 0..2 {
            record(&mut history, &doc_with(n));
        }
        let restore = history.begin_undo().unwrap();
        history.reset(&doc_with(0)).unwrap();
        assert!(matches!(
            history.complete_restore(restore, Ok(())),
            Err(HistoryError::StaleRestore { .. })
        ));
    }

    #[test]
    fn test_reset_seeds_single_snapshot() {
        let mut history = History::default();
        for n in 0..4 {
            record(&mut history, &doc_with(n));
        }
        history.reset(&doc_with(0)).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), 0);
        assert!(!history.can_undo());
    }
}
