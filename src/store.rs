//! Annotation storage with snapshot undo.

use std::collections::HashSet;
use std::fmt;

use annotrace_vision::Point;

use crate::error::Result;
use crate::model::{Annotation, AnnotationId, Shape};
use crate::undo::UndoHistory;

/// Callback invoked with the full annotation sequence after every change.
pub type ChangeListener = Box<dyn FnMut(&[Annotation])>;

/// Annotations for the currently loaded image.
///
/// Insertion order is z-order: later annotations are drawn on top and win
/// hit tests. Every mutation except undo pushes a copy of the previous
/// sequence onto the history first.
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    history: UndoHistory<Vec<Annotation>>,
    /// Counter for generating unique annotation IDs. Lives outside the
    /// snapshots so an id is never handed out twice, even after undo.
    next_id: AnnotationId,
    selected_id: Option<AnnotationId>,
    /// Set when annotations or selection change. Used to avoid rebuilding
    /// the scene on every frame.
    dirty: bool,
    listener: Option<ChangeListener>,
}

impl fmt::Debug for AnnotationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationStore")
            .field("annotations", &self.annotations)
            .field("history_len", &self.history.len())
            .field("next_id", &self.next_id)
            .field("selected_id", &self.selected_id)
            .field("dirty", &self.dirty)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::with_history_limit(None)
    }

    /// Create a store whose undo history keeps at most `limit` snapshots.
    pub fn with_history_limit(limit: Option<usize>) -> Self {
        Self {
            annotations: Vec::new(),
            history: UndoHistory::with_limit(limit),
            next_id: 1,
            selected_id: None,
            dirty: true, // Start dirty so the first scene build happens
            listener: None,
        }
    }

    /// Register the callback notified after every change of the sequence.
    pub fn set_change_listener(&mut self, listener: impl FnMut(&[Annotation]) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_change_listener(&mut self) {
        self.listener = None;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag. Call after rebuilding the scene.
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Number of snapshots available to undo.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Add an annotation and return its ID.
    pub fn add(&mut self, shape: Shape) -> AnnotationId {
        self.push_undo_point();
        let id = self.allocate_id();
        log::info!("Added {} annotation #{}", shape.kind(), id);
        self.annotations.push(Annotation::new(id, shape));
        self.changed();
        id
    }

    /// Remove the selected annotation. Returns false when nothing is selected.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selected_id else {
            return false;
        };
        let Some(index) = self.annotations.iter().position(|a| a.id == id) else {
            self.selected_id = None;
            return false;
        };

        self.push_undo_point();
        self.annotations.remove(index);
        self.selected_id = None;
        log::info!("Deleted annotation #{}", id);
        self.changed();
        true
    }

    /// Remove every annotation. Returns false when the store was already empty.
    pub fn clear_all(&mut self) -> bool {
        if self.annotations.is_empty() {
            return false;
        }

        self.push_undo_point();
        let count = self.annotations.len();
        self.annotations.clear();
        self.selected_id = None;
        log::info!("Cleared {} annotations", count);
        self.changed();
        true
    }

    /// Set or clear the label of an annotation. Returns false for unknown ids.
    pub fn set_label(&mut self, id: AnnotationId, label: Option<String>) -> bool {
        let Some(index) = self.annotations.iter().position(|a| a.id == id) else {
            return false;
        };
        if self.annotations[index].label == label {
            return false;
        }

        self.push_undo_point();
        self.annotations[index].label = label;
        log::debug!("Relabelled annotation #{}", id);
        self.changed();
        true
    }

    /// Restore the most recent snapshot. Returns false when history is empty.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.pop() else {
            log::debug!("Nothing to undo");
            return false;
        };

        self.annotations = previous;
        self.selected_id = None;
        log::debug!(
            "Undo: {} annotations, {} snapshots left",
            self.annotations.len(),
            self.history.len()
        );
        self.changed();
        true
    }

    /// Select an annotation, or clear the selection with None.
    /// Unknown ids are ignored.
    pub fn select(&mut self, id: Option<AnnotationId>) {
        if self.selected_id == id {
            return;
        }
        if let Some(unknown) = id.filter(|id| self.get(*id).is_none()) {
            log::debug!("Ignoring selection of unknown annotation #{}", unknown);
            return;
        }
        self.selected_id = id;
        self.dirty = true;
    }

    pub fn selected(&self) -> Option<AnnotationId> {
        self.selected_id
    }

    /// Find the topmost annotation containing a point.
    pub fn hit_test(&self, point: Point) -> Option<AnnotationId> {
        self.annotations
            .iter()
            .rev()
            .find(|a| a.shape.contains(point))
            .map(|a| a.id)
    }

    /// Replace the contents with annotations loaded from elsewhere.
    ///
    /// History is reset and new ids continue after the largest loaded id.
    /// An annotation repeating an earlier id gets a fresh one.
    pub fn load(&mut self, annotations: Vec<Annotation>) {
        let max_id = annotations.iter().map(|a| a.id).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id.saturating_add(1));

        self.annotations = annotations;
        let mut seen = HashSet::with_capacity(self.annotations.len());
        for index in 0..self.annotations.len() {
            let id = self.annotations[index].id;
            if !seen.insert(id) {
                let fresh = self.allocate_id();
                log::warn!("Duplicate annotation id #{} renumbered to #{}", id, fresh);
                self.annotations[index].id = fresh;
                seen.insert(fresh);
            }
        }
        self.history.clear();
        self.selected_id = None;
        log::debug!("Loaded {} annotations", self.annotations.len());
        self.changed();
    }

    /// Drop all annotations and history, e.g. when another image is opened.
    /// The id counter keeps running.
    pub fn reset(&mut self) {
        self.history.clear();
        self.selected_id = None;
        if !self.annotations.is_empty() {
            self.annotations.clear();
            self.changed();
        }
    }

    /// Export annotations to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.annotations)?)
    }

    /// Export annotations to a compact JSON string.
    pub fn to_json_compact(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.annotations)?)
    }

    /// Parse an annotation array produced by [`AnnotationStore::to_json`].
    pub fn parse_json(json: &str) -> Result<Vec<Annotation>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Next unused id. Ids are not reused until the counter runs out, after
    /// which the lowest id not currently in the store is handed out.
    fn allocate_id(&mut self) -> AnnotationId {
        let id = self.next_id;
        match id.checked_add(1) {
            Some(next) => {
                self.next_id = next;
                id
            }
            None => {
                log::warn!("Annotation id counter exhausted, reusing free ids");
                self.lowest_free_id()
            }
        }
    }

    fn lowest_free_id(&self) -> AnnotationId {
        let used: HashSet<AnnotationId> = self.annotations.iter().map(|a| a.id).collect();
        (1..AnnotationId::MAX)
            .find(|id| !used.contains(id))
            .unwrap_or(AnnotationId::MAX)
    }

    fn push_undo_point(&mut self) {
        self.history.push(self.annotations.clone());
        log::debug!("Pushed undo point ({} in history)", self.history.len());
    }

    fn changed(&mut self) {
        self.dirty = true;
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.annotations);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, ShapeKind};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn bbox(x: f32, y: f32, w: f32, h: f32) -> Shape {
        Shape::BoundingBox(BoundingBox::new(x, y, w, h))
    }

    #[test]
    fn test_add_assigns_increasing_ids() {
        let mut store = AnnotationStore::new();
        let a = store.add(bbox(0.0, 0.0, 20.0, 20.0));
        let b = store.add(bbox(5.0, 5.0, 20.0, 20.0));
        assert!(b > a);
        assert_eq!(store.len(), 2);
        assert_eq!(store.history_len(), 2);
    }

    #[test]
    fn test_undo_restores_each_snapshot() {
        let mut store = AnnotationStore::new();
        store.add(bbox(0.0, 0.0, 20.0, 20.0));
        let after_first = store.annotations().to_vec();
        store.add(bbox(30.0, 0.0, 20.0, 20.0));
        store.select(store.hit_test(Point::new(35.0, 5.0)));
        store.delete_selected();

        assert!(store.undo());
        assert_eq!(store.len(), 2);
        assert!(store.undo());
        assert_eq!(store.annotations(), after_first.as_slice());
        assert!(store.undo());
        assert!(store.is_empty());
        assert!(!store.undo());
    }

    #[test]
    fn test_ids_not_reused_after_undo() {
        let mut store = AnnotationStore::new();
        let first = store.add(bbox(0.0, 0.0, 20.0, 20.0));
        store.undo();
        let second = store.add(bbox(0.0, 0.0, 20.0, 20.0));
        assert_ne!(first, second);
    }

    #[test]
    fn test_delete_without_selection_is_noop() {
        let mut store = AnnotationStore::new();
        store.add(bbox(0.0, 0.0, 20.0, 20.0));
        assert!(!store.delete_selected());
        assert_eq!(store.history_len(), 1);
    }

    #[test]
    fn test_delete_clears_selection() {
        let mut store = AnnotationStore::new();
        let id = store.add(bbox(0.0, 0.0, 20.0, 20.0));
        store.select(Some(id));
        assert!(store.delete_selected());
        assert_eq!(store.selected(), None);
        assert!(store.is_empty());
        assert_eq!(store.history_len(), 2);
    }

    #[test]
    fn test_clear_empty_store_is_noop() {
        let mut store = AnnotationStore::new();
        assert!(!store.clear_all());
        assert_eq!(store.history_len(), 0);

        store.add(bbox(0.0, 0.0, 20.0, 20.0));
        assert!(store.clear_all());
        assert!(store.is_empty());
        assert!(store.undo());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_undo_clears_selection() {
        let mut store = AnnotationStore::new();
        let id = store.add(bbox(0.0, 0.0, 20.0, 20.0));
        store.add(bbox(50.0, 0.0, 20.0, 20.0));
        store.select(Some(id));
        store.undo();
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut store = AnnotationStore::new();
        store.add(bbox(0.0, 0.0, 100.0, 100.0));
        let top = store.add(bbox(20.0, 20.0, 30.0, 30.0));
        assert_eq!(store.hit_test(Point::new(25.0, 25.0)), Some(top));
        assert_eq!(store.hit_test(Point::new(200.0, 200.0)), None);
    }

    #[test]
    fn test_select_unknown_id_is_ignored() {
        let mut store = AnnotationStore::new();
        store.select(Some(42));
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn test_set_label_is_undoable() {
        let mut store = AnnotationStore::new();
        let id = store.add(bbox(0.0, 0.0, 20.0, 20.0));
        assert!(store.set_label(id, Some("cat".to_string())));
        assert_eq!(store.get(id).and_then(|a| a.label.as_deref()), Some("cat"));
        assert!(!store.set_label(id, Some("cat".to_string())));
        assert!(!store.set_label(99, None));

        store.undo();
        assert_eq!(store.get(id).and_then(|a| a.label.clone()), None);
    }

    #[test]
    fn test_listener_sees_every_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = AnnotationStore::new();
        let sink = Rc::clone(&seen);
        store.set_change_listener(move |annotations| sink.borrow_mut().push(annotations.len()));

        store.add(bbox(0.0, 0.0, 20.0, 20.0));
        store.add(bbox(30.0, 0.0, 20.0, 20.0));
        store.undo();
        store.clear_all();
        store.clear_all();

        assert_eq!(*seen.borrow(), vec![1, 2, 1, 0]);
    }

    #[test]
    fn test_history_limit() {
        let mut store = AnnotationStore::with_history_limit(Some(2));
        for i in 0..5 {
            store.add(bbox(i as f32 * 30.0, 0.0, 20.0, 20.0));
        }
        assert_eq!(store.history_len(), 2);
        assert!(store.undo());
        assert!(store.undo());
        assert!(!store.undo());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_json_round_trip_and_load() {
        let mut store = AnnotationStore::new();
        store.add(bbox(10.0, 10.0, 90.0, 70.0));
        let json = store.to_json().expect("export");

        let parsed = AnnotationStore::parse_json(&json).expect("parse");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].kind(), ShapeKind::Bbox);

        let mut other = AnnotationStore::new();
        other.load(parsed);
        assert_eq!(other.history_len(), 0);
        let next = other.add(bbox(0.0, 0.0, 20.0, 20.0));
        assert_eq!(next, 2);
    }

    #[test]
    fn test_load_renumbers_repeated_ids() {
        let mut store = AnnotationStore::new();
        store.load(vec![
            Annotation::new(5, bbox(0.0, 0.0, 20.0, 20.0)),
            Annotation::new(5, bbox(30.0, 0.0, 20.0, 20.0)),
            Annotation::new(2, bbox(60.0, 0.0, 20.0, 20.0)),
        ]);

        let ids: Vec<AnnotationId> = store.annotations().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![5, 6, 2]);
        assert_eq!(store.add(bbox(90.0, 0.0, 20.0, 20.0)), 7);
    }

    #[test]
    fn test_largest_possible_id_does_not_overflow() {
        let mut store = AnnotationStore::new();
        store.load(vec![
            Annotation::new(AnnotationId::MAX, bbox(0.0, 0.0, 20.0, 20.0)),
            Annotation::new(1, bbox(30.0, 0.0, 20.0, 20.0)),
        ]);

        let a = store.add(bbox(60.0, 0.0, 20.0, 20.0));
        let b = store.add(bbox(90.0, 0.0, 20.0, 20.0));
        assert_eq!((a, b), (2, 3));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_exhausted_counter_hands_out_free_ids() {
        let mut store = AnnotationStore::new();
        store.next_id = AnnotationId::MAX - 1;
        let last = store.add(bbox(0.0, 0.0, 20.0, 20.0));
        assert_eq!(last, AnnotationId::MAX - 1);

        let first = store.add(bbox(30.0, 0.0, 20.0, 20.0));
        let second = store.add(bbox(60.0, 0.0, 20.0, 20.0));
        assert_eq!((first, second), (1, 2));
    }
}
