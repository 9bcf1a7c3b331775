use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::{Mutex, RwLock};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionEntry {
    pub date: NaiveDate,
    pub weights: Vec<f64>,
}

/// Exercise id -> sessions in append order.
pub type HistorySnapshot = HashMap<String, Vec<SessionEntry>>;

pub trait HistoryStore: Send + Sync {
    fn record_session(&self, exercise_id: &str, date: NaiveDate, weights: Vec<f64>);
    fn snapshot(&self) -> HistorySnapshot;
}

/// Append-only weight log. Each exercise id owns its own lock, so appends for
/// different exercises never contend and a list is never observed half-written.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    entries: RwLock<HashMap<String, Arc<Mutex<Vec<SessionEntry>>>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, exercise_id: &str) -> Arc<Mutex<Vec<SessionEntry>>> {
        if let Some(existing) = self.entries.read().get(exercise_id) {
            return Arc::clone(existing);
        }

        let mut entries = self.entries.write();
        Arc::clone(entries.entry(exercise_id.to_string()).or_default())
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn record_session(&self, exercise_id: &str, date: NaiveDate, weights: Vec<f64>) {
        let slot = self.slot(exercise_id);
        slot.lock().push(SessionEntry { date, weights });

        tracing::debug!(%exercise_id, %date, "history.session_recorded");
    }

    fn snapshot(&self) -> HistorySnapshot {
        let slots: Vec<(String, Arc<Mutex<Vec<SessionEntry>>>)> = self
            .entries
            .read()
            .iter()
            .map(|(id, slot)| (id.clone(), Arc::clone(slot)))
            .collect();

        slots
            .into_iter()
            .map(|(id, slot)| {
                let sessions = slot.lock().clone();
                (id, sessions)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use pretty_assertions::assert_eq;

    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_record_session_appends_in_order() {
        let store = InMemoryHistoryStore::new();
        store.record_session("bench-press", date(1), vec![100.0]);
        store.record_session("bench-press", date(3), vec![102.5]);
        store.record_session("squat", date(2), vec![140.0, 140.0]);

        let snapshot = store.snapshot();

        assert_eq!(
            snapshot["bench-press"],
            vec![
                SessionEntry {
                    date: date(1),
                    weights: vec![100.0]
                },
                SessionEntry {
                    date: date(3),
                    weights: vec![102.5]
                },
            ]
        );
        assert_eq!(snapshot["squat"].len(), 1);
    }

    #[test]
    fn test_snapshot_is_detached_from_later_writes() {
        let store = InMemoryHistoryStore::new();
        store.record_session("row", date(1), vec![60.0]);

        let snapshot = store.snapshot();
        store.record_session("row", date(2), vec![62.5]);

        assert_eq!(snapshot["row"].len(), 1);
        assert_eq!(store.snapshot()["row"].len(), 2);
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let store = Arc::new(InMemoryHistoryStore::new());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..50 {
                        let id = if i % 2 == 0 { "deadlift" } else { "press" };
                        store.record_session(id, date(1), vec![f64::from(worker)]);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = store.snapshot();
        assert_eq!(snapshot["deadlift"].len(), 200);
        assert_eq!(snapshot["press"].len(), 200);
    }
}
