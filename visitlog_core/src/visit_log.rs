//! Serialized access to the visitor log.
//!
//! [`VisitLog`] is the only component that reads or writes the store on
//! behalf of the front ends. Registrations run as one load-apply-save cycle
//! under an in-process mutex and the store's exclusive file lock, so two
//! concurrent entries can never be assigned the same id.

use crate::report::{DataFeed, Summary};
use crate::{apply_event, Clock, CsvStore, ExitPolicy, Outcome, Result, VisitEvent, VisitRecord};
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::sync::Arc;

pub struct VisitLog {
    store: CsvStore,
    clock: Arc<dyn Clock>,
    policy: ExitPolicy,
    write_guard: Mutex<()>,
}

impl VisitLog {
    pub fn new(store: CsvStore, clock: Arc<dyn Clock>, policy: ExitPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
            write_guard: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &CsvStore {
        &self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Apply an entry or exit and persist the result
    pub fn register(&self, event: &VisitEvent) -> Result<Outcome> {
        let _guard = self.write_guard.lock();
        let lock = self.store.lock_exclusive()?;

        let mut records = self.store.load_locked(&lock)?;
        let outcome = apply_event(&mut records, event, self.clock.now(), self.policy);
        if outcome.mutated() {
            self.store.save(&records)?;
        }
        Ok(outcome)
    }

    pub fn records(&self) -> Result<Vec<VisitRecord>> {
        let _guard = self.write_guard.lock();
        self.store.load()
    }

    /// Dashboard statistics, zeroed if the log cannot be read
    pub fn summary(&self, top_n: usize) -> Summary {
        match self.records() {
            Ok(records) => Summary::from_records(&records, self.today(), top_n),
            Err(e) => {
                tracing::warn!(
                    "Unable to read visitor log {:?}: {}. Showing empty statistics.",
                    self.store.path(),
                    e
                );
                Summary::empty()
            }
        }
    }

    pub fn feed(&self, latest_n: usize) -> Result<DataFeed> {
        let records = self.records()?;
        Ok(DataFeed::from_records(&records, latest_n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedClock;
    use chrono::NaiveDateTime;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn visit_log(dir: &std::path::Path) -> VisitLog {
        VisitLog::new(
            CsvStore::new(dir.join("dados_acesso.csv")),
            Arc::new(FixedClock(noon())),
            ExitPolicy::CloseAll,
        )
    }

    #[test]
    fn test_register_persists_between_handles() {
        let temp_dir = tempfile::tempdir().unwrap();

        let log = visit_log(temp_dir.path());
        log.register(&VisitEvent::entry("Alice", "111", "Acme", "Floor2"))
            .unwrap();

        let reopened = visit_log(temp_dir.path());
        let records = reopened.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entry_date, noon().date());
        assert_eq!(records[0].entry_time, noon().time());

        let outcome = reopened.register(&VisitEvent::exit("Alice", "111")).unwrap();
        assert_eq!(outcome.to_string(), "Exit registered for Alice");
        assert_eq!(log.summary(10).present_count, 0);
    }

    #[test]
    fn test_unmatched_exit_leaves_file_untouched() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = visit_log(temp_dir.path());
        log.register(&VisitEvent::entry("Alice", "111", "Acme", "Floor2"))
            .unwrap();

        let before = std::fs::read_to_string(log.store().path()).unwrap();
        let outcome = log.register(&VisitEvent::exit("Bob", "222")).unwrap();
        let after = std::fs::read_to_string(log.store().path()).unwrap();

        assert!(!outcome.mutated());
        assert_eq!(before, after);
    }

    #[test]
    fn test_concurrent_entries_get_unique_ids() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = Arc::new(visit_log(temp_dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    log.register(&VisitEvent::entry(
                        format!("Visitor {}", i),
                        format!("{}", i),
                        "Acme",
                        "Lobby",
                    ))
                    .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut ids: Vec<u64> = log.records().unwrap().iter().map(|r| r.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=8).collect::<Vec<u64>>());
    }

    #[test]
    fn test_summary_degrades_on_corrupt_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = visit_log(temp_dir.path());
        std::fs::write(log.store().path(), "id,nome\nnot,a,valid,row\n").unwrap();

        assert_eq!(log.summary(10), Summary::empty());
        assert!(log.feed(10).is_err());
        assert!(log
            .register(&VisitEvent::entry("Alice", "111", "Acme", "Floor2"))
            .is_err());
    }
}
