//! Pattern-based reaping of leftover processes.

use crate::types::{ProcError, ProcessRecord, ProcessTable};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::io::Write;

/// Outcome of one reaping pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReapReport {
    /// Every PID that matched and was signaled, ascending.
    pub matched: Vec<i32>,
    /// PIDs whose SIGKILL was delivered.
    pub killed: Vec<i32>,
    /// PIDs whose SIGKILL failed, with the reason.
    pub failed: Vec<(i32, ProcError)>,
}

/// Kills every process whose command line contains all given patterns.
///
/// Matches and kills are reported line by line to `out`. The calling process
/// and its ancestors are never signaled, even when their command lines match.
pub struct Reaper<T, W> {
    table: T,
    out: W,
}

impl<T: ProcessTable, W: Write> Reaper<T, W> {
    pub fn new(table: T, out: W) -> Self {
        Self { table, out }
    }

    /// Kill all matching processes, returning the PIDs that were signaled.
    pub fn reap_matching<S: AsRef<str>>(&mut self, patterns: &[S]) -> Result<Vec<i32>, ProcError> {
        self.reap(patterns).map(|report| report.matched)
    }

    /// Kill all matching processes, returning the full report.
    ///
    /// An empty pattern set would match every process, so it reaps nothing
    /// and leaves the process table unread. Only a failure to read the
    /// process table is an error. A PID that cannot be signaled is recorded
    /// in [`ReapReport::failed`] and the pass carries on with the rest.
    pub fn reap<S: AsRef<str>>(&mut self, patterns: &[S]) -> Result<ReapReport, ProcError> {
        if patterns.is_empty() {
            tracing::warn!("no patterns given, not killing anything");
            return Ok(ReapReport::default());
        }

        let processes = self.table.list_processes()?;
        let protected = self.protected_pids(&processes);

        let matched: BTreeSet<i32> = processes
            .iter()
            .filter(|p| p.matches_all(patterns))
            .filter(|p| {
                let keep = !protected.contains(&p.pid);
                if !keep {
                    tracing::debug!(pid = p.pid, "skipping own process or ancestor");
                }
                keep
            })
            .map(|p| p.pid)
            .collect();

        let mut report = ReapReport {
            matched: matched.into_iter().collect(),
            ..ReapReport::default()
        };
        if report.matched.is_empty() {
            tracing::info!("no matching processes");
            return Ok(report);
        }

        self.report(format_args!(
            "Found matching processes: {:?}",
            report.matched
        ));

        for &pid in &report.matched {
            match self.table.signal_kill(pid) {
                Ok(()) => {
                    self.report(format_args!("Killed process {}", pid));
                    report.killed.push(pid);
                }
                Err(err) => {
                    tracing::warn!(pid, error = %err, "failed to kill process");
                    report.failed.push((pid, err));
                }
            }
        }

        Ok(report)
    }

    /// Own PID plus every ancestor reachable through the snapshot.
    fn protected_pids(&self, processes: &[ProcessRecord]) -> HashSet<i32> {
        let parents: HashMap<i32, i32> = processes.iter().map(|p| (p.pid, p.ppid)).collect();

        let mut protected = HashSet::new();
        let mut pid = self.table.current_pid();
        while pid > 0 && protected.insert(pid) {
            match parents.get(&pid) {
                Some(&ppid) => pid = ppid,
                None => break,
            }
        }
        protected
    }

    fn report(&mut self, line: fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            tracing::warn!(error = %e, "failed to write reap report");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakeTable {
        processes: Vec<ProcessRecord>,
        alive: RefCell<HashSet<i32>>,
        signaled: RefCell<Vec<i32>>,
        self_pid: i32,
        fail_listing: bool,
    }

    impl FakeTable {
        fn new(processes: Vec<ProcessRecord>) -> Self {
            let alive = processes.iter().map(|p| p.pid).collect();
            Self {
                processes,
                alive: RefCell::new(alive),
                signaled: RefCell::new(Vec::new()),
                self_pid: 9999,
                fail_listing: false,
            }
        }
    }

    impl ProcessTable for &FakeTable {
        fn list_processes(&self) -> Result<Vec<ProcessRecord>, ProcError> {
            if self.fail_listing {
                return Err(ProcError::Enumeration("no /proc".into()));
            }
            Ok(self.processes.clone())
        }

        fn signal_kill(&self, pid: i32) -> Result<(), ProcError> {
            self.signaled.borrow_mut().push(pid);
            if self.alive.borrow_mut().remove(&pid) {
                Ok(())
            } else {
                Err(ProcError::NotFound(pid))
            }
        }

        fn current_pid(&self) -> i32 {
            self.self_pid
        }
    }

    fn scenario_table() -> FakeTable {
        FakeTable::new(vec![
            ProcessRecord::new(100, 1, "dev2 worker run"),
            ProcessRecord::new(200, 1, "dev2 other"),
            ProcessRecord::new(300, 1, "unrelated"),
        ])
    }

    #[test]
    fn kills_only_processes_matching_every_pattern() {
        let table = scenario_table();
        let mut out = Vec::new();

        let pids = Reaper::new(&table, &mut out)
            .reap_matching(&["dev2", "worker"])
            .unwrap();

        assert_eq!(pids, vec![100]);
        assert_eq!(*table.signaled.borrow(), vec![100]);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Found matching processes: [100]\nKilled process 100\n"
        );
    }

    #[test]
    fn empty_table_sends_nothing() {
        let table = FakeTable::new(Vec::new());
        let mut out = Vec::new();

        let pids = Reaper::new(&table, &mut out)
            .reap_matching(&["dev2", "worker"])
            .unwrap();

        assert!(pids.is_empty());
        assert!(table.signaled.borrow().is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn no_match_produces_no_output() {
        let table = scenario_table();
        let mut out = Vec::new();

        let pids = Reaper::new(&table, &mut out)
            .reap_matching(&["nothing-like-this"])
            .unwrap();

        assert!(pids.is_empty());
        assert!(table.signaled.borrow().is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn empty_pattern_set_kills_nothing() {
        let mut table = scenario_table();
        // Reading the table at all would fail the pass.
        table.fail_listing = true;
        let mut out = Vec::new();

        let pids = Reaper::new(&table, &mut out)
            .reap_matching(&[] as &[&str])
            .unwrap();

        assert!(pids.is_empty());
        assert!(table.signaled.borrow().is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn each_match_is_signaled_exactly_once() {
        let table = FakeTable::new(vec![
            ProcessRecord::new(20, 1, "dev2 worker b"),
            ProcessRecord::new(10, 1, "dev2 worker a"),
            ProcessRecord::new(20, 1, "dev2 worker b"),
        ]);

        let pids = Reaper::new(&table, std::io::sink())
            .reap_matching(&["dev2", "worker"])
            .unwrap();

        assert_eq!(pids, vec![10, 20]);
        assert_eq!(*table.signaled.borrow(), vec![10, 20]);
    }

    #[test]
    fn exited_process_does_not_stop_the_pass() {
        let table = FakeTable::new(vec![
            ProcessRecord::new(10, 1, "dev2 worker a"),
            ProcessRecord::new(20, 1, "dev2 worker b"),
            ProcessRecord::new(30, 1, "dev2 worker c"),
        ]);
        // 10 exits between the scan and the signal.
        table.alive.borrow_mut().remove(&10);
        let mut out = Vec::new();

        let report = Reaper::new(&table, &mut out)
            .reap(&["dev2", "worker"])
            .unwrap();

        assert_eq!(report.matched, vec![10, 20, 30]);
        assert_eq!(report.killed, vec![20, 30]);
        assert_eq!(report.failed, vec![(10, ProcError::NotFound(10))]);
        assert_eq!(*table.signaled.borrow(), vec![10, 20, 30]);

        let out = String::from_utf8(out).unwrap();
        assert!(!out.contains("Killed process 10"));
        assert!(out.contains("Killed process 30"));
    }

    #[test]
    fn never_kills_itself_or_its_ancestors() {
        let mut table = FakeTable::new(vec![
            ProcessRecord::new(1, 0, "init"),
            ProcessRecord::new(50, 1, "cargo run dev2 worker"),
            ProcessRecord::new(60, 50, "reaprun dev2 worker"),
            ProcessRecord::new(70, 1, "dev2 worker leftover"),
        ]);
        table.self_pid = 60;

        let pids = Reaper::new(&table, std::io::sink())
            .reap_matching(&["dev2", "worker"])
            .unwrap();

        assert_eq!(pids, vec![70]);
        assert_eq!(*table.signaled.borrow(), vec![70]);
    }

    #[test]
    fn ancestor_cycle_terminates() {
        let mut table = FakeTable::new(vec![
            ProcessRecord::new(5, 6, "dev2 worker x"),
            ProcessRecord::new(6, 5, "dev2 worker y"),
        ]);
        table.self_pid = 5;

        let pids = Reaper::new(&table, std::io::sink())
            .reap_matching(&["dev2"])
            .unwrap();

        assert!(pids.is_empty());
    }

    #[test]
    fn enumeration_failure_is_fatal_and_signals_nothing() {
        let mut table = scenario_table();
        table.fail_listing = true;

        let err = Reaper::new(&table, std::io::sink())
            .reap_matching(&["dev2"])
            .unwrap_err();

        assert!(matches!(err, ProcError::Enumeration(_)));
        assert!(table.signaled.borrow().is_empty());
    }
}
