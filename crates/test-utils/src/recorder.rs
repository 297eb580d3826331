// crates/test-utils/src/recorder.rs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::bail;
use taskgraph::task::{Task, TaskBuilder, TaskRef};

/// Something a recorded task did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Started(String),
    Finished(String),
}

/// Builds named tasks whose work records start/finish events, so tests can
/// assert on execution order and concurrency without side effects.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Task that records itself and returns immediately.
    pub fn task(&self, name: &str, prerequisites: &[TaskRef]) -> Task<()> {
        self.slow_task(name, prerequisites, Duration::ZERO)
    }

    /// Task that records itself and sleeps for `delay` while "running".
    pub fn slow_task(&self, name: &str, prerequisites: &[TaskRef], delay: Duration) -> Task<()> {
        let recorder = self.clone();
        let label = name.to_string();

        TaskBuilder::new()
            .name(name)
            .after_all(prerequisites)
            .build(move || {
                recorder.enter(&label);
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
                recorder.exit(&label);
            })
    }

    /// Task whose work records a start and then fails.
    pub fn failing_task(&self, name: &str, prerequisites: &[TaskRef]) -> Task<()> {
        let recorder = self.clone();
        let label = name.to_string();

        TaskBuilder::new()
            .name(name)
            .after_all(prerequisites)
            .build_fallible(move || {
                recorder.push(Event::Started(label.clone()));
                bail!("{label} failed on purpose")
            })
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Names in the order their work finished.
    pub fn finished(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Finished(name) => Some(name),
                Event::Started(_) => None,
            })
            .collect()
    }

    /// Names in the order their work started.
    pub fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Started(name) => Some(name),
                Event::Finished(_) => None,
            })
            .collect()
    }

    /// Highest number of recorded tasks running at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn enter(&self, name: &str) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.push(Event::Started(name.to_string()));
    }

    fn exit(&self, name: &str) {
        self.push(Event::Finished(name.to_string()));
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}
