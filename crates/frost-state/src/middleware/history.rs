//! Time-travel log of committed actions.

use super::{Middleware, Next};
use crate::action::Action;
use crate::error::FrostResult;
use crate::Value;
use serde::Deserialize;
use std::sync::{Arc, Mutex, MutexGuard};

/// Settings for [`History`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Keep at most this many entries, pruning the oldest. `None` keeps all.
    pub max_entries: Option<usize>,
}

#[derive(Debug, Default)]
struct Log {
    initial: Option<Value>,
    entries: Vec<(Action, Value)>,
}

/// Records every committed action with the state it produced.
///
/// `History` is opt-in; without it nothing outlives a dispatch. Clones share
/// one log, so keep a clone to query while the container owns the other.
/// Install it first in the chain to record what the container commits.
///
/// # Example
///
/// ```
/// use frost_state::{path, Asset, Dispatch, History, Lens, Value};
///
/// let history = History::new();
/// let asset = Asset::<Value>::builder(Value::map([("n", Value::from(0))]))
///     .with_middleware(history.clone())
///     .build();
///
/// let n: Lens<Value, Value> = Lens::unchecked(path!("n"));
/// let asset = asset.labeled("one").set(n.clone(), Value::from(1)).unwrap();
/// let _asset = asset.labeled("two").set(n, Value::from(2)).unwrap();
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.labels(), ["one", "two"]);
/// let after_one = history.replay_to(0).unwrap();
/// assert_eq!(after_one.get("n").and_then(Value::as_i64), Some(1));
/// ```
#[derive(Clone, Debug, Default)]
pub struct History {
    log: Arc<Mutex<Log>>,
    config: HistoryConfig,
}

impl History {
    /// Create an unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from settings.
    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            log: Arc::default(),
            config,
        }
    }

    /// Bound the number of kept entries.
    #[must_use]
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.config.max_entries = Some(max);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Log> {
        // A panic elsewhere cannot leave the log half-written.
        self.log.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The state before the oldest kept entry.
    pub fn initial(&self) -> Option<Value> {
        self.lock().initial.clone()
    }

    /// The state after entry `index` (0 = oldest kept), if it exists.
    pub fn replay_to(&self, index: usize) -> Option<Value> {
        self.lock().entries.get(index).map(|(_, state)| state.clone())
    }

    /// Kept actions, oldest first.
    pub fn entries(&self) -> Vec<Action> {
        self.lock().entries.iter().map(|(a, _)| a.clone()).collect()
    }

    /// Labels of the kept actions, oldest first.
    pub fn labels(&self) -> Vec<String> {
        self.lock()
            .entries
            .iter()
            .map(|(a, _)| a.label().to_owned())
            .collect()
    }

    /// Number of kept entries.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Forget everything, including the initial state.
    pub fn clear(&self) {
        let mut log = self.lock();
        log.entries.clear();
        log.initial = None;
    }

    /// Keep only the last `keep_last` entries.
    ///
    /// The initial state moves forward to the state before the oldest kept
    /// entry, so `replay_to` stays consistent. Returns how many entries were
    /// removed.
    pub fn prune(&self, keep_last: usize) -> usize {
        prune_log(&mut self.lock(), keep_last)
    }
}

fn prune_log(log: &mut Log, keep_last: usize) -> usize {
    let len = log.entries.len();
    if len <= keep_last {
        return 0;
    }
    let to_remove = len - keep_last;
    log.initial = Some(log.entries[to_remove - 1].1.clone());
    log.entries.drain(..to_remove);
    to_remove
}

impl Middleware for History {
    fn handle(&self, state: &Value, action: &Action, next: Next<'_>) -> FrostResult<Value> {
        let result = next.run(action)?;
        let mut log = self.lock();
        if log.initial.is_none() {
            log.initial = Some(state.clone());
        }
        log.entries.push((action.clone(), result.clone()));
        if let Some(max) = self.config.max_entries {
            let pruned = prune_log(&mut log, max);
            if pruned > 0 {
                tracing::trace!(pruned, kept = max, "history pruned");
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Entry;
    use crate::middleware::dispatch;
    use crate::path;

    fn run(history: &History, state: &Value, label: &str, n: i64) -> Value {
        let chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(history.clone())];
        let action = Action::new(label).with_entry(Entry::new(path!("n"), n));
        dispatch(state, &action, &chain).unwrap()
    }

    fn n(v: &Value) -> Option<i64> {
        v.get("n").and_then(Value::as_i64)
    }

    #[test]
    fn test_records_initial_and_replays() {
        let history = History::new();
        let s0 = Value::map([("n", Value::from(0))]);
        let s1 = run(&history, &s0, "s1", 1);
        let s2 = run(&history, &s1, "s2", 2);
        let _s3 = run(&history, &s2, "s3", 3);

        assert_eq!(history.len(), 3);
        assert_eq!(n(&history.initial().unwrap()), Some(0));
        assert_eq!(n(&history.replay_to(0).unwrap()), Some(1));
        assert_eq!(n(&history.replay_to(1).unwrap()), Some(2));
        assert!(history.replay_to(3).is_none());
        assert_eq!(history.labels(), ["s1", "s2", "s3"]);
    }

    #[test]
    fn test_prune_moves_initial_forward() {
        let history = History::new();
        let mut state = Value::map([("n", Value::from(0))]);
        for i in 1..=5 {
            state = run(&history, &state, &format!("s{i}"), i);
        }
        assert_eq!(history.prune(2), 3);
        assert_eq!(history.len(), 2);
        assert_eq!(n(&history.initial().unwrap()), Some(3));
        assert_eq!(n(&history.replay_to(0).unwrap()), Some(4));
        assert_eq!(history.prune(10), 0);
    }

    #[test]
    fn test_max_entries_prunes_automatically() {
        let history = History::with_config(HistoryConfig {
            max_entries: Some(2),
        });
        let mut state = Value::map([("n", Value::from(0))]);
        for i in 1..=4 {
            state = run(&history, &state, &format!("s{i}"), i);
        }
        assert_eq!(history.labels(), ["s3", "s4"]);
        assert_eq!(n(&history.initial().unwrap()), Some(2));
    }

    #[test]
    fn test_failed_dispatch_not_recorded() {
        let history = History::new();
        let chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(history.clone())];
        let state = Value::map([("n", Value::from(0))]);
        let bad = Action::new("bad").with_entry(Entry::new(path!("n", "x"), 1));
        assert!(dispatch(&state, &bad, &chain).is_err());
        assert!(history.is_empty());
        assert!(history.initial().is_none());
    }

    #[test]
    fn test_clear() {
        let history = History::new();
        run(&history, &Value::map([("n", Value::from(0))]), "s1", 1);
        history.clear();
        assert!(history.is_empty());
        assert!(history.initial().is_none());
    }

    #[test]
    fn test_config_deserializes() {
        let config: HistoryConfig = serde_json::from_str(r#"{"max_entries": 50}"#).unwrap();
        assert_eq!(config.max_entries, Some(50));
        let config: HistoryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, HistoryConfig::default());
    }
}
