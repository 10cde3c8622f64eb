/// Bounded undo/redo history over opaque snapshots.
///
/// The stack owns an ordered list of snapshots and a cursor pointing at
/// the active one. Snapshots are never cloned or inspected; callers decide
/// what a snapshot is and how it is shared.
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::StackConfig;
use crate::lookup::Lookup;
use crate::policy::Policy;
use crate::snapshot::StackSnapshot;

/// History of snapshots with a movable cursor and a capacity bound.
///
/// Nothing here fails: invalid configuration is ignored, navigation past
/// either end clamps, and imports normalize their input.
pub struct HistoryStack<T> {
    /// Snapshots, oldest first.
    entries: Vec<T>,
    /// Active snapshot. `None` until the first push.
    current: Option<usize>,
    /// Maximum number of entries retained after a push.
    capacity: usize,
    policy: Policy,
}

impl<T> std::fmt::Debug for HistoryStack<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStack")
            .field("len", &self.entries.len())
            .field("current", &self.current)
            .field("capacity", &self.capacity)
            .field("policy", &self.policy)
            .finish()
    }
}

impl<T> Default for HistoryStack<T> {
    fn default() -> Self {
        Self::from_config(StackConfig::default())
    }
}

impl<T> HistoryStack<T> {
    /// Creates an empty stack.
    ///
    /// A capacity of 0 is invalid and replaced by the default (20).
    pub fn new(capacity: usize, policy: Policy) -> Self {
        Self::from_config(StackConfig { capacity, policy })
    }

    /// Creates an empty stack, parsing the policy from its wire name.
    ///
    /// Unknown names fall back to `clearpath`.
    pub fn with_policy_name(capacity: usize, policy: &str) -> Self {
        let policy = Policy::parse(policy).unwrap_or_else(|| {
            tracing::warn!("Unknown policy {policy:?}, using {}", Policy::default());
            Policy::default()
        });
        Self::new(capacity, policy)
    }

    pub fn from_config(mut config: StackConfig) -> Self {
        config.sanitize();
        Self {
            entries: Vec::new(),
            current: None,
            capacity: config.capacity,
            policy: config.policy,
        }
    }

    /// Stores a new snapshot according to the active policy.
    ///
    /// Evicts the oldest snapshots if the stack is now over capacity.
    /// Returns the index of the new active snapshot.
    pub fn push(&mut self, value: T) -> usize {
        let current = match self.policy {
            Policy::Linear => {
                self.entries.push(value);
                self.entries.len() - 1
            }
            Policy::ClearPath => {
                if let Some(current) = self.current {
                    // Drop the redo branch. A stale cursor past the end drops nothing.
                    self.entries.truncate(current + 1);
                }
                self.entries.push(value);
                self.entries.len() - 1
            }
            Policy::Insertion => {
                let at = self
                    .current
                    .map_or(0, |c| c + 1)
                    .min(self.entries.len());
                self.entries.insert(at, value);
                at
            }
        };
        self.current = Some(current);
        self.enforce_capacity();

        tracing::trace!(policy = %self.policy, current = ?self.current, "Pushed snapshot");
        self.current.unwrap_or_default()
    }

    /// Moves the cursor back by `steps`.
    ///
    /// If that would go before the first snapshot the cursor stays put and
    /// the first snapshot is returned. Returns `None` only when the stack is
    /// empty.
    pub fn undo(&mut self, steps: usize) -> Option<&T> {
        match self.current {
            Some(current) if current >= steps => {
                self.current = Some(current - steps);
                self.entries.get(current - steps)
            }
            _ => self.entries.first(),
        }
    }

    pub fn undo_one(&mut self) -> Option<&T> {
        self.undo(1)
    }

    /// Moves the cursor forward by `steps` if a snapshot exists there.
    ///
    /// Otherwise the cursor stays put and the active snapshot is returned,
    /// which is `None` on an empty stack or when the cursor is stale.
    pub fn redo(&mut self, steps: usize) -> Option<&T> {
        let target = match self.current {
            Some(current) => current.checked_add(steps),
            None => steps.checked_sub(1),
        };
        match target {
            Some(target) if target < self.entries.len() => {
                self.current = Some(target);
                self.entries.get(target)
            }
            _ => self.current_entry(),
        }
    }

    pub fn redo_one(&mut self) -> Option<&T> {
        self.redo(1)
    }

    /// Points the cursor at `index`.
    ///
    /// The bound is the capacity, not the number of stored snapshots, so an
    /// index inside the capacity but past the content moves the cursor and
    /// yields `Lookup::Empty`.
    pub fn move_to(&mut self, index: usize) -> Lookup<'_, T> {
        if index >= self.capacity {
            return Lookup::OutOfRange;
        }
        self.current = Some(index);
        match self.entries.get(index) {
            Some(value) => Lookup::Found(value),
            None => Lookup::Empty,
        }
    }

    /// Changes the capacity. Zero is ignored.
    ///
    /// Shrinking below the current length does not evict anything until the
    /// next push.
    pub fn expand(&mut self, capacity: usize) -> &mut Self {
        if capacity == 0 {
            tracing::warn!("Ignoring capacity 0, keeping {}", self.capacity);
        } else {
            self.capacity = capacity;
        }
        self
    }

    /// Drops every snapshot. The cursor is left as is.
    pub fn free_up(&mut self) -> &mut Self {
        self.entries.clear();
        self
    }

    /// Switches the push policy by wire name.
    ///
    /// Returns `false` and keeps the current policy if `name` is unknown.
    pub fn set_policy(&mut self, name: &str) -> bool {
        match Policy::parse(name) {
            Some(policy) => {
                self.policy = policy;
                true
            }
            None => {
                tracing::warn!("Rejected unknown policy {name:?}");
                false
            }
        }
    }

    pub fn set_policy_kind(&mut self, policy: Policy) {
        self.policy = policy;
    }

    /// Replaces the whole state with a saved snapshot.
    ///
    /// Each field is normalized on its own: capacity defaults to 20, entries
    /// to empty, the cursor to 0 and the policy to `clearpath`. Entries past
    /// the capacity are dropped and the cursor is clamped into
    /// `0..capacity`. Returns the snapshot under the cursor, if any.
    pub fn import(&mut self, snapshot: StackSnapshot<T>) -> Option<&T> {
        let normalized = snapshot.normalize();
        self.capacity = normalized.capacity;
        self.entries = normalized.entries;
        self.current = Some(normalized.current);
        self.policy = normalized.policy;
        self.entries.get(normalized.current)
    }

    /// Imports an untyped JSON record. See `StackSnapshot::from_value`.
    pub fn import_value(&mut self, value: Value) -> Option<&T>
    where
        T: DeserializeOwned,
    {
        self.import(StackSnapshot::from_value(value))
    }

    /// Borrows the state as a saveable record without cloning snapshots.
    ///
    /// An untouched cursor is exported as `-1`.
    pub fn export(&self) -> StackSnapshot<&T> {
        StackSnapshot {
            capacity: Some(to_i64(self.capacity)),
            entries: Some(self.entries.iter().collect()),
            current: Some(self.current.map_or(-1, to_i64)),
            policy: Some(self.policy.as_str().to_string()),
        }
    }

    /// Consumes the stack into a saveable record.
    pub fn into_snapshot(self) -> StackSnapshot<T> {
        StackSnapshot {
            capacity: Some(to_i64(self.capacity)),
            current: Some(self.current.map_or(-1, to_i64)),
            policy: Some(self.policy.as_str().to_string()),
            entries: Some(self.entries),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Cursor position, `None` before the first push.
    ///
    /// May point past the stored snapshots after `free_up`, `move_to` or
    /// `import`.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    /// Snapshot under the cursor.
    pub fn current_entry(&self) -> Option<&T> {
        self.current.and_then(|c| self.entries.get(c))
    }

    /// Whether `undo(1)` would move the cursor.
    pub fn can_undo(&self) -> bool {
        matches!(self.current, Some(c) if c >= 1)
    }

    /// Whether `redo(1)` would move the cursor.
    pub fn can_redo(&self) -> bool {
        let next = self.current.map_or(0, |c| c + 1);
        next < self.entries.len()
    }

    /// Evicts the oldest snapshots until the length fits the capacity.
    fn enforce_capacity(&mut self) {
        if self.entries.len() <= self.capacity {
            return;
        }
        let excess = self.entries.len() - self.capacity;
        self.entries.drain(..excess);
        self.current = self.current.map(|c| c.saturating_sub(excess));
        tracing::debug!("Evicted {excess} oldest snapshot(s)");
    }
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
