//! The reactive store.

use rbind_core::path::{format_path, parse_path, path_to_strings, PathSegment};
use rbind_core::value::Value;
use rbind_evaluator::DataScope;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;

use crate::array::{self, ArrayMutation, ArrayOp};
use crate::deps::{compute_dependencies, DependencyMap};
use crate::derived::DerivedSet;
use crate::error::ReactiveError;
use crate::notification::{ArrayChange, Change, Notification};

pub const DEFAULT_EXCLUSION_PREFIX: &str = "_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactiveConfig {
    /// Fields whose names start with this prefix are never wrapped and
    /// never notify.
    pub exclusion_prefix: String,
}

impl Default for ReactiveConfig {
    fn default() -> Self {
        Self {
            exclusion_prefix: DEFAULT_EXCLUSION_PREFIX.to_string(),
        }
    }
}

/// A stable reference to a nested container. Two handles are equal when
/// they refer to the same wrapper, so an unchanged subtree read twice
/// yields equal handles.
#[derive(Debug, Clone)]
pub struct ReactiveHandle {
    id: u64,
    path: Vec<PathSegment>,
}

impl ReactiveHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }
}

impl PartialEq for ReactiveHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ReactiveHandle {}

/// The result of [`ReactiveStore::get`].
#[derive(Debug, Clone, PartialEq)]
pub enum Read {
    /// A tracked object or array.
    Wrapped(ReactiveHandle),
    /// A primitive, or anything under an excluded field.
    Plain(Value),
    Derived(Value),
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&Notification)>;

/// Owns a data graph and reports every accepted change to subscribers.
pub struct ReactiveStore {
    root: Value,
    config: ReactiveConfig,
    derived: DerivedSet,
    /// Wrapper identity per container path, created on first read.
    wrappers: FxHashMap<Vec<PathSegment>, u64>,
    next_wrapper_id: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription_id: u64,
    /// Derived values currently being computed, for cycle detection.
    computing: RefCell<Vec<String>>,
}

impl ReactiveStore {
    pub fn new(root: Value, config: ReactiveConfig) -> Self {
        Self {
            root,
            config,
            derived: DerivedSet::new(),
            wrappers: FxHashMap::default(),
            next_wrapper_id: 0,
            subscribers: Vec::new(),
            next_subscription_id: 0,
            computing: RefCell::new(Vec::new()),
        }
    }

    pub fn with_derived(mut self, derived: DerivedSet) -> Self {
        self.derived = derived;
        self
    }

    /// The plain data graph, read-only.
    pub fn data(&self) -> &Value {
        &self.root
    }

    pub fn derived(&self) -> &DerivedSet {
        &self.derived
    }

    pub fn config(&self) -> &ReactiveConfig {
        &self.config
    }

    /// Run dependency analysis over this store's derived values.
    pub fn dependencies(&self) -> DependencyMap {
        compute_dependencies(&self.derived, &self.root)
    }

    fn is_excluded(&self, segments: &[PathSegment]) -> bool {
        let prefix = self.config.exclusion_prefix.as_str();
        !prefix.is_empty()
            && segments
                .iter()
                .any(|s| matches!(s, PathSegment::Key(k) if k.starts_with(prefix)))
    }

    fn derived_root<'p>(&self, segments: &'p [PathSegment]) -> Option<&'p str> {
        match segments.first() {
            Some(PathSegment::Key(name)) if self.derived.contains(name) => Some(name),
            _ => None,
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Read `path`. Containers come back as handles, created on first read
    /// and reused until the container is replaced.
    pub fn get(&mut self, path: &str) -> Read {
        let segments = parse_path(path);
        if self.derived_root(&segments).is_some() {
            return Read::Derived(DataScope::lookup(self, &segments));
        }
        let excluded = self.is_excluded(&segments);
        match self.root.lookup_ref(&segments) {
            Some(value) if value.is_container() && !excluded => {}
            Some(value) => return Read::Plain(value.clone()),
            None => {
                return match self.root.lookup(&segments) {
                    Value::Undefined => Read::Missing,
                    computed => Read::Plain(computed),
                }
            }
        }
        Read::Wrapped(self.wrap(segments))
    }

    /// The current value behind a handle, if its container still exists.
    pub fn resolve(&self, handle: &ReactiveHandle) -> Option<&Value> {
        match self.wrappers.get(&handle.path) {
            Some(&id) if id == handle.id => self.root.lookup_ref(&handle.path),
            _ => None,
        }
    }

    fn wrap(&mut self, segments: Vec<PathSegment>) -> ReactiveHandle {
        let next = &mut self.next_wrapper_id;
        let id = *self.wrappers.entry(segments.clone()).or_insert_with(|| {
            let id = *next;
            *next += 1;
            id
        });
        ReactiveHandle { id, path: segments }
    }

    /// Forget wrappers at or below `segments` (or strictly below, when
    /// `keep_self` is set).
    fn invalidate(&mut self, segments: &[PathSegment], keep_self: bool) {
        self.wrappers.retain(|path, _| {
            !path.starts_with(segments) || (keep_self && path.len() == segments.len())
        });
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Write `value` at `path`. Returns the change, or `None` when nothing
    /// observable changed (same value, or an excluded field).
    pub fn set(&mut self, path: &str, value: Value) -> Result<Option<Change>, ReactiveError> {
        let segments = parse_path(path);
        let Some((last, parent_path)) = segments.split_last() else {
            return Err(ReactiveError::InvalidPath(path.to_string()));
        };
        if self.derived_root(&segments).is_some() {
            return Err(ReactiveError::ReadOnlyDerived(path.to_string()));
        }

        let parent = self
            .root
            .lookup_mut(parent_path)
            .ok_or_else(|| ReactiveError::PathNotFound(format_path(parent_path)))?;
        // A missing slot reads as undefined; it is only created when the
        // write changes something.
        let slot = match (parent, last) {
            (Value::Object(members), segment) => {
                let key = segment.as_key();
                if members.get(key.as_ref()).unwrap_or(&Value::Undefined).same_value(&value) {
                    return Ok(None);
                }
                members.entry(key.into_owned()).or_default()
            }
            (Value::Array(items), PathSegment::Index(index)) => {
                if items.get(*index).unwrap_or(&Value::Undefined).same_value(&value) {
                    return Ok(None);
                }
                if *index >= items.len() {
                    items.resize(index + 1, Value::Undefined);
                }
                &mut items[*index]
            }
            (Value::Array(_), PathSegment::Key(_)) => {
                return Err(ReactiveError::InvalidPath(path.to_string()))
            }
            _ => return Err(ReactiveError::NotAContainer(format_path(parent_path))),
        };

        let old_value = std::mem::replace(slot, value.clone());

        if self.is_excluded(&segments) {
            return Ok(None);
        }
        self.invalidate(&segments, false);

        let change = Change {
            path: path_to_strings(&segments),
            old_value,
            new_value: value,
        };
        tracing::debug!(path = %format_path(&segments), "reactive write");
        self.notify(&Notification::Change(change.clone()));
        Ok(Some(change))
    }

    /// Apply an array mutation at `path`. Emits an array notification and
    /// then a change notification, and re-wraps the array's elements.
    pub fn mutate_array(&mut self, path: &str, op: ArrayOp) -> Result<ArrayMutation, ReactiveError> {
        let segments = parse_path(path);
        if self.derived_root(&segments).is_some() {
            return Err(ReactiveError::ReadOnlyDerived(path.to_string()));
        }
        if self.is_excluded(&segments) {
            return Err(ReactiveError::ExcludedField(path.to_string()));
        }
        let target = self
            .root
            .lookup_mut(&segments)
            .ok_or_else(|| ReactiveError::PathNotFound(path.to_string()))?;
        let Some(items) = target.as_array_mut() else {
            return Err(ReactiveError::NotAnArray(path.to_string()));
        };

        let old_value = Value::Array(items.clone());
        let method = op.method();
        let removed = array::apply(items, op);
        let length = items.len();
        let new_value = Value::Array(items.clone());

        self.rewrap_elements(&segments, &new_value);

        let path_strings = path_to_strings(&segments);
        tracing::debug!(path = %format_path(&segments), %method, length, "array mutation");
        self.notify(&Notification::Array(ArrayChange {
            path: path_strings.clone(),
            old_value: old_value.clone(),
            new_value: new_value.clone(),
            method,
        }));
        self.notify(&Notification::Change(Change {
            path: path_strings,
            old_value,
            new_value,
        }));
        Ok(ArrayMutation { removed, length })
    }

    /// Element indices shift under a mutation, so wrappers below the array
    /// are dropped and every container element gets a wrapper at its new
    /// index.
    fn rewrap_elements(&mut self, segments: &[PathSegment], array: &Value) {
        self.invalidate(segments, true);
        let Some(items) = array.as_array() else {
            return;
        };
        for (index, item) in items.iter().enumerate() {
            if item.is_container() {
                let mut element_path = segments.to_vec();
                element_path.push(PathSegment::Index(index));
                self.wrap(element_path);
            }
        }
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&Notification) + 'static,
    {
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self, notification: &Notification) {
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(notification);
        }
    }
}

impl DataScope for ReactiveStore {
    /// Derived names resolve to their computed value; everything else is
    /// read from the plain graph.
    fn lookup(&self, segments: &[PathSegment]) -> Value {
        let Some(name) = self.derived_root(segments) else {
            return self.root.lookup(segments);
        };
        let Some(derived) = self.derived.get(name) else {
            return Value::Undefined;
        };
        if self.computing.borrow().iter().any(|n| n == name) {
            tracing::warn!(name, "derived value reads itself; yielding undefined");
            return Value::Undefined;
        }
        self.computing.borrow_mut().push(name.to_string());
        let value = derived.compute(self);
        self.computing.borrow_mut().pop();
        value.lookup(&segments[1..])
    }
}

impl fmt::Debug for ReactiveStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveStore")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("derived", &self.derived)
            .field("wrappers", &self.wrappers.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
