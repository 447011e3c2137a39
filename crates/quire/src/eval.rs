//! Deferred values recomputed when their bindings change.
//!
//! A field's title, description or options can be a fixed value or a function
//! of some external bindings. Each deferred value is an [`Eval`]: on every
//! [`UpdateFieldMsg`](crate::UpdateFieldMsg) it hashes its bindings and, when
//! the hash moved, either loads the value cached for that hash or dispatches
//! the function as a [`Cmd`]. The result comes back as an [`EvalDoneMsg`]
//! tagged with the hash it was computed for. Only a result whose hash equals
//! the pending one is applied; anything older is dropped on arrival.

use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use tracing::{debug, trace, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::runtime::{Cmd, Message};

/// How long a computation may run before a loading indicator is shown.
pub const SPINNER_SHOW_THRESHOLD: Duration = Duration::from_millis(25);

const CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// Collects hashed bytes and digests them with xxh3.
#[derive(Default)]
struct BindingHasher(Vec<u8>);

impl Hasher for BindingHasher {
    fn write(&mut self, bytes: &[u8]) {
        self.0.extend_from_slice(bytes);
    }

    fn finish(&self) -> u64 {
        xxh3_64(&self.0)
    }
}

/// Hashes a binding snapshot. Equal snapshots always hash equally.
pub fn binding_hash<B: Hash + ?Sized>(bindings: &B) -> u64 {
    let mut hasher = BindingHasher::default();
    bindings.hash(&mut hasher);
    hasher.finish()
}

/// Which deferred value of a field a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvalSlot {
    /// The field title.
    Title,
    /// The field description.
    Description,
    /// The option list.
    Options,
}

/// Result of a deferred computation, delivered back to the field.
#[derive(Debug, Clone)]
pub struct EvalDoneMsg<V> {
    /// Field the computation was dispatched by.
    pub id: usize,
    /// Value the computation produces.
    pub slot: EvalSlot,
    /// Binding hash the computation was dispatched for.
    pub hash: u64,
    /// The computed value, or a message describing why it failed.
    pub result: std::result::Result<V, String>,
}

/// Progress of a deferred value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalState {
    /// The value matches the last observed bindings.
    Idle,
    /// A computation for `hash` is in flight.
    Pending {
        /// Hash the computation was dispatched for.
        hash: u64,
        /// When it was dispatched.
        since: Instant,
    },
}

/// What [`Eval::refresh`] did.
pub enum Refresh {
    /// Bindings unchanged or the value is fixed.
    Current,
    /// The value for the new bindings came from the cache.
    Cached,
    /// A computation was dispatched.
    Dispatched(Cmd),
}

impl Refresh {
    /// The dispatched command, if any.
    pub fn into_cmd(self) -> Option<Cmd> {
        match self {
            Self::Dispatched(cmd) => Some(cmd),
            Self::Current | Self::Cached => None,
        }
    }
}

type EvalFn<V> = Arc<dyn Fn() -> std::result::Result<V, String> + Send + Sync>;
type BindingsFn = Box<dyn Fn() -> u64 + Send + Sync>;

/// A value that is either fixed or computed from bindings.
pub struct Eval<V> {
    value: V,
    func: Option<EvalFn<V>>,
    bindings: Option<BindingsFn>,
    hash: Option<u64>,
    state: EvalState,
    cache: LruCache<u64, V>,
    error: Option<String>,
}

impl<V: Default> Default for Eval<V> {
    fn default() -> Self {
        Self::fixed(V::default())
    }
}

impl<V> Eval<V> {
    /// A fixed value.
    pub fn fixed(value: V) -> Self {
        Self {
            value,
            func: None,
            bindings: None,
            hash: None,
            state: EvalState::Idle,
            cache: LruCache::new(CACHE_CAPACITY),
            error: None,
        }
    }

    /// Replaces the value and drops any function.
    pub fn set_value(&mut self, value: V) {
        self.value = value;
        self.func = None;
        self.bindings = None;
        self.hash = None;
        self.state = EvalState::Idle;
        self.error = None;
    }

    /// Computes the value with `func` whenever `bindings` hashes differently.
    ///
    /// `bindings` is hashed on every refresh, so pass something that reflects
    /// live state, such as a [`Bound`](crate::Bound) clone.
    pub fn set_func<F, B>(&mut self, func: F, bindings: B)
    where
        F: Fn() -> std::result::Result<V, String> + Send + Sync + 'static,
        B: Hash + Send + Sync + 'static,
    {
        self.func = Some(Arc::new(func));
        self.bindings = Some(Box::new(move || binding_hash(&bindings)));
        self.hash = None;
        self.state = EvalState::Idle;
        self.cache.clear();
    }

    /// The current value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Whether the value comes from a function.
    pub fn is_deferred(&self) -> bool {
        self.func.is_some()
    }

    /// The message from the last failed computation, if the latest one failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Current progress.
    pub fn state(&self) -> EvalState {
        self.state
    }

    /// Whether a computation is in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, EvalState::Pending { .. })
    }

    /// Whether a computation has been in flight longer than
    /// [`SPINNER_SHOW_THRESHOLD`].
    pub fn is_loading(&self) -> bool {
        match self.state {
            EvalState::Pending { since, .. } => since.elapsed() > SPINNER_SHOW_THRESHOLD,
            EvalState::Idle => false,
        }
    }
}

impl<V: Clone + Send + 'static> Eval<V> {
    /// Re-hashes the bindings and loads or dispatches a new value if they moved.
    pub fn refresh(&mut self, id: usize, slot: EvalSlot) -> Refresh {
        let (Some(func), Some(bindings)) = (&self.func, &self.bindings) else {
            return Refresh::Current;
        };
        let hash = bindings();
        if self.hash == Some(hash) {
            return Refresh::Current;
        }
        self.hash = Some(hash);

        if let Some(value) = self.cache.get(&hash) {
            trace!(id, ?slot, hash, "deferred value served from cache");
            self.value = value.clone();
            self.state = EvalState::Idle;
            self.error = None;
            return Refresh::Cached;
        }

        debug!(id, ?slot, hash, "dispatching deferred evaluation");
        self.state = EvalState::Pending {
            hash,
            since: Instant::now(),
        };
        let func = Arc::clone(func);
        Refresh::Dispatched(Cmd::new(move || {
            Message::new(EvalDoneMsg {
                id,
                slot,
                hash,
                result: func(),
            })
        }))
    }

    /// Applies a finished computation. Returns false if it was stale.
    pub fn deliver(&mut self, hash: u64, result: std::result::Result<V, String>) -> bool {
        match self.state {
            EvalState::Pending { hash: pending, .. } if pending == hash => {}
            _ => {
                debug!(hash, "dropping stale deferred result");
                return false;
            }
        }
        self.state = EvalState::Idle;
        match result {
            Ok(value) => {
                self.cache.put(hash, value.clone());
                self.value = value;
                self.error = None;
            }
            Err(err) => {
                warn!(hash, error = %err, "deferred evaluation failed");
                self.error = Some(err);
            }
        }
        true
    }
}
