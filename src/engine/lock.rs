//! Lock strategies for contexts shared between threads.
//!
//! A [`LockedContext`] keeps its [`Context`] behind a mutex. How the mutex is
//! acquired is up to the bound [`LockStrategy`]: [`Blocking`] waits for it,
//! [`NonBlocking`] gives up immediately. Release happens when the guard is
//! dropped at the end of one `step` or `notify`.
//!
//! A failed acquisition looks exactly like "no transition matched" to the
//! caller: both make `step`/`notify` return `false`.

use super::context::{Context, ContextAccess};
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};

/// How a context's mutex is acquired.
///
/// Returning `None` means the lock is unavailable right now; the evaluation
/// is skipped and reported as no progress.
pub trait LockStrategy: Send + Sync {
    fn try_acquire<'a, T>(&self, mutex: &'a Mutex<T>) -> Option<MutexGuard<'a, T>>;
}

/// Wait until the lock is available. `step` and `notify` may block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Blocking;

/// Try once and give up on contention. `step` and `notify` never block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NonBlocking;

impl LockStrategy for Blocking {
    fn try_acquire<'a, T>(&self, mutex: &'a Mutex<T>) -> Option<MutexGuard<'a, T>> {
        Some(mutex.lock())
    }
}

impl LockStrategy for NonBlocking {
    fn try_acquire<'a, T>(&self, mutex: &'a Mutex<T>) -> Option<MutexGuard<'a, T>> {
        let guard = mutex.try_lock();
        if guard.is_none() {
            tracing::trace!(target: "stepwise::lock", "context lock unavailable");
        }
        guard
    }
}

// A callable panicked while the lock was held, so the context may have been
// left in the middle of a fire.
#[track_caller]
fn poisoned() -> ! {
    panic!("context lock poisoned: a state machine callable panicked mid-evaluation")
}

/// A context that several threads can drive through shared references.
///
/// The halted flag is mirrored into an atomic so that
/// [`is_halted`](Self::is_halted) never takes the lock.
///
/// A panic inside a callable leaves the context marked as mid-evaluation;
/// every later acquisition panics.
///
/// ```rust
/// use stepwise::engine::{Context, NonBlocking};
///
/// let shared = Context::new(0_u32).bind(NonBlocking);
/// assert!(!shared.is_halted());
/// assert_eq!(shared.with_context(|ctx| *ctx.user_data()), 0);
/// ```
#[derive(Debug)]
pub struct LockedContext<U, L> {
    inner: Mutex<Context<U>>,
    halted: AtomicBool,
    // Set for the duration of each guarded access; still set afterwards only
    // if that access unwound.
    in_flight: AtomicBool,
    strategy: L,
}

impl<U, L: LockStrategy> LockedContext<U, L> {
    pub fn new(context: Context<U>, strategy: L) -> Self {
        Self {
            halted: AtomicBool::new(context.is_halted()),
            in_flight: AtomicBool::new(false),
            inner: Mutex::new(context),
            strategy,
        }
    }

    pub fn strategy(&self) -> &L {
        &self.strategy
    }

    /// Lock-free view of the halted flag as of the last guarded access.
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    /// Run `f` on the context, waiting for the lock regardless of the bound
    /// strategy.
    ///
    /// `f` must not call `step` or `notify` on this same context.
    pub fn with_context<R>(&self, f: impl FnOnce(&mut Context<U>) -> R) -> R {
        self.guarded(self.inner.lock(), f)
    }

    /// Reset the context to the initial pseudostate.
    ///
    /// Takes the lock, so it is ordered with respect to in-flight evaluations
    /// on other threads, but whatever those threads decide next is up to the
    /// caller.
    pub fn reset(&self) {
        self.with_context(Context::reset);
    }

    pub fn into_context(self) -> Context<U> {
        if self.in_flight.load(Ordering::Acquire) {
            poisoned();
        }
        self.inner.into_inner()
    }

    fn guarded<R>(
        &self,
        mut guard: MutexGuard<'_, Context<U>>,
        f: impl FnOnce(&mut Context<U>) -> R,
    ) -> R {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            poisoned();
        }
        let result = f(&mut *guard);
        self.halted.store(guard.is_halted(), Ordering::Release);
        self.in_flight.store(false, Ordering::Release);
        result
    }
}

impl<U, L: LockStrategy> ContextAccess<U> for &LockedContext<U, L> {
    fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    fn access<R>(&mut self, f: impl FnOnce(&mut Context<U>) -> R) -> Option<R> {
        let guard = self.strategy.try_acquire(&self.inner)?;
        Some(self.guarded(guard, f))
    }
}
