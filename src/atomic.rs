//! Scoped atomic sections.
//!
//! A guard captures the global interrupt-enable state, forces a known state,
//! and puts interrupts back the way it was configured to when it is dropped.
//! Because the restore happens in `Drop`, early returns and `?` inside the
//! protected block leave interrupts exactly as configured.
//!
//! # Block kinds
//!
//! ```text
//! constructor                  on entry      on drop
//! ───────────────────────────  ────────────  ─────────────────
//! atomic_restore_state         disable       restore saved
//! atomic_force_on              disable       enable
//! non_atomic_restore_state     enable        restore saved
//! non_atomic_force_off         enable        disable
//! ```
//!
//! A non-atomic section may be nested inside an atomic one to let
//! higher-priority interrupts in for a short stretch of a long atomic block.

use core::marker::PhantomData;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Access to the platform's global interrupt-enable bit.
///
/// Implemented by the board-support layer. All methods take `&self`: the bit
/// is global machine state, not owned by any one caller.
pub trait InterruptControl {
    /// Current state of the global interrupt-enable bit.
    fn interrupts_enabled(&self) -> bool;

    /// Set the global interrupt-enable bit.
    fn enable_interrupts(&self);

    /// Clear the global interrupt-enable bit.
    fn disable_interrupts(&self);
}

impl<T: InterruptControl + ?Sized> InterruptControl for &T {
    #[inline]
    fn interrupts_enabled(&self) -> bool {
        (**self).interrupts_enabled()
    }

    #[inline]
    fn enable_interrupts(&self) {
        (**self).enable_interrupts()
    }

    #[inline]
    fn disable_interrupts(&self) {
        (**self).disable_interrupts()
    }
}

/// What the guard does to the interrupt-enable bit when dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OnExit {
    /// Put back the state captured on entry.
    Restore(bool),
    /// Enable unconditionally.
    ForceOn,
    /// Disable unconditionally.
    ForceOff,
}

/// RAII guard for a scoped (non-)atomic section.
#[must_use = "the section ends as soon as the guard is dropped"]
pub struct InterruptGuard<'a, I: InterruptControl + ?Sized> {
    ctl: &'a I,
    on_exit: OnExit,
}

impl<'a, I: InterruptControl + ?Sized> InterruptGuard<'a, I> {
    /// Save the interrupt state, disable, restore the saved state on drop.
    #[inline]
    pub fn atomic_restore_state(ctl: &'a I) -> Self {
        let saved = ctl.interrupts_enabled();
        ctl.disable_interrupts();
        Self {
            ctl,
            on_exit: OnExit::Restore(saved),
        }
    }

    /// Disable, then enable on drop regardless of the entry state.
    ///
    /// Only correct when interrupts are known to be enabled on entry.
    #[inline]
    pub fn atomic_force_on(ctl: &'a I) -> Self {
        ctl.disable_interrupts();
        Self {
            ctl,
            on_exit: OnExit::ForceOn,
        }
    }

    /// Save the interrupt state, enable, restore the saved state on drop.
    #[inline]
    pub fn non_atomic_restore_state(ctl: &'a I) -> Self {
        let saved = ctl.interrupts_enabled();
        ctl.enable_interrupts();
        Self {
            ctl,
            on_exit: OnExit::Restore(saved),
        }
    }

    /// Enable, then disable on drop regardless of the entry state.
    ///
    /// Only correct when interrupts are known to be disabled on entry.
    #[inline]
    pub fn non_atomic_force_off(ctl: &'a I) -> Self {
        ctl.enable_interrupts();
        Self {
            ctl,
            on_exit: OnExit::ForceOff,
        }
    }
}

impl<I: InterruptControl + ?Sized> Drop for InterruptGuard<'_, I> {
    #[inline]
    fn drop(&mut self) {
        match self.on_exit {
            OnExit::Restore(true) | OnExit::ForceOn => self.ctl.enable_interrupts(),
            OnExit::Restore(false) | OnExit::ForceOff => self.ctl.disable_interrupts(),
        }
    }
}

/// Run `f` with interrupts disabled, restoring the previous state afterwards.
#[inline]
pub fn atomic<I, R>(ctl: &I, f: impl FnOnce() -> R) -> R
where
    I: InterruptControl + ?Sized,
{
    let _guard = InterruptGuard::atomic_restore_state(ctl);
    f()
}

/// Run `f` with interrupts enabled, restoring the previous state afterwards.
#[inline]
pub fn non_atomic<I, R>(ctl: &I, f: impl FnOnce() -> R) -> R
where
    I: InterruptControl + ?Sized,
{
    let _guard = InterruptGuard::non_atomic_restore_state(ctl);
    f()
}

/// Software global-interrupt-enable flag.
///
/// Models one execution context's view of the enable bit: single-threaded
/// host tests and boards where handlers run on the same context as the main
/// loop. Two contexts sharing one flag can close their sections out of
/// order; use [`SectionLock`] for that.
pub struct InterruptFlag {
    enabled: AtomicBool,
}

impl InterruptFlag {
    /// Create a flag in the given state.
    pub const fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
        }
    }
}

impl Default for InterruptFlag {
    /// Interrupts start disabled, as after reset.
    fn default() -> Self {
        Self::new(false)
    }
}

impl InterruptControl for InterruptFlag {
    #[inline]
    fn interrupts_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    #[inline]
    fn enable_interrupts(&self) {
        self.enabled.store(true, Ordering::Release);
    }

    #[inline]
    fn disable_interrupts(&self) {
        self.enabled.store(false, Ordering::Release);
    }
}

/// A schedulable context (task, thread) that can own a [`SectionLock`].
pub trait ExecutionContext {
    /// Id of the running context. Never 0.
    fn current_id() -> usize;

    /// Called while waiting for another context to leave its section.
    fn relax() {
        core::hint::spin_loop();
    }
}

/// Interrupt control for boards that run the UART handlers on their own
/// task instead of a real vector.
///
/// "Interrupts disabled" means the calling context owns the lock:
///
/// ```text
/// main task                              dispatcher task
/// ─────────                              ───────────────
/// atomic(|| ring.try_pop())              atomic(|| on_receive())
///   disable: wait, take ownership          disable: wait, take ownership
///   ... main-loop section ...              ... handler runs exclusively ...
///   enable: release                        enable: release
/// ```
///
/// Each context sees its own state, so sections on different tasks cannot
/// restore each other's enable bit. A handler's nested sections see
/// "disabled" and leave the lock alone, as on a core where handlers run
/// with interrupts masked.
pub struct SectionLock<C: ExecutionContext> {
    /// Id of the owning context, 0 when free.
    owner: AtomicUsize,
    _context: PhantomData<fn() -> C>,
}

impl<C: ExecutionContext> SectionLock<C> {
    /// Create an unowned lock (interrupts enabled everywhere).
    pub const fn new() -> Self {
        Self {
            owner: AtomicUsize::new(0),
            _context: PhantomData,
        }
    }

    /// Whether any context is inside a section.
    pub fn is_held(&self) -> bool {
        self.owner.load(Ordering::Acquire) != 0
    }
}

impl<C: ExecutionContext> Default for SectionLock<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ExecutionContext> InterruptControl for SectionLock<C> {
    #[inline]
    fn interrupts_enabled(&self) -> bool {
        self.owner.load(Ordering::Acquire) != C::current_id()
    }

    /// Release the lock if the calling context holds it.
    #[inline]
    fn enable_interrupts(&self) {
        let me = C::current_id();
        let _ = self
            .owner
            .compare_exchange(me, 0, Ordering::Release, Ordering::Relaxed);
    }

    /// Take the lock, waiting while another context holds it.
    #[inline]
    fn disable_interrupts(&self) {
        let me = C::current_id();
        if self.owner.load(Ordering::Acquire) == me {
            return;
        }
        while self
            .owner
            .compare_exchange_weak(0, me, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            C::relax();
        }
    }
}
