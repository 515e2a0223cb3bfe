//! Fixed-capacity SPSC byte ring for the UART.
//!
//! One instance carries received bytes (ISR produces, main loop consumes),
//! another carries bytes to transmit (main loop produces, ISR consumes).
//!
//! # Index discipline
//!
//! ```text
//!   tail = last slot read        head = last slot written
//!        │                            │
//!   [ . ][ r ][ a ][ b ][ c ][ . ][ . ][ . ]
//!              └── pending ──┘
//! ```
//!
//! - `head == tail` means empty
//! - `(head + 1) & MASK == tail` means full, so N - 1 slots are usable
//! - Only the producer stores `head`, only the consumer stores `tail`
//! - Consumer-side comparisons of the pair run inside an atomic section

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::atomic::{atomic, InterruptControl};

/// Byte ring buffer shared between one producer and one consumer.
///
/// # Safety
///
/// This type uses `UnsafeCell` internally but is safe to share because:
/// - The producer only writes the slot it is about to publish via `head`
/// - The consumer only reads slots already published and not yet released
/// - Each index has exactly one writer for the lifetime of the buffer
///
/// Holding to the single-producer/single-consumer roles is the caller's
/// contract, as with the other lock-free buffers in this crate.
pub struct RingBuffer<const N: usize> {
    slots: UnsafeCell<[u8; N]>,
    head: AtomicUsize,
    tail: AtomicUsize,
}

// SAFETY: Single producer, single consumer, atomic index publication.
unsafe impl<const N: usize> Sync for RingBuffer<N> {}
unsafe impl<const N: usize> Send for RingBuffer<N> {}

impl<const N: usize> RingBuffer<N> {
    /// Mask for wrapping an index. N must be a power of 2.
    const MASK: usize = N - 1;

    /// Create an empty buffer.
    ///
    /// Fails to compile unless N is a power of 2 and at least 2.
    pub const fn new() -> Self {
        const {
            assert!(
                N.is_power_of_two() && N >= 2,
                "Ring buffer size must be a power of 2, >= 2"
            )
        };

        Self {
            slots: UnsafeCell::new([0u8; N]),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Producer side: queue one byte.
    ///
    /// Returns `false` without touching the buffer if it is full. Never
    /// blocks; retrying or recording the loss is up to the caller.
    #[inline]
    pub fn try_push(&self, byte: u8) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let next = (head + 1) & Self::MASK;

        if next == self.tail.load(Ordering::Acquire) {
            return false;
        }

        // SAFETY: slot `next` is outside the consumer's readable range until
        // `head` is published below.
        unsafe {
            (*self.slots.get())[next] = byte;
        }
        self.head.store(next, Ordering::Release);
        true
    }

    /// Consumer side: take the oldest byte, or `None` if empty.
    #[inline]
    pub fn try_pop<I>(&self, ctl: &I) -> Option<u8>
    where
        I: InterruptControl + ?Sized,
    {
        atomic(ctl, || {
            let tail = self.tail.load(Ordering::Relaxed);
            if self.head.load(Ordering::Acquire) == tail {
                return None;
            }

            let next = (tail + 1) & Self::MASK;
            // SAFETY: slot `next` was published by the producer and is not
            // released back to it until `tail` is stored.
            let byte = unsafe { (*self.slots.get())[next] };
            self.tail.store(next, Ordering::Release);
            Some(byte)
        })
    }

    /// Consumer side: look at the oldest byte without removing it.
    #[inline]
    pub fn peek<I>(&self, ctl: &I) -> Option<u8>
    where
        I: InterruptControl + ?Sized,
    {
        atomic(ctl, || {
            let tail = self.tail.load(Ordering::Relaxed);
            if self.head.load(Ordering::Acquire) == tail {
                return None;
            }

            // SAFETY: see `try_pop`.
            Some(unsafe { (*self.slots.get())[(tail + 1) & Self::MASK] })
        })
    }

    /// Number of bytes waiting to be consumed.
    #[inline]
    pub fn available<I>(&self, ctl: &I) -> usize
    where
        I: InterruptControl + ?Sized,
    {
        atomic(ctl, || {
            let head = self.head.load(Ordering::Acquire);
            let tail = self.tail.load(Ordering::Acquire);
            (N + head - tail) & Self::MASK
        })
    }

    /// True if nothing is waiting to be consumed.
    #[inline]
    pub fn is_empty<I>(&self, ctl: &I) -> bool
    where
        I: InterruptControl + ?Sized,
    {
        atomic(ctl, || self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire))
    }

    /// Consumer side: discard everything pending.
    #[inline]
    pub fn flush<I>(&self, ctl: &I)
    where
        I: InterruptControl + ?Sized,
    {
        atomic(ctl, || {
            let head = self.head.load(Ordering::Acquire);
            self.tail.store(head, Ordering::Release);
        });
    }

    /// Put both indices back to zero.
    ///
    /// Only valid while neither side is running (transport init).
    #[inline]
    pub fn reset(&self) {
        self.head.store(0, Ordering::Release);
        self.tail.store(0, Ordering::Release);
    }

    /// Usable capacity (one slot is sacrificed to tell full from empty).
    #[inline]
    pub const fn capacity(&self) -> usize {
        N - 1
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atomic::InterruptFlag;

    #[test]
    fn test_ring_basic_push_pop() {
        let ctl = InterruptFlag::new(true);
        let ring = RingBuffer::<8>::new();

        assert!(ring.try_push(b'a'));
        assert!(ring.try_push(b'b'));

        assert_eq!(ring.available(&ctl), 2);
        assert_eq!(ring.try_pop(&ctl), Some(b'a'));
        assert_eq!(ring.try_pop(&ctl), Some(b'b'));
        assert_eq!(ring.try_pop(&ctl), None);
    }

    #[test]
    fn test_ring_consumer_ops_restore_interrupts() {
        let ctl = InterruptFlag::new(true);
        let ring = RingBuffer::<4>::new();

        ring.try_push(1);
        let _ = ring.peek(&ctl);
        let _ = ring.try_pop(&ctl);
        let _ = ring.available(&ctl);
        ring.flush(&ctl);

        assert!(ctl.interrupts_enabled());
    }

    #[test]
    fn test_ring_capacity_is_n_minus_one() {
        let ctl = InterruptFlag::new(true);
        let ring = RingBuffer::<4>::new();

        assert_eq!(ring.capacity(), 3);
        assert!(ring.try_push(1));
        assert!(ring.try_push(2));
        assert!(ring.try_push(3));
        assert!(!ring.try_push(4));
        assert_eq!(ring.available(&ctl), 3);
    }

    #[test]
    fn test_ring_reset() {
        let ctl = InterruptFlag::new(true);
        let ring = RingBuffer::<4>::new();

        ring.try_push(1);
        ring.try_push(2);
        ring.reset();

        assert!(ring.is_empty(&ctl));
        assert_eq!(ring.available(&ctl), 0);
    }
}
