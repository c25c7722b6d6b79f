use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

/// Fixed-capacity single-producer/single-consumer byte queue.
///
/// `wpos` points to the slot the next byte is written to, `rpos` at the next byte that can be
/// read. One slot is always left unused so that `rpos == wpos` means empty and
/// `(wpos + 1) % N == rpos` means full, which gives `N - 1` usable bytes.
///
/// Each cursor has exactly one writer: `wpos` is only stored by the producer, `rpos` only by the
/// consumer. The other side loads it with acquire ordering for comparison, so no lock and no
/// critical section is needed between an interrupt handler and the main loop on a single core.
///
/// invariants: 0 <= rpos < N, 0 <= wpos < N
pub struct RingBuffer<const N: usize> {
    store: UnsafeCell<[u8; N]>,
    rpos: AtomicUsize,
    wpos: AtomicUsize,
}

// Slots between rpos and wpos belong to the consumer, the rest to the producer. The cursors
// hand ownership over with release/acquire pairs.
unsafe impl<const N: usize> Sync for RingBuffer<N> {}

impl<const N: usize> RingBuffer<N> {
    const MIN_SIZE: () = assert!(N >= 2, "ring buffer needs at least two slots");

    /// Creates an empty ring buffer. Usable in `static` initializers.
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::MIN_SIZE;

        Self {
            store: UnsafeCell::new([0; N]),
            rpos: AtomicUsize::new(0),
            wpos: AtomicUsize::new(0),
        }
    }

    /// Number of bytes the buffer can hold at once.
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Inserts one byte. Returns `false` without touching the buffer if it is full.
    pub fn put(&mut self, byte: u8) -> bool {
        self.enqueue(byte)
    }

    /// Removes and returns the oldest byte.
    pub fn get(&mut self) -> Option<u8> {
        self.dequeue()
    }

    /// Number of buffered bytes.
    pub fn depth(&self) -> usize {
        depth::<N>(self.rpos.load(Ordering::Acquire), self.wpos.load(Ordering::Acquire))
    }

    pub fn is_empty(&self) -> bool {
        self.depth() == 0
    }

    pub fn is_full(&self) -> bool {
        self.depth() == self.capacity()
    }

    /// Splits the buffer into its producer and consumer halves.
    ///
    /// The halves can be moved to different execution contexts (e.g. one into an interrupt
    /// handler). Borrowing `self` mutably guarantees there is never more than one of each.
    pub fn split(&mut self) -> (Producer<'_, N>, Consumer<'_, N>) {
        let ring: &Self = self;
        (Producer { ring }, Consumer { ring })
    }

    fn slot(&self, index: usize) -> *mut u8 {
        debug_assert!(index < N);
        // Pointer arithmetic stays inside the array; no reference to the whole store is formed
        // because the other side may be accessing a different slot at the same time.
        unsafe { self.store.get().cast::<u8>().add(index) }
    }

    // Producer side. Must only ever be called from one context at a time.
    fn enqueue(&self, byte: u8) -> bool {
        let wpos = self.wpos.load(Ordering::Relaxed);
        let next = advance::<N>(wpos, 1);

        if next == self.rpos.load(Ordering::Acquire) {
            return false;
        }

        unsafe { self.slot(wpos).write_volatile(byte) };
        self.wpos.store(next, Ordering::Release);
        true
    }

    // Consumer side. Must only ever be called from one context at a time.
    fn dequeue(&self) -> Option<u8> {
        let rpos = self.rpos.load(Ordering::Relaxed);

        if rpos == self.wpos.load(Ordering::Acquire) {
            return None;
        }

        let byte = unsafe { self.slot(rpos).read_volatile() };
        self.rpos.store(advance::<N>(rpos, 1), Ordering::Release);
        Some(byte)
    }

    // Copies up to data.len() of the oldest bytes without releasing their slots.
    fn peek_into(&self, data: &mut [u8]) -> usize {
        let rpos = self.rpos.load(Ordering::Relaxed);
        let available = depth::<N>(rpos, self.wpos.load(Ordering::Acquire));
        let count = available.min(data.len());

        for (offset, out) in data[..count].iter_mut().enumerate() {
            *out = unsafe { self.slot(advance::<N>(rpos, offset)).read_volatile() };
        }

        count
    }

    // Releases up to count of the oldest bytes. Returns the number actually released.
    fn discard(&self, count: usize) -> usize {
        let rpos = self.rpos.load(Ordering::Relaxed);
        let count = count.min(depth::<N>(rpos, self.wpos.load(Ordering::Acquire)));

        self.rpos.store(advance::<N>(rpos, count), Ordering::Release);
        count
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

const fn advance<const N: usize>(pos: usize, count: usize) -> usize {
    (pos + count) % N
}

const fn depth<const N: usize>(rpos: usize, wpos: usize) -> usize {
    (N + wpos - rpos) % N
}

/// Writing half of a [`RingBuffer`].
pub struct Producer<'a, const N: usize> {
    ring: &'a RingBuffer<N>,
}

impl<const N: usize> Producer<'_, N> {
    /// Inserts one byte. Returns `false` without touching the buffer if it is full.
    pub fn put(&mut self, byte: u8) -> bool {
        self.ring.enqueue(byte)
    }

    pub fn depth(&self) -> usize {
        self.ring.depth()
    }

    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }
}

/// Reading half of a [`RingBuffer`].
pub struct Consumer<'a, const N: usize> {
    ring: &'a RingBuffer<N>,
}

impl<const N: usize> Consumer<'_, N> {
    /// Removes and returns the oldest byte.
    pub fn get(&mut self) -> Option<u8> {
        self.ring.dequeue()
    }

    /// Copies as many of the oldest bytes as fit into `data` without removing them. Use
    /// [`consume`](Self::consume) once they have been handed off.
    pub fn peek_into(&self, data: &mut [u8]) -> usize {
        self.ring.peek_into(data)
    }

    /// Removes up to `count` of the oldest bytes and returns how many were removed.
    pub fn consume(&mut self, count: usize) -> usize {
        self.ring.discard(count)
    }

    pub fn depth(&self) -> usize {
        self.ring.depth()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}
