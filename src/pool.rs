/// Object pools for zero-allocation tick management
///
/// Both pools allocate their full slot storage once at construction.
/// `acquire` hands out the next unused slot in O(1) and `reset`
/// rewinds the free index without releasing memory, so steady-state
/// parsing and dispatch never touch the allocator.

use crate::tick::{FlyweightTick, Tick};

/// Pool of owning ticks.
#[derive(Debug, Clone)]
pub struct TickPool {
    slots: Vec<Tick>,
    next_index: usize,
}

impl TickPool {
    pub fn new(capacity: usize) -> Self {
        TickPool {
            slots: vec![Tick::default(); capacity],
            next_index: 0,
        }
    }

    /// Next unused slot, or `None` when the pool is exhausted.
    pub fn acquire(&mut self) -> Option<&mut Tick> {
        if self.next_index >= self.slots.len() {
            return None;
        }
        let slot = &mut self.slots[self.next_index];
        self.next_index += 1;
        Some(slot)
    }

    /// Rewind the free index. Callers must not retain references to
    /// previously acquired slots across a reset.
    pub fn reset(&mut self) {
        self.next_index = 0;
    }

    /// The acquired prefix of the pool.
    pub fn ticks(&self) -> &[Tick] {
        &self.slots[..self.next_index]
    }

    pub fn len(&self) -> usize {
        self.next_index
    }

    pub fn is_empty(&self) -> bool {
        self.next_index == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_full(&self) -> bool {
        self.next_index >= self.slots.len()
    }
}

/// Pool of flyweight ticks, lifetime-bound to the buffer its ticks
/// borrow from. Resetting for a new buffer requires a new pool value,
/// which is how the borrow rule "no tick outlives its buffer" stays
/// compiler-checked.
#[derive(Debug)]
pub struct FlyweightTickPool<'a> {
    slots: Vec<FlyweightTick<'a>>,
    next_index: usize,
}

impl<'a> FlyweightTickPool<'a> {
    pub fn new(capacity: usize) -> Self {
        FlyweightTickPool {
            slots: vec![FlyweightTick::default(); capacity],
            next_index: 0,
        }
    }

    pub fn acquire(&mut self) -> Option<&mut FlyweightTick<'a>> {
        if self.next_index >= self.slots.len() {
            return None;
        }
        let slot = &mut self.slots[self.next_index];
        self.next_index += 1;
        Some(slot)
    }

    pub fn reset(&mut self) {
        self.next_index = 0;
    }

    pub fn ticks(&self) -> &[FlyweightTick<'a>] {
        &self.slots[..self.next_index]
    }

    pub fn len(&self) -> usize {
        self.next_index
    }

    pub fn is_empty(&self) -> bool {
        self.next_index == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_full(&self) -> bool {
        self.next_index >= self.slots.len()
    }
}
