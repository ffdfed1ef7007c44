/// A non-owning handle to a value on a [`Heap`]. The generation makes handles to freed slots
/// stale instead of silently aliasing whatever reuses the slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HeapRef {
    index: u32,
    generation: u32,
}

impl HeapRef {
    fn new(index: usize, generation: u32) -> Self {
        Self {
            index: index as u32,
            generation,
        }
    }

    fn index(&self) -> usize {
        self.index as usize
    }
}

/// Anything stored on a heap must say which other heap values it refers to.
pub trait HeapValue {
    fn children(&self) -> &[HeapRef];
}

struct Slot<T> {
    generation: u32,
    marked: bool,
    item: Option<T>,
}

/// Arena of values reclaimed by mark-and-sweep.
pub struct Heap<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    len: usize,
    collections: usize,
}

impl<T: HeapValue> Default for Heap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HeapValue> Heap<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::with_capacity(16),
            free: Vec::new(),
            len: 0,
            collections: 0,
        }
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, item: T) -> HeapRef {
        self.len += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.item = Some(item);
                HeapRef::new(index, slot.generation)
            },
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    marked: false,
                    item: Some(item),
                });
                HeapRef::new(self.slots.len() - 1, 0)
            },
        }
    }

    pub fn get(&self, r: HeapRef) -> Option<&T> {
        self.slots
            .get(r.index())
            .filter(|slot| slot.generation == r.generation)
            .and_then(|slot| slot.item.as_ref())
    }

    pub fn get_mut(&mut self, r: HeapRef) -> Option<&mut T> {
        self.slots
            .get_mut(r.index())
            .filter(|slot| slot.generation == r.generation)
            .and_then(|slot| slot.item.as_mut())
    }

    /// Free every value not reachable from `roots`, returning how many were freed.
    pub fn clean(&mut self, roots: impl IntoIterator<Item=HeapRef>) -> usize {
        for slot in &mut self.slots {
            slot.marked = false;
        }

        // Mark
        let mut pending = roots.into_iter().collect::<Vec<_>>();
        while let Some(r) = pending.pop() {
            let slot = match self.slots.get_mut(r.index()) {
                Some(slot) if slot.generation == r.generation && !slot.marked => slot,
                _ => continue,
            };
            slot.marked = true;
            if let Some(item) = &slot.item {
                pending.extend_from_slice(item.children());
            }
        }

        // Sweep
        let mut freed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.item.is_some() && !slot.marked {
                slot.item = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index);
                freed += 1;
            }
        }
        self.len -= freed;
        self.collections += 1;
        freed
    }

    pub fn stats(&self) -> Stats {
        Stats {
            live_values: self.len,
            capacity: self.slots.len(),
            free_slots: self.free.len(),
            collections: self.collections,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Stats {
    pub live_values: usize,
    pub capacity: usize,
    pub free_slots: usize,
    pub collections: usize,
}
