use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use crate::util::Ident;
use super::{
    heap::{Heap, HeapRef, Stats},
    value::Value,
    ExecError,
};

pub const DEFAULT_HEAP_LIMIT: usize = 2048;

/// Variable bindings plus the heap that owns every runtime value.
///
/// Bindings form a single flat namespace and are the collector's roots, together with a stack
/// of temporaries the evaluator is still holding on to mid-expression.
pub struct Environment {
    bindings: FxHashMap<Ident, HeapRef>,
    heap: Heap<Value>,
    temps: Vec<HeapRef>,
    heap_limit: usize,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(DEFAULT_HEAP_LIMIT)
    }
}

impl Environment {
    pub fn new(heap_limit: usize) -> Self {
        Self {
            bindings: FxHashMap::default(),
            heap: Heap::new(),
            temps: Vec::new(),
            heap_limit,
        }
    }

    pub fn set_variable(&mut self, name: Ident, value: HeapRef) {
        self.bindings.insert(name, value);
    }

    pub fn get_variable(&self, name: Ident) -> Result<HeapRef, ExecError> {
        self.bindings
            .get(&name)
            .copied()
            .ok_or_else(|| ExecError::UndefinedVariable(name.as_str().to_owned()))
    }

    pub fn get(&self, r: HeapRef) -> Result<&Value, ExecError> {
        self.heap.get(r).ok_or(ExecError::DanglingRef)
    }

    pub fn get_mut(&mut self, r: HeapRef) -> Result<&mut Value, ExecError> {
        self.heap.get_mut(r).ok_or(ExecError::DanglingRef)
    }

    /// Place `value` on the heap, collecting first if the heap is full.
    pub fn alloc(&mut self, value: Value) -> Result<HeapRef, ExecError> {
        if self.heap.len() >= self.heap_limit {
            self.collect();
            if self.heap.len() >= self.heap_limit {
                return Err(ExecError::OutOfMemory { limit: self.heap_limit });
            }
        }
        let r = self.heap.insert(value);
        trace!(live = self.heap.len(), "allocated {:?}", r);
        Ok(r)
    }

    pub fn alloc_bool(&mut self, x: bool) -> Result<HeapRef, ExecError> {
        self.alloc(Value::Bool(x))
    }

    pub fn alloc_char(&mut self, c: u8) -> Result<HeapRef, ExecError> {
        self.alloc(Value::Char(c))
    }

    pub fn alloc_int(&mut self, x: i32) -> Result<HeapRef, ExecError> {
        self.alloc(Value::Int(x))
    }

    pub fn alloc_list(&mut self, items: Vec<HeapRef>) -> Result<HeapRef, ExecError> {
        self.alloc(Value::List(items))
    }

    /// Mark everything reachable from bindings and temporaries, then free the rest.
    pub fn collect(&mut self) -> usize {
        let roots = self.bindings
            .values()
            .chain(self.temps.iter())
            .copied();
        let freed = self.heap.clean(roots);
        let stats = self.heap.stats();
        debug!(
            freed,
            live = stats.live_values,
            slots = stats.capacity,
            free_slots = stats.free_slots,
            limit = self.heap_limit,
            "collected garbage"
        );
        freed
    }

    /// Keep `r` alive across allocations until [`Environment::unroot_to`] drops it.
    pub fn root(&mut self, r: HeapRef) {
        self.temps.push(r);
    }

    pub fn temp_depth(&self) -> usize {
        self.temps.len()
    }

    pub fn unroot_to(&mut self, depth: usize) {
        self.temps.truncate(depth);
    }

    pub fn clear_temps(&mut self) {
        self.temps.clear();
    }

    pub fn stats(&self) -> Stats {
        self.heap.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Ident {
        Ident::new(name.to_string())
    }

    #[test]
    fn bindings_overwrite() {
        let mut env = Environment::default();
        let a = env.alloc_int(1).unwrap();
        let b = env.alloc_int(2).unwrap();
        env.set_variable(ident("x"), a);
        env.set_variable(ident("x"), b);
        assert_eq!(env.get_variable(ident("x")).unwrap(), b);
        assert!(matches!(
            env.get_variable(ident("y")),
            Err(ExecError::UndefinedVariable(name)) if name == "y"
        ));
    }

    #[test]
    fn full_heap_collects_before_allocating() {
        let mut env = Environment::new(4);
        let kept = env.alloc_int(7).unwrap();
        env.set_variable(ident("kept"), kept);
        for i in 0..100 {
            env.alloc_int(i).unwrap();
        }
        assert!(env.stats().collections > 0);
        assert!(env.stats().live_values <= 4);
        assert_eq!(env.get(kept).unwrap(), &Value::Int(7));
    }

    #[test]
    fn list_elements_survive_through_bindings() {
        let mut env = Environment::new(8);
        let c = env.alloc_char(b'a').unwrap();
        env.root(c);
        let inner = env.alloc_list(vec![c]).unwrap();
        env.root(inner);
        let outer = env.alloc_list(vec![inner, inner]).unwrap();
        env.unroot_to(0);
        env.set_variable(ident("xs"), outer);

        assert_eq!(env.collect(), 0);
        for _ in 0..50 {
            env.alloc_bool(true).unwrap();
        }
        assert_eq!(env.get(c).unwrap(), &Value::Char(b'a'));
        assert_eq!(env.get(outer).unwrap(), &Value::List(vec![inner, inner]));
    }

    #[test]
    fn temporaries_are_roots_until_unrooted() {
        let mut env = Environment::new(2);
        let depth = env.temp_depth();
        let a = env.alloc_int(1).unwrap();
        env.root(a);
        let b = env.alloc_int(2).unwrap();
        env.root(b);
        assert!(matches!(env.alloc_int(3), Err(ExecError::OutOfMemory { limit: 2 })));

        env.unroot_to(depth);
        env.alloc_int(3).unwrap();
        assert!(env.get(a).is_err());
        assert!(env.get(b).is_err());
    }
}
