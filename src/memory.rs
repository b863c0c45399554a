//! # memory.rs
//!
//! Layered lookup memory for evaluation.
//!
//! Lookups walk from the innermost layer outwards:
//!
//! 1. the current call frame (`$0`, `$1`, ... bound to call arguments),
//! 2. the global bindings of the [`ScopeMemory`],
//! 3. the parent chain, ending with the immutable [`NativeMemory`].
//!
//! Keys follow the storage key convention: `$name` for variables and
//! constants, `name@arity` for functions (`name@*` for native variadics).

use crate::constants;
use crate::error::{Error, Result};
use crate::functions::buildin::{self, NativeFunction};
use crate::functions::core::NumericBackend;
use crate::functions::custom::{merge_clause, Clause, ARITY_THRESH};
use crate::node::Node;

use smallvec::SmallVec;
use std::collections::HashMap;
use std::rc::Rc;

/// Default maximum number of nested call frames.
pub const DEFAULT_MAX_DEPTH: usize = 20;

/// A value stored under a key.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding<T = f64> {
    /// A node, evaluated on every lookup.
    Value(Rc<Node<T>>),
    /// A predefined constant as a decimal literal.
    Constant(&'static str),
    /// A built-in function.
    Native(NativeFunction),
    /// User-defined clauses in dispatch order.
    Clauses(Vec<Rc<Clause<T>>>),
}

impl<T> Binding<T> {
    pub fn value(node: Node<T>) -> Self {
        Binding::Value(Rc::new(node))
    }
}

/// A lookup layer.
///
/// `get`, `put` and `delete` act on this layer only; [`Memory::lookup`]
/// falls through to the parent chain.
pub trait Memory<T: NumericBackend> {
    fn get(&self, key: &str) -> Option<Binding<T>>;

    /// # Errors
    ///
    /// [`Error::MemoryImmutable`] for read-only layers.
    fn put(&mut self, key: &str, binding: Binding<T>) -> Result<()>;

    /// Removes and returns the binding stored under `key`.
    ///
    /// # Errors
    ///
    /// [`Error::MemoryImmutable`] for read-only layers.
    fn delete(&mut self, key: &str) -> Result<Option<Binding<T>>>;

    fn parent(&self) -> Option<&dyn Memory<T>>;

    /// Looks `key` up in this layer, then in each parent in turn.
    fn lookup(&self, key: &str) -> Option<Binding<T>> {
        self.get(key).or_else(|| self.parent().and_then(|parent| parent.lookup(key)))
    }
}

/// Built-in constants and functions. Read-only, has no parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NativeMemory;

impl<T: NumericBackend> Memory<T> for NativeMemory {
    fn get(&self, key: &str) -> Option<Binding<T>> {
        if key.starts_with('$') {
            return constants::lookup(key).map(Binding::Constant);
        }
        buildin::lookup(key)
            .or_else(|| {
                // fixed arity falls back to the variadic entry
                let (name, arity) = key.split_once('@')?;
                let arity: usize = arity.parse().ok()?;
                (arity > 0).then(|| buildin::lookup(&format!("{name}@*"))).flatten()
            })
            .map(Binding::Native)
    }

    fn put(&mut self, key: &str, _binding: Binding<T>) -> Result<()> {
        Err(Error::MemoryImmutable { key: key.to_string() })
    }

    fn delete(&mut self, key: &str) -> Result<Option<Binding<T>>> {
        Err(Error::MemoryImmutable { key: key.to_string() })
    }

    fn parent(&self) -> Option<&dyn Memory<T>> {
        None
    }
}

/// Positional bindings of one function call.
///
/// Slots are stored inline using `SmallVec` up to `ARITY_THRESH`
/// bindings before heap allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<T = f64> {
    slots: SmallVec<[(String, Rc<Node<T>>); ARITY_THRESH]>,
}

impl<T: NumericBackend> Frame<T> {
    pub fn new() -> Self {
        Self { slots: SmallVec::new() }
    }

    /// A frame binding `$0`, `$1`, ... to `args`.
    pub fn positional(args: Vec<T>) -> Self {
        Self {
            slots: args.into_iter()
                .enumerate()
                .map(|(idx, value)| (format!("${idx}"), Rc::new(Node::Number(value))))
                .collect(),
        }
    }

    /// Adds or replaces a binding, consuming and returning the frame.
    pub fn with_binding(mut self, key: &str, node: Node<T>) -> Self {
        self.bind(key, Rc::new(node));
        self
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn bind(&mut self, key: &str, node: Rc<Node<T>>) {
        match self.slots.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = node,
            None => self.slots.push((key.to_string(), node)),
        }
    }
}

impl<T: NumericBackend> Default for Frame<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: NumericBackend> Memory<T> for Frame<T> {
    fn get(&self, key: &str) -> Option<Binding<T>> {
        self.slots.iter()
            .find(|(k, _)| k == key)
            .map(|(_, node)| Binding::Value(Rc::clone(node)))
    }

    /// Only node values can be bound in a frame; anything else is
    /// [`Error::AssignmentInvalid`].
    fn put(&mut self, key: &str, binding: Binding<T>) -> Result<()> {
        match binding {
            Binding::Value(node) => {
                self.bind(key, node);
                Ok(())
            }
            _ => Err(Error::AssignmentInvalid { node: key.to_string() }),
        }
    }

    fn delete(&mut self, key: &str) -> Result<Option<Binding<T>>> {
        let position = self.slots.iter().position(|(k, _)| k == key);
        Ok(position.map(|idx| Binding::Value(self.slots.remove(idx).1)))
    }

    fn parent(&self) -> Option<&dyn Memory<T>> {
        None
    }
}

/// Bounded stack of call frames.
#[derive(Debug, Clone)]
struct CallStack<T> {
    frames: Vec<Frame<T>>,
    max_depth: usize,
    /// Frames pushed by declarations, exempt from `max_depth`.
    placeholders: usize,
}

impl<T> CallStack<T> {
    fn calls(&self) -> usize {
        self.frames.len() - self.placeholders
    }
}

/// User bindings, call frames and a parent chain.
///
/// A session is confined to one thread: bindings share nodes through `Rc`.
pub struct ScopeMemory<T: NumericBackend = f64> {
    bindings: HashMap<String, Binding<T>>,
    stack: CallStack<T>,
    parent: Option<Box<dyn Memory<T>>>,
    resolving: Vec<String>,
}

impl<T: NumericBackend> ScopeMemory<T> {
    /// An empty scope whose parent is the [`NativeMemory`].
    pub fn new() -> Self {
        Self::with_parent(Box::new(NativeMemory))
    }

    /// An empty scope with the given parent layer.
    pub fn with_parent(parent: Box<dyn Memory<T>>) -> Self {
        Self {
            bindings: HashMap::new(),
            stack: CallStack { frames: Vec::new(), max_depth: DEFAULT_MAX_DEPTH, placeholders: 0 },
            parent: Some(parent),
            resolving: Vec::new(),
        }
    }

    /// An empty scope without any parent, not even the native builtins.
    pub fn detached() -> Self {
        Self {
            parent: None,
            ..Self::new()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.stack.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.stack.max_depth
    }

    /// Number of active call frames.
    pub fn depth(&self) -> usize {
        self.stack.calls()
    }

    /// # Errors
    ///
    /// [`Error::StackOverflow`] if the stack already holds `max_depth` frames.
    pub fn push_frame(&mut self, frame: Frame<T>) -> Result<()> {
        if self.stack.calls() >= self.stack.max_depth {
            log::warn!("call depth limit of {} reached", self.stack.max_depth);
            return Err(Error::StackOverflow { depth: self.stack.max_depth });
        }
        self.stack.frames.push(frame);
        log::debug!("push frame, depth {}", self.stack.calls());
        Ok(())
    }

    /// # Errors
    ///
    /// [`Error::StackEmpty`] if no frame is active.
    pub fn pop_frame(&mut self) -> Result<Frame<T>> {
        if self.stack.calls() == 0 {
            return Err(Error::StackEmpty);
        }
        let frame = self.stack.frames.pop().ok_or(Error::StackEmpty)?;
        log::debug!("pop frame, depth {}", self.stack.calls());
        Ok(frame)
    }

    /// Runs `f` with `frame` pushed, popping it on every exit path.
    pub fn with_frame<R, F>(&mut self, frame: Frame<T>, f: F) -> Result<R>
    where
        F: FnOnce(&mut Self) -> Result<R>,
    {
        self.push_frame(frame)?;
        let result = f(self);
        self.pop_frame()?;
        result
    }

    /// Runs `f` with a frame of parameter placeholders pushed. The frame
    /// does not count toward the call depth.
    pub(crate) fn with_placeholders<R, F>(&mut self, frame: Frame<T>, f: F) -> Result<R>
    where
        F: FnOnce(&mut Self) -> Result<R>,
    {
        self.stack.frames.push(frame);
        self.stack.placeholders += 1;
        let result = f(self);
        self.stack.placeholders -= 1;
        self.stack.frames.pop();
        result
    }

    /// Runs `f` unless `key` is already being resolved further up the
    /// evaluation, in which case `None` is returned.
    pub(crate) fn resolving<R, F>(&mut self, key: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut Self) -> R,
    {
        if self.resolving.iter().any(|k| k == key) {
            return None;
        }
        self.resolving.push(key.to_string());
        let result = f(self);
        self.resolving.pop();
        Some(result)
    }

    /// Binds variable `name` to `value` without evaluating it.
    pub fn define_variable(&mut self, name: &str, value: Node<T>) -> Result<()> {
        self.put(&format!("${name}"), Binding::value(value))
    }

    /// Removes every binding and frame. The parent chain is kept.
    pub fn clear(&mut self) {
        self.bindings.clear();
        self.stack.frames.clear();
        self.stack.placeholders = 0;
        self.resolving.clear();
    }

    /// Storage keys of the global bindings.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
}

impl<T: NumericBackend> Default for ScopeMemory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: NumericBackend> Memory<T> for ScopeMemory<T> {
    fn get(&self, key: &str) -> Option<Binding<T>> {
        self.stack.frames.last()
            .and_then(|frame| frame.get(key))
            .or_else(|| self.bindings.get(key).cloned())
    }

    /// Variables overwrite; clauses merge into the stored overload list.
    fn put(&mut self, key: &str, binding: Binding<T>) -> Result<()> {
        match binding {
            Binding::Clauses(added) => {
                let entry = self.bindings.entry(key.to_string())
                    .or_insert_with(|| Binding::Clauses(Vec::new()));
                if !matches!(entry, Binding::Clauses(_)) {
                    *entry = Binding::Clauses(Vec::new());
                }
                if let Binding::Clauses(stored) = entry {
                    for clause in added {
                        merge_clause(stored, clause);
                    }
                }
            }
            other => {
                self.bindings.insert(key.to_string(), other);
            }
        }
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<Option<Binding<T>>> {
        Ok(self.bindings.remove(key))
    }

    fn parent(&self) -> Option<&dyn Memory<T>> {
        self.parent.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::custom::Parameter;

    fn number(value: f64) -> Binding<f64> {
        Binding::value(Node::Number(value))
    }

    #[test]
    fn test_native_lookup() {
        let native = NativeMemory;
        assert_eq!(Memory::<f64>::get(&native, "$pi"), Some(Binding::Constant("3.141592653589793")));
        assert_eq!(Memory::<f64>::get(&native, "sin@1"), Some(Binding::Native(NativeFunction::Sin1)));
        assert_eq!(Memory::<f64>::get(&native, "sin@2"), None);
        assert_eq!(Memory::<f64>::get(&native, "$x"), None);
    }

    #[test]
    fn test_native_variadic_fallback() {
        let native = NativeMemory;
        assert_eq!(Memory::<f64>::get(&native, "max@3"), Some(Binding::Native(NativeFunction::MaxN)));
        assert_eq!(Memory::<f64>::get(&native, "max@1"), Some(Binding::Native(NativeFunction::MaxN)));
        assert_eq!(Memory::<f64>::get(&native, "max@0"), None);
    }

    #[test]
    fn test_native_is_immutable() {
        let mut native = NativeMemory;
        assert_eq!(
            native.put("$x", number(1.0)),
            Err(Error::MemoryImmutable { key: "$x".into() })
        );
        assert_eq!(
            Memory::<f64>::delete(&mut native, "$pi"),
            Err(Error::MemoryImmutable { key: "$pi".into() })
        );
        assert!(Memory::<f64>::parent(&native).is_none());
    }

    #[test]
    fn test_scope_lookup_order() {
        let mut scope = ScopeMemory::new();
        scope.put("$0", number(1.0)).unwrap();
        scope.put("$pi", number(3.0)).unwrap();

        // global binding shadows the native constant
        assert_eq!(scope.lookup("$pi"), Some(number(3.0)));
        assert_eq!(scope.lookup("$e"), Some(Binding::Constant("2.718281828459045")));

        scope.push_frame(Frame::positional(vec![7.0])).unwrap();
        assert_eq!(scope.lookup("$0"), Some(number(7.0)));
        scope.pop_frame().unwrap();
        assert_eq!(scope.lookup("$0"), Some(number(1.0)));
    }

    #[test]
    fn test_only_top_frame_is_visible() {
        let mut scope = ScopeMemory::<f64>::new();
        scope.push_frame(Frame::positional(vec![1.0, 2.0])).unwrap();
        scope.push_frame(Frame::positional(vec![3.0])).unwrap();
        assert_eq!(scope.lookup("$0"), Some(number(3.0)));
        assert_eq!(scope.lookup("$1"), None);
    }

    #[test]
    fn test_stack_bounds() {
        let mut scope = ScopeMemory::<f64>::new().with_max_depth(2);
        assert_eq!(scope.pop_frame(), Err(Error::StackEmpty));
        scope.push_frame(Frame::new()).unwrap();
        scope.push_frame(Frame::new()).unwrap();
        assert_eq!(scope.push_frame(Frame::new()), Err(Error::StackOverflow { depth: 2 }));
        assert_eq!(scope.depth(), 2);
    }

    #[test]
    fn test_placeholders_skip_depth_limit() {
        let mut scope = ScopeMemory::<f64>::new().with_max_depth(0);
        let frame = Frame::new().with_binding("$x", Node::identifier("0"));
        let depth = scope.with_placeholders(frame, |scope| {
            assert!(scope.lookup("$x").is_some());
            assert_eq!(scope.pop_frame(), Err(Error::StackEmpty));
            Ok(scope.depth())
        });
        assert_eq!(depth, Ok(0));
        assert!(scope.lookup("$x").is_none());
        assert_eq!(scope.push_frame(Frame::new()), Err(Error::StackOverflow { depth: 0 }));
    }

    #[test]
    fn test_with_frame_pops_on_error() {
        let mut scope = ScopeMemory::<f64>::new();
        let result: Result<()> = scope.with_frame(Frame::new(), |scope| {
            assert_eq!(scope.depth(), 1);
            Err(Error::StackEmpty)
        });
        assert!(result.is_err());
        assert_eq!(scope.depth(), 0);
    }

    #[test]
    fn test_put_merges_clauses() {
        let mut scope = ScopeMemory::<f64>::new();
        let general = Rc::new(Clause::new([Parameter::Positional(0)], Node::Number(2.0)));
        let special = Rc::new(Clause::new([Parameter::Literal(0.0)], Node::Number(1.0)));
        scope.put("f@1", Binding::Clauses(vec![general.clone()])).unwrap();
        scope.put("f@1", Binding::Clauses(vec![special.clone()])).unwrap();
        assert_eq!(scope.get("f@1"), Some(Binding::Clauses(vec![special, general])));
    }

    #[test]
    fn test_variable_overwrites() {
        let mut scope = ScopeMemory::<f64>::new();
        scope.define_variable("a", Node::Number(1.0)).unwrap();
        scope.define_variable("a", Node::Number(2.0)).unwrap();
        assert_eq!(scope.get("$a"), Some(number(2.0)));
        assert_eq!(scope.delete("$a").unwrap(), Some(number(2.0)));
        assert_eq!(scope.get("$a"), None);
    }

    #[test]
    fn test_resolving_guard() {
        let mut scope = ScopeMemory::<f64>::new();
        let nested = scope.resolving("$x", |scope| scope.resolving("$x", |_| 1));
        assert_eq!(nested, Some(None));
        assert_eq!(scope.resolving("$x", |_| 2), Some(2));
    }

    #[test]
    fn test_clear_and_detached() {
        let mut scope = ScopeMemory::<f64>::new();
        scope.define_variable("a", Node::Number(1.0)).unwrap();
        scope.push_frame(Frame::new()).unwrap();
        scope.clear();
        assert_eq!(scope.depth(), 0);
        assert_eq!(scope.keys().count(), 0);
        assert!(scope.lookup("$pi").is_some());

        let detached = ScopeMemory::<f64>::detached();
        assert!(detached.lookup("$pi").is_none());
    }

    #[test]
    fn test_frame_memory() {
        let mut frame = Frame::<f64>::new().with_binding("$x", Node::identifier("0"));
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.get("$x"), Some(Binding::value(Node::identifier("0"))));
        assert_eq!(
            frame.put("f@1", Binding::Clauses(vec![])),
            Err(Error::AssignmentInvalid { node: "f@1".into() })
        );
        assert!(frame.delete("$x").unwrap().is_some());
        assert!(frame.is_empty());
    }
}
