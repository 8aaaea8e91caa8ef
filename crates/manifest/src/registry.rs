use std::any::Any;
use std::rc::Rc;

use ahash::AHashMap;

/// An instantiated module value. Containers are single-threaded, so values
/// are reference-counted and identity-comparable via [`Rc::ptr_eq`].
pub type Value = Rc<dyn Any>;

type BuildFn = dyn Fn(&[Value]) -> anyhow::Result<Value>;
type FinalizeFn = dyn Fn(&Value);

/// A native constructor with a declared argument count.
///
/// A factory manifest is only accepted when its dependency list length
/// matches the arity declared here.
pub struct Builder {
    arity: usize,
    build: Box<BuildFn>,
}

impl Builder {
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Invoke the constructor with dependency values in declared order.
    pub fn build(&self, args: &[Value]) -> anyhow::Result<Value> {
        (self.build)(args)
    }
}

/// A native teardown hook invoked before an instantiated value is dropped.
pub struct Finalizer {
    run: Box<FinalizeFn>,
}

impl Finalizer {
    pub fn run(&self, value: &Value) {
        (self.run)(value);
    }
}

/// Named builders and finalizers that factory manifests link against.
#[derive(Default)]
pub struct BuilderRegistry {
    builders: AHashMap<String, Rc<Builder>>,
    finalizers: AHashMap<String, Rc<Finalizer>>,
}

impl BuilderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_builder<F>(&mut self, name: impl Into<String>, arity: usize, build: F)
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + 'static,
    {
        self.builders.insert(
            name.into(),
            Rc::new(Builder {
                arity,
                build: Box::new(build),
            }),
        );
    }

    pub fn register_finalizer<F>(&mut self, name: impl Into<String>, run: F)
    where
        F: Fn(&Value) + 'static,
    {
        self.finalizers.insert(
            name.into(),
            Rc::new(Finalizer { run: Box::new(run) }),
        );
    }

    pub fn builder(&self, name: &str) -> Option<Rc<Builder>> {
        self.builders.get(name).cloned()
    }

    pub fn finalizer(&self, name: &str) -> Option<Rc<Finalizer>> {
        self.finalizers.get(name).cloned()
    }
}
