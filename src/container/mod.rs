//! The container: record store, resolution engine and invalidation engine
//!
//! One [`Container`] owns the registry of lifecycle records and the
//! collaborators that find, load and watch module sources. All operations
//! run to completion on the calling thread; reentrancy only happens through
//! synchronous recursive dependency resolution.

mod invalidate;
mod record;

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use tracing::{debug, warn};

use manifest::{BuilderRegistry, LoadedValue, ManifestLoader, Metadata, SourceLoader, Value};
use resolve::Resolver;
use watch::{ChangeNotifier, FsNotifier, NullNotifier, WatchError};

use crate::error::ContainerError;
use crate::options::Options;
use record::{Record, State};

pub(crate) type SharedRecord = Rc<RefCell<Record>>;

pub struct Container {
    resolver: Resolver,
    loader: Box<dyn SourceLoader>,
    notifier: Box<dyn ChangeNotifier>,
    records: AHashMap<String, SharedRecord>,
    handlers: Vec<Box<dyn Fn(&ContainerError)>>,
    watching: bool,
}

impl Container {
    /// Build a container over JSON manifests with file-system watching
    /// (unless disabled in `options`).
    pub fn new(options: Options, builders: BuilderRegistry) -> Result<Self, WatchError> {
        let notifier: Box<dyn ChangeNotifier> = if options.watch {
            Box::new(FsNotifier::new()?)
        } else {
            Box::new(NullNotifier::new())
        };
        Ok(Self::with_parts(
            options,
            Box::new(ManifestLoader::new(builders)),
            notifier,
        ))
    }

    /// Build a container from injected collaborators.
    pub fn with_parts(
        options: Options,
        loader: Box<dyn SourceLoader>,
        notifier: Box<dyn ChangeNotifier>,
    ) -> Self {
        let mut resolver = Resolver::new(options.root, options.dir);
        for (key, target) in options.aliases {
            resolver.add_alias(key, target);
        }
        Self {
            resolver,
            loader,
            notifier,
            records: AHashMap::new(),
            handlers: Vec::new(),
            watching: options.watch,
        }
    }

    /// Register a ready value under `name`, bypassing resolution. Fails when
    /// the name already holds a live value.
    pub fn register(&mut self, name: &str, value: Value) -> Result<(), ContainerError> {
        let record = self.record(name);
        let mut r = record.borrow_mut();
        if r.state == State::Ready {
            return Err(ContainerError::AlreadyRegistered { name: name.into() });
        }
        if let Some(handle) = r.watch.take() {
            self.notifier.unsubscribe(handle);
        }
        r.state = State::Ready;
        r.errored = false;
        r.location = None;
        r.deps = None;
        r.init = None;
        r.finalizer = None;
        r.meta = None;
        r.value = Some(value);
        Ok(())
    }

    /// Resolve `name`, driving its record towards Ready. Returns the
    /// instantiated value, or None after the failure has been emitted on
    /// the error channel. Ready records return the identical value on every
    /// call until invalidated.
    pub fn get(&mut self, name: &str) -> Option<Value> {
        match self.fetch(name) {
            Ok(value) => value,
            Err(error) => {
                self.emit(&error);
                None
            }
        }
    }

    /// True when a record is Located or beyond, or when an unseen name
    /// resolves to a location. The probe leaves no record behind.
    pub fn exists(&self, name: &str) -> bool {
        if let Some(record) = self.records.get(name) {
            return record.borrow().state >= State::Located;
        }
        self.resolver.resolve(name).is_ok()
    }

    /// A ready module's manifest metadata.
    pub fn meta(&self, name: &str) -> Option<Metadata> {
        let record = self.records.get(name)?;
        let r = record.borrow();
        if r.state == State::Ready {
            r.meta.clone()
        } else {
            None
        }
    }

    /// Subscribe to the error channel. Handlers run synchronously, in
    /// subscription order, once per failure.
    pub fn on_error<F>(&mut self, handler: F)
    where
        F: Fn(&ContainerError) + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    /// Release every watch subscription and disable future watching.
    pub fn stop(&mut self) {
        if !self.watching {
            return;
        }
        for record in self.records.values() {
            if let Some(handle) = record.borrow_mut().watch.take() {
                self.notifier.unsubscribe(handle);
            }
        }
        self.watching = false;
    }

    /// Run every ready record's finalizer exactly once and demote the
    /// record, so a later request re-initializes it. Watch subscriptions
    /// stay active.
    pub fn destroy(&mut self) {
        for record in self.records.values() {
            let mut r = record.borrow_mut();
            if r.state == State::Ready && r.finalizer.is_some() {
                r.finalize();
                r.state = State::Loaded;
                r.value = None;
            }
        }
    }

    /// Core lookup. `Ok(None)` is the failure sentinel. `Err` carries a
    /// reentrant-cycle failure raised past this record's boundary, so it
    /// settles on the record whose dependency fetch consumed it and the
    /// cycle is attributed to the re-entered name.
    fn fetch(&mut self, name: &str) -> Result<Option<Value>, ContainerError> {
        let record = self.record(name);
        {
            let r = record.borrow();
            if r.state == State::Ready {
                return Ok(r.value.clone());
            }
            if r.errored && r.state != State::Absent {
                return Ok(None);
            }
            if r.state == State::Initializing {
                return Err(ContainerError::CyclicDependency { name: name.into() });
            }
        }

        match self.advance(name, &record) {
            Ok(value) => Ok(Some(value)),
            Err(error) => {
                {
                    let mut r = record.borrow_mut();
                    if r.state == State::Initializing {
                        r.state = State::Loaded;
                    }
                    r.errored = true;
                }
                self.emit(&error);
                Ok(None)
            }
        }
    }

    /// Drive the state machine forward one stage at a time, stopping as
    /// soon as the record is Ready.
    fn advance(&mut self, name: &str, record: &SharedRecord) -> Result<Value, ContainerError> {
        if record.borrow().state == State::Absent {
            self.find(name, record)?;
        }
        if record.borrow().state == State::Located {
            self.load(name, record)?;
        }
        if record.borrow().state == State::Loaded {
            self.initialize(name, record)?;
        }
        let r = record.borrow();
        Ok(r.value.clone().expect("ready record holds a value"))
    }

    fn find(&mut self, name: &str, record: &SharedRecord) -> Result<(), ContainerError> {
        let location = self.resolver.resolve(name)?;
        debug!("found module {name} at {}", location.display());

        let watch = if self.watching {
            match self.notifier.subscribe(name, &location) {
                Ok(handle) => Some(handle),
                Err(error) => {
                    // A failed subscription must not change the resolution
                    // outcome; the record just stays unwatched.
                    warn!("cannot watch module {name}: {error}");
                    None
                }
            }
        } else {
            None
        };

        let mut r = record.borrow_mut();
        r.location = Some(location);
        r.watch = watch;
        r.state = State::Located;
        Ok(())
    }

    fn load(&mut self, name: &str, record: &SharedRecord) -> Result<(), ContainerError> {
        debug!("loading module: {name}");
        let location = record
            .borrow()
            .location
            .clone()
            .expect("located record holds a location");
        let loaded = self
            .loader
            .load(name, &location)
            .map_err(|error| ContainerError::from_load(name, error))?;

        let mut r = record.borrow_mut();
        match loaded {
            LoadedValue::Factory(factory) => {
                r.deps = Some(factory.deps);
                r.init = Some(factory.init);
                r.finalizer = factory.finalizer;
                r.meta = Some(factory.meta);
                r.state = State::Loaded;
            }
            LoadedValue::Direct(value) => {
                r.value = Some(value);
                r.state = State::Ready;
            }
        }
        Ok(())
    }

    fn initialize(&mut self, name: &str, record: &SharedRecord) -> Result<(), ContainerError> {
        debug!("initializing module: {name}");
        record.borrow_mut().state = State::Initializing;

        let deps = record
            .borrow()
            .deps
            .clone()
            .expect("loaded factory declares dependencies");
        let mut args = Vec::with_capacity(deps.len());
        for dep in &deps {
            match self.fetch(dep)? {
                Some(value) => args.push(value),
                None => {
                    return Err(ContainerError::UnresolvedDependency { name: dep.clone() });
                }
            }
        }

        let init = record
            .borrow()
            .init
            .clone()
            .expect("loaded factory holds an initializer");
        let value = init.build(&args).map_err(|cause| ContainerError::Init {
            name: name.into(),
            cause,
        })?;

        let mut r = record.borrow_mut();
        r.value = Some(value);
        r.state = State::Ready;
        Ok(())
    }

    fn record(&mut self, name: &str) -> SharedRecord {
        Rc::clone(
            self.records
                .entry(name.to_string())
                .or_insert_with(|| Rc::new(RefCell::new(Record::default()))),
        )
    }

    fn emit(&self, error: &ContainerError) {
        warn!("{error}");
        for handler in &self.handlers {
            handler(error);
        }
    }
}
