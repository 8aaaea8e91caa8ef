#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use serde_json::Value as Json;

use holt::{
    BuilderRegistry, Container, ManifestLoader, ManualNotifier, Options, Value,
};

/// A value produced by a test builder, carrying the arguments it received.
pub struct Built {
    pub name: String,
    pub args: Vec<Value>,
}

/// Write a manifest file under `root`, creating parent directories.
pub fn write_module(root: &Path, relative: &str, manifest: &Json) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(manifest).unwrap()).unwrap();
}

/// Register a builder producing a [`Built`] labelled `label`.
pub fn register_built(registry: &mut BuilderRegistry, builder: &str, label: &str, arity: usize) {
    let label = label.to_string();
    registry.register_builder(builder, arity, move |args| {
        Ok(Rc::new(Built {
            name: label.clone(),
            args: args.to_vec(),
        }) as Value)
    });
}

/// Collect error-channel emissions as display strings.
pub fn collect_errors(container: &mut Container) -> Rc<RefCell<Vec<String>>> {
    let errors = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&errors);
    container.on_error(move |error| sink.borrow_mut().push(error.to_string()));
    errors
}

/// A watch-disabled container over `root/modules`.
pub fn plain_container(root: &Path, registry: BuilderRegistry) -> Container {
    let options = Options::new(root).with_dir("modules").with_watch(false);
    Container::new(options, registry).unwrap()
}

/// A watching container over `root/modules`, driven by a manual notifier.
pub fn watching_container(root: &Path, registry: BuilderRegistry) -> (Container, ManualNotifier) {
    let notifier = ManualNotifier::new();
    let options = Options::new(root).with_dir("modules").with_watch(true);
    let container = Container::with_parts(
        options,
        Box::new(ManifestLoader::new(registry)),
        Box::new(notifier.clone()),
    );
    (container, notifier)
}

pub fn as_json(value: &Value) -> &Json {
    value.downcast_ref().expect("expected a JSON value")
}

pub fn as_built(value: &Value) -> &Built {
    value.downcast_ref().expect("expected a built value")
}
