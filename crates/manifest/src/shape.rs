use std::rc::Rc;

use serde_json::{Map, Value as Json};

use crate::error::ShapeError;
use crate::registry::{Builder, BuilderRegistry, Finalizer, Value};

const DEPS_KEY: &str = "deps";
const INIT_KEY: &str = "init";
const FINALIZE_KEY: &str = "finalize";

/// Auxiliary manifest fields, exposed read-only once a module is ready.
pub type Metadata = Rc<Map<String, Json>>;

/// A loaded manifest, classified exactly once at load time.
#[derive(Clone)]
pub enum LoadedValue {
    /// The manifest itself is the module value.
    Direct(Value),
    /// The manifest declares wiring for a registered builder.
    Factory(Factory),
}

#[derive(Clone)]
pub struct Factory {
    pub deps: Vec<String>,
    pub init: Rc<Builder>,
    pub finalizer: Option<Rc<Finalizer>>,
    pub meta: Metadata,
}

/// Classify a parsed manifest.
///
/// An object carrying non-null `deps` and `init` fields is a factory and
/// must satisfy the factory contract; anything else is a direct value.
pub fn classify(
    name: &str,
    raw: Json,
    registry: &BuilderRegistry,
) -> Result<LoadedValue, ShapeError> {
    let mut map = match raw {
        Json::Object(map) if has_factory_keys(&map) => map,
        other => return Ok(LoadedValue::Direct(Rc::new(other))),
    };

    let deps = match map.remove(DEPS_KEY) {
        Some(Json::Array(items)) => {
            let mut deps = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Json::String(dep) => deps.push(dep),
                    _ => return Err(ShapeError::InvalidDeps { name: name.into() }),
                }
            }
            deps
        }
        _ => return Err(ShapeError::InvalidDeps { name: name.into() }),
    };

    let init = match map.remove(INIT_KEY) {
        Some(Json::String(init)) => init,
        _ => return Err(ShapeError::InvalidInit { name: name.into() }),
    };
    let Some(builder) = registry.builder(&init) else {
        return Err(ShapeError::UnknownInit {
            name: name.into(),
            init,
        });
    };
    if builder.arity() != deps.len() {
        return Err(ShapeError::ArityMismatch {
            name: name.into(),
            declared: deps.len(),
            expected: builder.arity(),
        });
    }

    let finalizer = match map.remove(FINALIZE_KEY) {
        None | Some(Json::Null) => None,
        Some(Json::String(finalize)) => match registry.finalizer(&finalize) {
            Some(finalizer) => Some(finalizer),
            None => {
                return Err(ShapeError::UnknownFinalizer {
                    name: name.into(),
                    finalize,
                });
            }
        },
        Some(_) => return Err(ShapeError::InvalidFinalizer { name: name.into() }),
    };

    Ok(LoadedValue::Factory(Factory {
        deps,
        init: builder,
        finalizer,
        meta: Rc::new(map),
    }))
}

fn has_factory_keys(map: &Map<String, Json>) -> bool {
    map.get(DEPS_KEY).is_some_and(|deps| !deps.is_null())
        && map.get(INIT_KEY).is_some_and(|init| !init.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> BuilderRegistry {
        let mut registry = BuilderRegistry::new();
        registry.register_builder("make_unit", 0, |_| Ok(Rc::new(()) as Value));
        registry.register_builder("make_pair", 2, |_| Ok(Rc::new(()) as Value));
        registry.register_finalizer("drop_unit", |_| {});
        registry
    }

    #[test]
    fn test_plain_object_is_a_direct_value() {
        let loaded = classify("c", json!({ "name": "c" }), &registry()).unwrap();

        let LoadedValue::Direct(value) = loaded else {
            panic!("expected a direct value");
        };
        let raw = value.downcast::<Json>().unwrap();
        assert_eq!(raw["name"], "c");
    }

    #[test]
    fn test_null_factory_keys_mean_direct_value() {
        let loaded = classify("c", json!({ "deps": null, "init": null }), &registry()).unwrap();
        assert!(matches!(loaded, LoadedValue::Direct(_)));
    }

    #[test]
    fn test_factory_shape_is_split_into_wiring_and_metadata() {
        let raw = json!({
            "deps": ["a", "b"],
            "init": "make_pair",
            "finalize": "drop_unit",
            "c1": "foo",
            "c2": 5
        });

        let loaded = classify("meta", raw, &registry()).unwrap();
        let LoadedValue::Factory(factory) = loaded else {
            panic!("expected a factory");
        };

        assert_eq!(factory.deps, vec!["a".to_string(), "b".to_string()]);
        assert!(factory.finalizer.is_some());
        assert_eq!(factory.meta.len(), 2);
        assert_eq!(factory.meta["c1"], "foo");
        assert_eq!(factory.meta["c2"], 5);
    }

    #[test]
    fn test_deps_must_be_an_array_of_strings() {
        let result = classify("bad", json!({ "deps": "a", "init": "make_unit" }), &registry());
        assert!(matches!(result, Err(ShapeError::InvalidDeps { .. })));

        let result = classify(
            "bad",
            json!({ "deps": ["a", 1], "init": "make_pair" }),
            &registry(),
        );
        assert!(matches!(result, Err(ShapeError::InvalidDeps { .. })));
    }

    #[test]
    fn test_init_must_name_a_registered_builder() {
        let result = classify("bad", json!({ "deps": [], "init": 3 }), &registry());
        assert!(matches!(result, Err(ShapeError::InvalidInit { .. })));

        let result = classify("bad", json!({ "deps": [], "init": "nope" }), &registry());
        assert!(matches!(result, Err(ShapeError::UnknownInit { .. })));
    }

    #[test]
    fn test_dependency_count_must_match_builder_arity() {
        let result = classify("bad", json!({ "deps": ["a"], "init": "make_pair" }), &registry());

        assert!(matches!(
            result,
            Err(ShapeError::ArityMismatch {
                declared: 1,
                expected: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_finalize_must_name_a_registered_finalizer() {
        let result = classify(
            "bad",
            json!({ "deps": [], "init": "make_unit", "finalize": 1 }),
            &registry(),
        );
        assert!(matches!(result, Err(ShapeError::InvalidFinalizer { .. })));

        let result = classify(
            "bad",
            json!({ "deps": [], "init": "make_unit", "finalize": "nope" }),
            &registry(),
        );
        assert!(matches!(result, Err(ShapeError::UnknownFinalizer { .. })));
    }
}
