//! Rendering context: what templates see at the top level.
//!
//! Built from `--context` declarations. Normally a [`NamedSources`] map whose
//! entries are fetched through the [`DataProvider`] the first time a template
//! touches them. A declaration using the root alias `.` replaces the map with
//! that single fetched document.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use minijinja::value::{Enumerator, Object, Value};
use minijinja::{Error, ErrorKind};

use stencil_data::{parse_declaration, DataError, DataProvider};

/// Alias that makes a context source the whole context.
pub const ROOT_ALIAS: &str = ".";

/// Reserved key for the full original context inside the output-map template.
pub const ROOT_KEY: &str = "ctx";

/// Reserved key for the current input path inside the output-map template.
pub const INPUT_KEY: &str = "input";

/// The shared, read-only context for one run.
#[derive(Debug, Clone)]
pub enum RenderingContext {
    /// A single document is the whole context.
    RootValue(serde_json::Value),
    /// Alias → lazily fetched source.
    NamedSources(NamedSources),
}

impl RenderingContext {
    /// Build the context from `--context` declarations. Named entries are not
    /// fetched here; a root (`.`) source is, since it defines the context's
    /// shape.
    pub fn build(
        contexts: &[String],
        provider: Arc<dyn DataProvider>,
    ) -> Result<Self, DataError> {
        let mut aliases = BTreeSet::new();
        for arg in contexts {
            let decl = parse_declaration(arg)?;
            if decl.alias == ROOT_ALIAS {
                let root = provider.fetch(ROOT_ALIAS)?;
                return Ok(RenderingContext::RootValue(root));
            }
            aliases.insert(decl.alias);
        }
        Ok(RenderingContext::NamedSources(NamedSources {
            aliases,
            provider,
        }))
    }

    /// An empty named context.
    pub fn empty(provider: Arc<dyn DataProvider>) -> Self {
        RenderingContext::NamedSources(NamedSources {
            aliases: BTreeSet::new(),
            provider,
        })
    }

    /// The engine-facing value for primary templates.
    pub fn to_value(&self) -> Value {
        match self {
            RenderingContext::RootValue(root) => Value::from_serialize(root),
            RenderingContext::NamedSources(named) => Value::from_object(named.clone()),
        }
    }

    /// The scope the output-map template renders against for `input`: every
    /// non-reserved named entry, plus [`INPUT_KEY`] and [`ROOT_KEY`]. Root
    /// value contexts contribute only the two reserved keys.
    pub fn mapping_scope(&self, input: &str) -> MappingScope {
        let entries = match self {
            RenderingContext::NamedSources(named) => Some(named.without_reserved()),
            RenderingContext::RootValue(_) => None,
        };
        MappingScope {
            input: input.to_string(),
            root: self.clone(),
            entries,
        }
    }
}

impl fmt::Display for RenderingContext {
    /// Describes the context without fetching anything.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderingContext::RootValue(root) => write!(f, "{root}"),
            RenderingContext::NamedSources(named) => write!(f, "{named}"),
        }
    }
}

/// Alias map over a data provider. Lookups fetch on first access; the
/// provider caches.
#[derive(Clone)]
pub struct NamedSources {
    aliases: BTreeSet<String>,
    provider: Arc<dyn DataProvider>,
}

impl NamedSources {
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(String::as_str)
    }

    fn without_reserved(&self) -> NamedSources {
        NamedSources {
            aliases: self
                .aliases
                .iter()
                .filter(|a| a.as_str() != ROOT_KEY && a.as_str() != INPUT_KEY)
                .cloned()
                .collect(),
            provider: Arc::clone(&self.provider),
        }
    }

    fn lookup(&self, alias: &str) -> Option<Value> {
        if !self.aliases.contains(alias) {
            return None;
        }
        match self.provider.fetch(alias) {
            Ok(value) => Some(Value::from_serialize(&value)),
            Err(e) => {
                // An invalid value fails only the render that touches it.
                tracing::error!(alias, error = %e, "context datasource unavailable");
                Some(Value::from(Error::new(
                    ErrorKind::InvalidOperation,
                    format!("context datasource '{alias}' unavailable: {e}"),
                )))
            }
        }
    }

    fn keys(&self) -> Vec<Value> {
        self.aliases.iter().map(|a| Value::from(a.as_str())).collect()
    }
}

impl fmt::Display for NamedSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, alias) in self.aliases.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{alias}: <datasource>")?;
        }
        f.write_str("}")
    }
}

impl fmt::Debug for NamedSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedSources")
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}

impl Object for NamedSources {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        self.lookup(key.as_str()?)
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Values(self.keys())
    }
}

/// Per-input scope for the output-map template.
#[derive(Debug, Clone)]
pub struct MappingScope {
    input: String,
    root: RenderingContext,
    entries: Option<NamedSources>,
}

impl MappingScope {
    pub fn into_value(self) -> Value {
        Value::from_object(self)
    }
}

impl fmt::Display for MappingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{INPUT_KEY}: {:?}, {ROOT_KEY}: {}", self.input, self.root)?;
        if let Some(entries) = &self.entries {
            for alias in entries.aliases() {
                write!(f, ", {alias}: <datasource>")?;
            }
        }
        f.write_str("}")
    }
}

impl Object for MappingScope {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        match key.as_str()? {
            INPUT_KEY => Some(Value::from(self.input.as_str())),
            ROOT_KEY => Some(self.root.to_value()),
            other => self.entries.as_ref()?.lookup(other),
        }
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        let mut keys = vec![Value::from(INPUT_KEY), Value::from(ROOT_KEY)];
        if let Some(entries) = &self.entries {
            keys.extend(entries.keys());
        }
        Enumerator::Values(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory provider that counts fetches.
    #[derive(Default)]
    struct MapProvider {
        values: HashMap<String, serde_json::Value>,
        fetches: Mutex<Vec<String>>,
    }

    impl MapProvider {
        fn with(pairs: &[(&str, serde_json::Value)]) -> Arc<Self> {
            Arc::new(MapProvider {
                values: pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
                fetches: Mutex::new(Vec::new()),
            })
        }
    }

    impl DataProvider for MapProvider {
        fn is_defined(&self, alias: &str) -> bool {
            self.values.contains_key(alias)
        }
        fn fetch(&self, alias: &str) -> Result<serde_json::Value, DataError> {
            self.fetches.lock().unwrap().push(alias.to_string());
            self.values
                .get(alias)
                .cloned()
                .ok_or_else(|| DataError::Undefined(alias.to_string()))
        }
        fn fetch_raw(&self, alias: &str) -> Result<String, DataError> {
            self.fetch(alias).map(|v| v.to_string())
        }
        fn cleanup(&self) {}
    }

    #[test]
    fn named_sources_are_fetched_lazily() {
        let provider = MapProvider::with(&[("a", json!({"x": 1})), ("b", json!(2))]);
        let ctx = RenderingContext::build(
            &["a=a.json".to_string(), "b=b.json".to_string()],
            provider.clone(),
        )
        .unwrap();
        assert!(provider.fetches.lock().unwrap().is_empty());

        let value = ctx.to_value();
        let a = value.get_attr("a").unwrap();
        assert_eq!(a.get_attr("x").unwrap(), Value::from(1));
        assert_eq!(*provider.fetches.lock().unwrap(), vec!["a".to_string()]);
    }

    #[test]
    fn root_alias_replaces_the_map() {
        let provider = MapProvider::with(&[(".", json!({"name": "root"}))]);
        let ctx = RenderingContext::build(&[".=data.json".to_string()], provider).unwrap();
        assert!(matches!(ctx, RenderingContext::RootValue(_)));
        assert_eq!(
            ctx.to_value().get_attr("name").unwrap(),
            Value::from("root")
        );
    }

    #[test]
    fn undeclared_keys_are_undefined() {
        let provider = MapProvider::with(&[("a", json!(1))]);
        let ctx = RenderingContext::build(&["a=a.json".to_string()], provider).unwrap();
        assert!(ctx.to_value().get_attr("zzz").unwrap().is_undefined());
    }

    #[test]
    fn mapping_scope_exposes_input_root_and_entries() {
        let provider = MapProvider::with(&[("a", json!("A")), ("ctx", json!("shadowed"))]);
        let ctx = RenderingContext::build(
            &["a=a.json".to_string(), "ctx=c.json".to_string()],
            provider,
        )
        .unwrap();

        let scope = ctx.mapping_scope("dir/file.t").into_value();
        assert_eq!(scope.get_attr("input").unwrap(), Value::from("dir/file.t"));
        assert_eq!(scope.get_attr("a").unwrap(), Value::from("A"));
        let root = scope.get_attr("ctx").unwrap();
        assert_eq!(root.get_attr("a").unwrap(), Value::from("A"));
        assert_eq!(root.get_attr("ctx").unwrap(), Value::from("shadowed"));
    }

    #[test]
    fn mapping_scope_over_root_value_has_only_reserved_keys() {
        let provider = MapProvider::with(&[(".", json!({"a": 1}))]);
        let ctx = RenderingContext::build(&[".=data.json".to_string()], provider).unwrap();

        let scope = ctx.mapping_scope("f").into_value();
        assert!(scope.get_attr("a").unwrap().is_undefined());
        assert_eq!(
            scope.get_attr("ctx").unwrap().get_attr("a").unwrap(),
            Value::from(1)
        );
    }

    #[test]
    fn describing_a_scope_fetches_nothing() {
        let provider = MapProvider::with(&[("a", json!(1)), ("b", json!(2))]);
        let ctx = RenderingContext::build(
            &["a=a.json".to_string(), "b=b.json".to_string()],
            provider.clone(),
        )
        .unwrap();

        let text = ctx.mapping_scope("f").to_string();
        assert!(text.contains("ctx: {a: <datasource>, b: <datasource>}"), "got: {text}");
        assert!(provider.fetches.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_fetch_carries_its_cause() {
        let provider = MapProvider::with(&[]);
        let ctx = RenderingContext::build(&["gone=gone.json".to_string()], provider).unwrap();

        let mut env = minijinja::Environment::new();
        env.add_template("t", "{{ gone }}").unwrap();
        let err = env
            .get_template("t")
            .unwrap()
            .render(ctx.to_value())
            .unwrap_err();
        assert!(err.to_string().contains("context datasource 'gone' unavailable"), "got: {err}");
    }

    #[test]
    fn scope_display_names_input_and_keys() {
        let provider = MapProvider::with(&[("a", json!(1))]);
        let ctx = RenderingContext::build(&["a=a.json".to_string()], provider).unwrap();
        let text = ctx.mapping_scope("in/x").to_string();
        assert!(text.contains("\"in/x\""), "got: {text}");
        assert!(text.contains("a: <datasource>"), "got: {text}");
    }
}
