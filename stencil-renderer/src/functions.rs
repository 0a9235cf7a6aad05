//! Template functions backed by the run's data sources.
//!
//! | Function                   | Returns                                    |
//! |----------------------------|--------------------------------------------|
//! | `ds(alias)`                | parsed document behind `alias`             |
//! | `datasource(alias)`        | same as `ds`                               |
//! | `datasource_exists(alias)` | whether `alias` was declared               |
//! | `include(alias)`           | unparsed text behind `alias`               |
//! | `getenv(name, default?)`   | env var, or `default` when unset or empty  |

use std::sync::Arc;

use minijinja::{Environment, Error, ErrorKind, Value};

use stencil_data::{DataError, DataProvider};

use crate::engine::FunctionTable;

/// The standard function table over a [`DataProvider`].
pub struct DataFunctions {
    provider: Arc<dyn DataProvider>,
}

impl DataFunctions {
    pub fn new(provider: Arc<dyn DataProvider>) -> Self {
        Self { provider }
    }
}

fn template_error(err: DataError) -> Error {
    Error::new(ErrorKind::InvalidOperation, err.to_string())
}

fn fetch(provider: &dyn DataProvider, alias: &str) -> Result<Value, Error> {
    provider
        .fetch(alias)
        .map(|value| Value::from_serialize(&value))
        .map_err(template_error)
}

impl FunctionTable for DataFunctions {
    fn install(&self, env: &mut Environment<'static>) {
        let provider = Arc::clone(&self.provider);
        env.add_function("ds", move |alias: String| fetch(provider.as_ref(), &alias));

        let provider = Arc::clone(&self.provider);
        env.add_function("datasource", move |alias: String| {
            fetch(provider.as_ref(), &alias)
        });

        let provider = Arc::clone(&self.provider);
        env.add_function("datasource_exists", move |alias: String| {
            provider.is_defined(&alias)
        });

        let provider = Arc::clone(&self.provider);
        env.add_function("include", move |alias: String| {
            provider.fetch_raw(&alias).map_err(template_error)
        });

        env.add_function("getenv", |name: String, default: Option<String>| {
            std::env::var(&name)
                .ok()
                .filter(|v| !v.is_empty())
                .or(default)
                .unwrap_or_default()
        });
    }
}
