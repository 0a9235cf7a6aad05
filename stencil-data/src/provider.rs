//! [`DataProvider`] trait and the built-in [`Data`] implementation.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;

use crate::error::DataError;
use crate::source::{parse_declaration, parse_header, Location, SourceDecl};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetch-by-alias capability used by templates and the context builder.
///
/// Implementations fetch lazily and may cache; [`cleanup`](Self::cleanup) is
/// called exactly once when a run ends, whatever its outcome.
pub trait DataProvider: Send + Sync {
    /// Whether a source was declared under `alias`.
    fn is_defined(&self, alias: &str) -> bool;

    /// Fetch and parse the source behind `alias`.
    fn fetch(&self, alias: &str) -> Result<Value, DataError>;

    /// Fetch the source behind `alias` as unparsed text.
    fn fetch_raw(&self, alias: &str) -> Result<String, DataError>;

    /// Release whatever the provider holds for the run.
    fn cleanup(&self);
}

/// How fetched text should be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentKind {
    Json,
    Yaml,
    /// Try YAML (a JSON superset), fall back to text.
    Sniff,
    Text,
}

#[derive(Debug, Clone)]
struct Fetched {
    text: String,
    kind: ContentKind,
}

/// Built-in provider over files, env vars, stdin and HTTP(S).
pub struct Data {
    sources: HashMap<String, SourceDecl>,
    headers: HashMap<String, Vec<(String, String)>>,
    agent: ureq::Agent,
    cache: Mutex<HashMap<String, Fetched>>,
}

impl Data {
    /// Build from `--datasource`/`--context` declarations and
    /// `--datasource-header` arguments. Nothing is fetched yet.
    ///
    /// Later declarations of the same alias replace earlier ones.
    pub fn new(declarations: &[String], headers: &[String]) -> Result<Self, DataError> {
        let mut sources = HashMap::new();
        for arg in declarations {
            let decl = parse_declaration(arg)?;
            sources.insert(decl.alias.clone(), decl);
        }

        let mut header_map: HashMap<String, Vec<(String, String)>> = HashMap::new();
        for arg in headers {
            let (alias, name, value) = parse_header(arg)?;
            header_map.entry(alias).or_default().push((name, value));
        }

        let agent = ureq::AgentBuilder::new().timeout(HTTP_TIMEOUT).build();
        Ok(Data {
            sources,
            headers: header_map,
            agent,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// A provider with no declared sources.
    pub fn empty() -> Self {
        Data {
            sources: HashMap::new(),
            headers: HashMap::new(),
            agent: ureq::AgentBuilder::new().timeout(HTTP_TIMEOUT).build(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn source(&self, alias: &str) -> Result<&SourceDecl, DataError> {
        self.sources
            .get(alias)
            .ok_or_else(|| DataError::Undefined(alias.to_string()))
    }

    fn load(&self, alias: &str) -> Result<Fetched, DataError> {
        if let Some(hit) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(alias)
        {
            return Ok(hit.clone());
        }

        let decl = self.source(alias)?;
        tracing::debug!(alias, location = %decl.location, "fetching datasource");
        let fetched = match &decl.location {
            Location::File(path) => read_file(alias, path)?,
            Location::Env(name) => Fetched {
                text: std::env::var(name).unwrap_or_default(),
                kind: ContentKind::Text,
            },
            Location::Stdin => read_stdin(alias)?,
            Location::Http(url) => self.read_http(alias, url)?,
        };

        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(alias.to_string(), fetched.clone());
        Ok(fetched)
    }

    fn read_http(&self, alias: &str, url: &str) -> Result<Fetched, DataError> {
        let mut request = self.agent.get(url);
        for (name, value) in self.headers.get(alias).into_iter().flatten() {
            request = request.set(name, value);
        }
        let response = request.call().map_err(|e| DataError::Http {
            alias: alias.to_string(),
            source: Box::new(e),
        })?;
        let kind = kind_from_mime(response.content_type());
        let text = response.into_string().map_err(|source| DataError::Io {
            alias: alias.to_string(),
            location: url.to_string(),
            source,
        })?;
        Ok(Fetched { text, kind })
    }
}

impl DataProvider for Data {
    fn is_defined(&self, alias: &str) -> bool {
        self.sources.contains_key(alias)
    }

    fn fetch(&self, alias: &str) -> Result<Value, DataError> {
        let fetched = self.load(alias)?;
        parse(alias, &fetched)
    }

    fn fetch_raw(&self, alias: &str) -> Result<String, DataError> {
        Ok(self.load(alias)?.text)
    }

    fn cleanup(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(cached = cache.len(), "releasing datasource cache");
        cache.clear();
    }
}

fn read_file(alias: &str, path: &Path) -> Result<Fetched, DataError> {
    let text = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        alias: alias.to_string(),
        location: path.display().to_string(),
        source,
    })?;
    Ok(Fetched {
        text,
        kind: kind_from_extension(path),
    })
}

fn read_stdin(alias: &str) -> Result<Fetched, DataError> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .map_err(|source| DataError::Io {
            alias: alias.to_string(),
            location: "stdin".to_string(),
            source,
        })?;
    Ok(Fetched {
        text,
        kind: ContentKind::Sniff,
    })
}

fn kind_from_extension(path: &Path) -> ContentKind {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => ContentKind::Json,
        Some("yaml") | Some("yml") => ContentKind::Yaml,
        _ => ContentKind::Text,
    }
}

fn kind_from_mime(mime: &str) -> ContentKind {
    match mime {
        "application/json" => ContentKind::Json,
        "application/yaml" | "application/x-yaml" | "text/yaml" | "text/x-yaml" => {
            ContentKind::Yaml
        }
        m if m.ends_with("+json") => ContentKind::Json,
        _ => ContentKind::Text,
    }
}

fn parse(alias: &str, fetched: &Fetched) -> Result<Value, DataError> {
    match fetched.kind {
        ContentKind::Json => serde_json::from_str(&fetched.text).map_err(|source| DataError::Json {
            alias: alias.to_string(),
            source,
        }),
        ContentKind::Yaml => serde_yaml::from_str(&fetched.text).map_err(|source| DataError::Yaml {
            alias: alias.to_string(),
            source,
        }),
        ContentKind::Sniff => Ok(serde_yaml::from_str(&fetched.text)
            .unwrap_or_else(|_| Value::String(fetched.text.clone()))),
        ContentKind::Text => Ok(Value::String(fetched.text.clone())),
    }
}
