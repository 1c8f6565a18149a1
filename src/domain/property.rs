use std::collections::BTreeMap;

use futures::future::{self, BoxFuture, FutureExt};
use serde_json::{Map, Value};

use crate::domain::{deferred::Deferred, error::DeferredError};

pub type PropertyBag = BTreeMap<String, PropertyValue>;

/// A property value: either concrete, or [`Deferred`] until the engine resolves it.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<PropertyValue>),
    Map(PropertyBag),
    Deferred(Deferred<Value>),
}

/// A property that failed to resolve, with its dotted path inside the bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyError {
    pub path: String,
    pub source: DeferredError,
}

impl PropertyValue {
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn as_map(&self) -> Option<&PropertyBag> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn as_deferred(&self) -> Option<&Deferred<Value>> {
        match self {
            Self::Deferred(deferred) => Some(deferred),
            _ => None,
        }
    }

    /// True when no unresolved deferred remains anywhere in the value.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_known(&self) -> bool {
        match self {
            Self::List(items) => items.iter().all(Self::is_known),
            Self::Map(map) => map.values().all(Self::is_known),
            Self::Deferred(deferred) => deferred.is_resolved(),
            _ => true,
        }
    }

    /// Renders the value without driving resolution; pending deferreds show as
    /// `<deferred: label>`.
    pub fn preview(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(value) => Value::Bool(*value),
            Self::Number(value) => Value::Number(value.clone()),
            Self::String(value) => Value::String(value.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::preview).collect()),
            Self::Map(map) => Value::Object(preview_bag(map)),
            Self::Deferred(deferred) => match deferred.try_get() {
                Some(Ok(value)) => value,
                Some(Err(error)) => Value::String(format!("<failed: {error}>")),
                None => Value::String(format!("<deferred: {}>", deferred.label())),
            },
        }
    }

    /// Resolves every nested deferred. Independent deferreds are driven
    /// concurrently; the first failure wins and carries its path.
    pub fn resolve_at(&self, path: String) -> BoxFuture<'_, Result<Value, PropertyError>> {
        match self {
            Self::List(items) => {
                let pending = items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| item.resolve_at(format!("{path}[{index}]")));
                future::try_join_all(pending).map(|result| result.map(Value::Array)).boxed()
            }
            Self::Map(map) => resolve_bag_at(map, Some(path))
                .map(|result| result.map(Value::Object))
                .boxed(),
            Self::Deferred(deferred) => {
                let deferred = deferred.clone();
                async move {
                    deferred
                        .resolve()
                        .await
                        .map_err(|source| PropertyError { path, source })
                }
                .boxed()
            }
            concrete => future::ready(Ok(concrete.preview())).boxed(),
        }
    }
}

pub fn preview_bag(bag: &PropertyBag) -> Map<String, Value> {
    bag.iter()
        .map(|(key, value)| (key.clone(), value.preview()))
        .collect()
}

/// Resolves a whole bag; keys become dotted paths below `prefix`.
pub fn resolve_bag_at(
    bag: &PropertyBag,
    prefix: Option<String>,
) -> BoxFuture<'_, Result<Map<String, Value>, PropertyError>> {
    let pending = bag.iter().map(|(key, value)| {
        let path = match &prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        value
            .resolve_at(path)
            .map(move |result| result.map(|resolved| (key.clone(), resolved)))
    });

    future::try_join_all(pending)
        .map(|result| result.map(|entries| entries.into_iter().collect()))
        .boxed()
}

/// Looks up a dotted path (`tags.data-center`) through nested maps.
#[cfg_attr(not(test), allow(dead_code))]
pub fn lookup_path<'a>(bag: &'a PropertyBag, path: &str) -> Option<&'a PropertyValue> {
    let mut segments = path.split('.');
    let mut current = bag.get(segments.next()?)?;

    for segment in segments {
        current = current.as_map()?.get(segment)?;
    }

    Some(current)
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<PropertyBag> for PropertyValue {
    fn from(value: PropertyBag) -> Self {
        Self::Map(value)
    }
}

impl From<Deferred<Value>> for PropertyValue {
    fn from(value: Deferred<Value>) -> Self {
        Self::Deferred(value)
    }
}
