//! Values that are not known at declaration time.
//!
//! A [`Deferred`] wraps a lazily evaluated shared future. Composing one into a
//! property bag or mapping it never polls it; only whoever drives resolution
//! (the provisioning engine) does, and every clone observes the same outcome.

use std::{fmt, future::Future, sync::Arc};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tokio::sync::oneshot;

use crate::domain::error::DeferredError;

type SharedResult<T> = Shared<BoxFuture<'static, Result<T, DeferredError>>>;

pub struct Deferred<T>
where
    T: Clone + Send + Sync + 'static,
{
    label: Arc<str>,
    inner: SharedResult<T>,
}

impl<T> Deferred<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wraps a future without polling it.
    pub fn from_future<F>(label: impl Into<Arc<str>>, future: F) -> Self
    where
        F: Future<Output = Result<T, DeferredError>> + Send + 'static,
    {
        Self {
            label: label.into(),
            inner: future.boxed().shared(),
        }
    }

    /// A deferred that is already resolved.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn known(label: impl Into<Arc<str>>, value: T) -> Self {
        let deferred = Self::from_future(label, futures::future::ready(Ok(value)));
        let _ = deferred.inner.clone().now_or_never();
        deferred
    }

    /// A deferred whose value is supplied later through the returned [`Resolver`].
    ///
    /// Dropping the resolver without resolving fails the deferred with
    /// [`DeferredError::Abandoned`].
    pub fn pending(label: impl Into<Arc<str>>) -> (Resolver<T>, Self) {
        let label: Arc<str> = label.into();
        let (sender, receiver) = oneshot::channel::<Result<T, DeferredError>>();
        let abandoned = label.to_string();

        let future = async move {
            match receiver.await {
                Ok(result) => result,
                Err(_) => Err(DeferredError::Abandoned { label: abandoned }),
            }
        };

        let resolver = Resolver {
            label: Arc::clone(&label),
            sender,
        };

        (resolver, Self::from_future(label, future))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_resolved(&self) -> bool {
        self.inner.peek().is_some()
    }

    /// Returns the outcome if resolution already completed, without driving it.
    pub fn try_get(&self) -> Option<Result<T, DeferredError>> {
        self.inner.peek().cloned()
    }

    /// Drives resolution to completion.
    pub async fn resolve(&self) -> Result<T, DeferredError> {
        self.inner.clone().await
    }

    /// Composes a transformation without forcing resolution. The label is kept
    /// so failures still point at the original source.
    pub fn map<U, F>(&self, f: F) -> Deferred<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let source = self.inner.clone();

        Deferred {
            label: Arc::clone(&self.label),
            inner: async move { source.await.map(f) }.boxed().shared(),
        }
    }
}

impl<T> Deferred<T>
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    pub fn to_json(&self) -> Deferred<serde_json::Value> {
        let source = self.inner.clone();
        let label = Arc::clone(&self.label);
        let error_label = label.to_string();

        Deferred {
            label,
            inner: async move {
                let value = source.await?;
                serde_json::to_value(value).map_err(|error| DeferredError::Failed {
                    label: error_label,
                    reason: error.to_string(),
                })
            }
            .boxed()
            .shared(),
        }
    }
}

impl<T> Clone for Deferred<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            label: Arc::clone(&self.label),
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for Deferred<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("label", &self.label)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// Write half of a pending [`Deferred`]. Consumed on use.
pub struct Resolver<T> {
    label: Arc<str>,
    sender: oneshot::Sender<Result<T, DeferredError>>,
}

impl<T> Resolver<T> {
    pub fn resolve(self, value: T) {
        // Every reader may already be gone; nothing to report then.
        let _ = self.sender.send(Ok(value));
    }
}

impl<T> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").field("label", &self.label).finish()
    }
}
