//! The handler-facing view of a parser.
//!
//! Handlers receive `&dyn Context` rather than the concrete
//! [`Parser`](crate::Parser), so they can be written and tested without
//! depending on the scanner.

use crate::console::{Console, Settings};
use crate::error::Result;
use crate::registry::Definition;
use crate::value::{Arguments, Values};
use futures_util::future::{BoxFuture, FutureExt};
use std::fmt;
use std::sync::Arc;

pub trait Context: Send + Sync {
    /// Declared name of the parser (program or isolated command name).
    fn name(&self) -> &str;

    /// The registered schema of this parser.
    fn definition(&self) -> Definition<'_>;

    /// Positional values of the last scan.
    fn arguments(&self) -> Result<&Arguments>;

    /// Option values explicitly supplied in the last scan.
    fn options(&self) -> Result<&Values>;

    /// Every declared option resolved to its supplied value or default.
    fn config(&self) -> Result<&Values>;

    /// The command matched by the last scan, if any.
    fn command(&self) -> Option<&str>;

    fn settings(&self) -> &Settings;

    fn console(&self) -> &Console {
        &self.settings().console
    }
}

type HandlerFn =
    dyn for<'a> Fn(&'a dyn Context) -> BoxFuture<'a, anyhow::Result<()>> + Send + Sync;

/// An async command handler.
///
/// ```
/// use cmdflow::{FutureExt, Handler};
///
/// let greet = Handler::new(|cx| {
///     async move {
///         let name: Option<String> = cx.config()?.get("name")?;
///         cx.console().out(&format!("hello {}\n", name.unwrap_or_default()));
///         Ok::<_, anyhow::Error>(())
///     }
///     .boxed()
/// });
/// # let _ = greet;
/// ```
#[derive(Clone)]
pub struct Handler(Arc<HandlerFn>);

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

impl Handler {
    pub fn new<F>(func: F) -> Self
    where
        F: for<'a> Fn(&'a dyn Context) -> BoxFuture<'a, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(func))
    }

    /// Wrap a synchronous function.
    pub fn sync<F>(func: F) -> Self
    where
        F: Fn(&dyn Context) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::new(move |cx| futures_util::future::ready(func(cx)).boxed())
    }

    pub async fn call(&self, cx: &dyn Context) -> anyhow::Result<()> {
        (self.0)(cx).await
    }
}
