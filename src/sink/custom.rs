//! User-defined sinks.

use async_trait::async_trait;

use crate::entry::Entry;
use crate::key::Key;
use crate::sink::{Backend, SinkError};
use crate::task::Task;

/// Backend wrapping user-supplied write/close tasks around a resource the
/// user's open task produced.
///
/// User tasks run against a detached key, outside the driver that owns
/// this sink; their own log calls discard, which keeps a sink from feeding
/// its own queue. Write results are dropped. Close consumes the resource,
/// and the `Option` makes a second close a no-op.
pub(crate) struct CustomBackend<R, W, C> {
    resource: Option<R>,
    write: W,
    close: Option<C>,
}

impl<R, W, C> CustomBackend<R, W, C> {
    pub(crate) fn new(resource: R, write: W, close: C) -> Self {
        CustomBackend {
            resource: Some(resource),
            write,
            close: Some(close),
        }
    }
}

#[async_trait]
impl<R, W, C> Backend for CustomBackend<R, W, C>
where
    R: Send + Sync + 'static,
    W: Fn(&R, Entry) -> Task<(), SinkError> + Send + Sync + 'static,
    C: FnOnce(R) -> Task<(), SinkError> + Send + 'static,
{
    async fn write(&mut self, entry: Entry) {
        if let Some(resource) = self.resource.as_ref() {
            let key = Key::detached();
            let _ = (self.write)(resource, entry).run(&key).await;
        }
    }

    async fn close(mut self: Box<Self>) {
        if let (Some(resource), Some(close)) = (self.resource.take(), self.close.take())
        {
            let key = Key::detached();
            let _ = close(resource).run(&key).await;
        }
    }
}
