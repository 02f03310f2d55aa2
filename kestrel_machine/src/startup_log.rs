//! Early-boot diagnostic log channel.
//!
//! A `tracing_subscriber` layer that keeps a copy of every event emitted
//! while it is open, so the boot transcript can be replayed to a client that
//! connects later. The bootstrap sequence closes it as its last step.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

#[derive(Debug, Default)]
struct Buffer {
    lines: Vec<String>,
    closed: bool,
}

/// Cloneable handle to the startup transcript.
#[derive(Debug, Clone, Default)]
pub struct StartupLog {
    inner: Arc<Mutex<Buffer>>,
}

impl StartupLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop capturing and return the transcript.
    ///
    /// Later calls return an empty transcript.
    pub fn close(&self) -> Vec<String> {
        let mut buf = self.inner.lock();
        buf.closed = true;
        std::mem::take(&mut buf.lines)
    }

    pub fn is_open(&self) -> bool {
        !self.inner.lock().closed
    }

    /// Snapshot of the lines captured so far.
    pub fn lines(&self) -> Vec<String> {
        self.inner.lock().lines.clone()
    }

    fn push(&self, line: String) {
        let mut buf = self.inner.lock();
        if !buf.closed {
            buf.lines.push(line);
        }
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

impl<S: Subscriber> Layer<S> for StartupLog {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !self.is_open() {
            return;
        }
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        self.push(format!(
            "[{}] {}{}",
            event.metadata().level(),
            visitor.message,
            visitor.fields
        ));
    }
}
