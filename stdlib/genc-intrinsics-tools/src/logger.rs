use crate::collaborators::LogSink;
use async_trait::async_trait;
use genc_runtime::{InlineContext, InlineHandler};
use genc_value::Value;
use std::sync::Arc;

/// `logger`: passthrough. Emits the argument to the `log` facade (target
/// `genc::intrinsics::logger`, info level) and, if one is injected, to a
/// sink callers can inspect programmatically (tests don't want to
/// capture stdout to assert on what got logged).
pub struct Logger {
    sink: Option<Arc<dyn LogSink>>,
}

impl Logger {
    pub fn new(sink: Option<Arc<dyn LogSink>>) -> Self {
        Logger { sink }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Logger::new(None)
    }
}

#[async_trait]
impl InlineHandler for Logger {
    fn check_well_formed(&self, _static_parameter: &Value) -> genc_value::Result<()> {
        Ok(())
    }

    async fn execute(
        &self,
        _static_parameter: &Value,
        argument: Value,
        _ctx: &InlineContext<'_>,
    ) -> genc_value::Result<Value> {
        log::info!(target: "genc::intrinsics::logger", "{argument:?}");
        if let Some(sink) = &self.sink {
            sink.record(&argument);
        }
        Ok(argument)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct CapturingSink(Mutex<Vec<Value>>);
    impl LogSink for CapturingSink {
        fn record(&self, value: &Value) {
            self.0.lock().push(value.clone());
        }
    }

    #[tokio::test]
    async fn passes_the_argument_through_unchanged() {
        let h = Logger::new(None);
        let ctx = InlineContext { scheduler: &genc_runtime::ThreadPerTask };
        let result = h.execute(&Value::struct_unlabeled([]), Value::str("hi"), &ctx).await.unwrap();
        assert_eq!(result, Value::str("hi"));
    }

    #[tokio::test]
    async fn records_into_an_injected_sink() {
        let _ = env_logger::try_init();
        let sink = Arc::new(CapturingSink::default());
        let h = Logger::new(Some(sink.clone()));
        let ctx = InlineContext { scheduler: &genc_runtime::ThreadPerTask };
        h.execute(&Value::struct_unlabeled([]), Value::str("hi"), &ctx).await.unwrap();
        assert_eq!(sink.0.lock().as_slice(), &[Value::str("hi")]);
    }
}
