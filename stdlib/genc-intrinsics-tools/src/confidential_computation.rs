use crate::collaborators::ConfidentialChannelOpener;
use crate::static_params::labeled;
use async_trait::async_trait;
use genc_runtime::{ControlFlowContext, ControlFlowHandler, Executor, ExecutorValue};
use genc_value::{GencError, Value};
use std::sync::Arc;

/// `confidential_computation`: static parameter is `(computation,
/// config)` where `config` carries `server_address` and an optional
/// `image_digest`. Opens a remote channel (attestation against the
/// digest, if supplied, is the channel opener's job), uploads the
/// computation and argument over the resulting [`ExecutorRpcTransport`],
/// and materializes the result back into the local executor.
///
/// Like `delegate`, only closed-form computations may cross the
/// boundary — there is no mechanism to carry a lexical scope across a
/// process (let alone a confidential enclave) boundary.
pub struct ConfidentialComputation {
    opener: Option<Arc<dyn ConfidentialChannelOpener>>,
}

impl ConfidentialComputation {
    pub fn new(opener: Option<Arc<dyn ConfidentialChannelOpener>>) -> Self {
        ConfidentialComputation { opener }
    }
}

#[async_trait]
impl ControlFlowHandler for ConfidentialComputation {
    fn check_well_formed(&self, static_parameter: &Value) -> genc_value::Result<()> {
        labeled(static_parameter, "computation")?;
        let config = labeled(static_parameter, "config")?;
        labeled(config, "server_address")?
            .as_str()
            .ok_or_else(|| GencError::invalid_argument("confidential_computation 'server_address' must be a string"))?;
        Ok(())
    }

    async fn execute(
        &self,
        static_parameter: &Value,
        argument: Option<ExecutorValue>,
        ctx: &ControlFlowContext<'_>,
    ) -> genc_value::Result<ExecutorValue> {
        let computation = labeled(static_parameter, "computation")?.clone();
        let unresolved = computation.unresolved_references();
        if !unresolved.is_empty() {
            return Err(GencError::invalid_argument(format!(
                "confidential_computation computation has unresolved references crossing the boundary: {unresolved:?}"
            )));
        }
        let config = labeled(static_parameter, "config")?;
        let server_address = labeled(config, "server_address")?.as_str().expect("checked well-formed");
        let image_digest = labeled(config, "image_digest").ok().and_then(|v| v.as_str());

        let opener = self
            .opener
            .as_ref()
            .ok_or_else(|| GencError::unimplemented("confidential_computation has no channel opener configured"))?;
        let transport = opener.open(server_address, image_digest).await?;

        let computation_id = transport.create_value(computation).await?;
        let argument_value = match argument {
            Some(a) => Some(ctx.executor.materialize(&a).await?),
            None => None,
        };
        let argument_id = match argument_value {
            Some(v) => Some(transport.create_value(v).await?),
            None => None,
        };
        let result_id = transport.create_call(&computation_id, argument_id.as_deref()).await?;
        let result_value = transport.materialize(&result_id).await?;

        transport.dispose(&result_id).await;
        if let Some(id) = &argument_id {
            transport.dispose(id).await;
        }
        transport.dispose(&computation_id).await;

        ctx.executor.create_value(result_value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genc_remote::LoopbackTransport;
    use genc_runtime::{ControlFlowExecutor, Handler, HandlerSet, ThreadPerTask};
    use genc_value::{ErrorKind, StructField};

    struct LoopbackOpener;
    #[async_trait]
    impl ConfidentialChannelOpener for LoopbackOpener {
        async fn open(
            &self,
            _server_address: &str,
            _image_digest: Option<&str>,
        ) -> genc_value::Result<Arc<dyn genc_remote::ExecutorRpcTransport>> {
            let server = Arc::new(ControlFlowExecutor::new(Arc::new(HandlerSet::new()), Arc::new(ThreadPerTask)));
            Ok(Arc::new(LoopbackTransport::new(server)))
        }
    }

    fn stack_with_opener() -> ControlFlowExecutor {
        let handlers = HandlerSet::new();
        handlers
            .register(
                "confidential_computation",
                Handler::ControlFlow(Arc::new(ConfidentialComputation::new(Some(Arc::new(LoopbackOpener))))),
            )
            .unwrap();
        ControlFlowExecutor::new(Arc::new(handlers), Arc::new(ThreadPerTask))
    }

    #[tokio::test]
    async fn round_trips_a_literal_computation_through_the_channel() {
        let exec = stack_with_opener();
        let f = exec
            .create_value(Value::intrinsic(
                "confidential_computation",
                Value::struct_of(vec![
                    StructField::labeled("computation", Value::lambda("x", Value::reference("x"))),
                    StructField::labeled(
                        "config",
                        Value::struct_of(vec![StructField::labeled("server_address", Value::str("enclave.local:443"))]),
                    ),
                ]),
            ))
            .await
            .unwrap();
        let arg = exec.create_value(Value::str("secret")).await.unwrap();
        let result = exec.create_call(&f, Some(&arg)).await.unwrap();
        assert_eq!(exec.materialize(&result).await.unwrap(), Value::str("secret"));
    }

    #[tokio::test]
    async fn open_computation_is_rejected_before_crossing() {
        let exec = stack_with_opener();
        let f = exec
            .create_value(Value::intrinsic(
                "confidential_computation",
                Value::struct_of(vec![
                    StructField::labeled("computation", Value::reference("not_bound_anywhere")),
                    StructField::labeled(
                        "config",
                        Value::struct_of(vec![StructField::labeled("server_address", Value::str("enclave.local:443"))]),
                    ),
                ]),
            ))
            .await
            .unwrap();
        let arg = exec.create_value(Value::str("x")).await.unwrap();
        let err = exec.create_call(&f, Some(&arg)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn without_an_opener_configured_is_unimplemented() {
        let handlers = HandlerSet::new();
        handlers
            .register("confidential_computation", Handler::ControlFlow(Arc::new(ConfidentialComputation::new(None))))
            .unwrap();
        let exec = ControlFlowExecutor::new(Arc::new(handlers), Arc::new(ThreadPerTask));
        let f = exec
            .create_value(Value::intrinsic(
                "confidential_computation",
                Value::struct_of(vec![
                    StructField::labeled("computation", Value::str("x")),
                    StructField::labeled(
                        "config",
                        Value::struct_of(vec![StructField::labeled("server_address", Value::str("enclave.local:443"))]),
                    ),
                ]),
            ))
            .await
            .unwrap();
        let arg = exec.create_value(Value::str("x")).await.unwrap();
        let err = exec.create_call(&f, Some(&arg)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unimplemented);
    }
}
