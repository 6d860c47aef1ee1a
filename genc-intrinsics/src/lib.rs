//! Construction-time entry point: wires every stdlib intrinsic into a
//! [`HandlerSet`] under its stable URI. Control-flow and template
//! intrinsics need no collaborators and register themselves directly;
//! tool intrinsics are configured by constructor injection, so their
//! collaborators travel through [`HandlerDeps`].

use arcstr::ArcStr;
use fxhash::FxHashMap;
use genc_intrinsics_tools::{
    collaborators::{ConfidentialChannelOpener, CustomFunction, DelegateRunner, HttpClient, InferenceFunction, LogSink},
    ConfidentialComputation, CustomFunctionHandler, Delegate, Logger, ModelInference, RestCall, WolframAlpha,
};
use genc_runtime::{Handler, HandlerSet};
use std::sync::Arc;

/// Every collaborator a default-built handler set may be wired to. All
/// fields default to absent/empty, which still yields a complete set of
/// handlers — just ones that answer `Unimplemented` until an embedder
/// supplies the missing capability.
#[derive(Default)]
pub struct HandlerDeps {
    pub http_client: Option<Arc<dyn HttpClient>>,
    pub inference_functions: FxHashMap<ArcStr, Arc<dyn InferenceFunction>>,
    pub custom_functions: FxHashMap<ArcStr, Arc<dyn CustomFunction>>,
    pub delegate_runners: FxHashMap<ArcStr, Arc<dyn DelegateRunner>>,
    pub confidential_channel_opener: Option<Arc<dyn ConfidentialChannelOpener>>,
    pub log_sink: Option<Arc<dyn LogSink>>,
}

/// Registers every intrinsic in the stdlib's URI table into `handlers`.
/// Returns an error if any URI is already taken (e.g. called twice
/// against the same handler set).
pub fn register_default_handlers(handlers: &HandlerSet, deps: HandlerDeps) -> genc_value::Result<()> {
    genc_intrinsics_control::register(handlers)?;
    genc_intrinsics_template::register(handlers)?;

    handlers.register("logger", Handler::Inline(Arc::new(Logger::new(deps.log_sink))))?;
    handlers.register("rest_call", Handler::Inline(Arc::new(RestCall::new(deps.http_client.clone()))))?;
    handlers.register("wolfram_alpha", Handler::Inline(Arc::new(WolframAlpha::new(deps.http_client))))?;
    handlers.register(
        "model_inference",
        Handler::Inline(Arc::new(ModelInference::new(deps.inference_functions.clone()))),
    )?;
    handlers.register(
        "model_inference_with_config",
        Handler::Inline(Arc::new(ModelInference::new(deps.inference_functions))),
    )?;
    handlers.register("custom_function", Handler::Inline(Arc::new(CustomFunctionHandler::new(deps.custom_functions))))?;
    handlers.register("delegate", Handler::ControlFlow(Arc::new(Delegate::new(deps.delegate_runners))))?;
    handlers.register(
        "confidential_computation",
        Handler::ControlFlow(Arc::new(ConfidentialComputation::new(deps.confidential_channel_opener))),
    )?;

    Ok(())
}
