//! Tool and backend intrinsics: the ones that reach outside the
//! computation graph to a model, an HTTP endpoint, a user-registered
//! function, another environment, or another process entirely.
//! Everything here is configured by constructor injection — a handler
//! holds exactly the collaborators it needs, and answers `Unimplemented`
//! rather than failing to register when a collaborator is absent (an
//! embedder who never configures an HTTP client still gets a complete
//! handler set, just one where `rest_call` always reports unimplemented).

pub mod collaborators;
mod confidential_computation;
mod custom_function;
mod delegate;
mod local_cache;
mod logger;
mod model_inference;
mod rest_call;
mod static_params;
mod wolfram_alpha;

pub use confidential_computation::ConfidentialComputation;
pub use custom_function::CustomFunctionHandler;
pub use delegate::Delegate;
pub use local_cache::{register_local_value_cache_functions, LocalCache, LocalValueCache};
pub use logger::Logger;
pub use model_inference::ModelInference;
pub use rest_call::RestCall;
pub use wolfram_alpha::WolframAlpha;
