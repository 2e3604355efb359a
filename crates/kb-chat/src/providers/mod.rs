//! Model provider abstractions and the Mistral implementation

pub mod llm;
pub mod mistral;

pub use llm::{single_fragment, FragmentStream, LlmProvider};
pub use mistral::MistralClient;
