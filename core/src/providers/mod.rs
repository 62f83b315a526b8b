pub mod factory;
pub mod openai;

pub use factory::{PROVIDERS, create_provider};
pub use openai::OpenAIProvider;
