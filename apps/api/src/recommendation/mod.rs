pub mod handlers;
pub mod orchestrator;
pub mod prompts;
pub mod synthesizer;
pub mod validator;

pub use orchestrator::Orchestrator;
