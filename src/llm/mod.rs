// Insight generation: Anthropic API streaming client and prompt templates.

pub mod client;
pub mod prompt;
