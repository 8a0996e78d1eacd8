mod openai;

pub use openai::{OpenAiLlm, COMPLETION_MODEL, TEMPERATURE};
