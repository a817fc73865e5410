pub mod prompts;

pub use prompts::{is_interactive, prompt_confirmation};
