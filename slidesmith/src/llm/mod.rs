mod api;
pub mod parse;
pub mod prompts;
mod provider;

pub use api::OutlineClient;
pub use parse::{parse_outline, strip_code_fences};
pub use provider::{Provider, ProviderRequest};
