pub mod extract;
pub mod prompt;
pub mod server;
pub mod types;
pub mod upstream;

pub use extract::{extract_first_json_object, ExtractError, RAW_EXCERPT_LIMIT};
pub use prompt::PromptBuilder;
pub use server::{router, serve, ProxyState};
pub use types::{DebugInfo, ErrorBody, ProxyError, ReportEnvelope};
pub use upstream::{OpenAiClient, TextGenerator, UpstreamError};
