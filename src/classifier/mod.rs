pub mod deep;
pub mod extract;
pub mod provider;
pub mod types;

pub use deep::{DeepContentClassifier, SYSTEM_PROMPT};
pub use extract::{ExtractedPage, extract_page_text};
pub use provider::{CompletionProvider, OpenAiProvider};
pub use types::{RiskAssessment, RiskTier};
