use crate::completion::{ChatMessage, CompletionProvider, CompletionRequest};
use crate::params::PipelineParams;
use crate::tools::templates::fallback_pipeline;
use std::sync::Arc;
use tracing::{debug, warn};

pub const SYSTEM_PROMPT: &str = "You are a DevOps expert. Generate ONLY valid YAML.";
pub const EMPTY_COMPLETION_TEXT: &str = "Failed to generate pipeline";

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

pub struct PipelineGenerator {
    provider: Arc<dyn CompletionProvider>,
    settings: CompletionSettings,
}

impl PipelineGenerator {
    pub fn new(provider: Arc<dyn CompletionProvider>, settings: CompletionSettings) -> Self {
        Self { provider, settings }
    }

    /// Asks the completion service for a pipeline. Any provider failure is
    /// answered with a local template, so this always yields text.
    pub async fn generate(&self, params: &PipelineParams) -> String {
        let request = self.build_request(params);
        match self.provider.complete(&request).await {
            Ok(text) if text.is_empty() => EMPTY_COMPLETION_TEXT.to_owned(),
            Ok(text) => {
                debug!(
                    platform = %params.platform,
                    language = %params.language,
                    bytes = text.len(),
                    "pipeline generated by completion service"
                );
                text
            }
            Err(err) => {
                warn!(
                    error = %err,
                    platform = %params.platform,
                    language = %params.language,
                    "completion failed, serving fallback template"
                );
                fallback_pipeline(&params.language, &params.platform)
            }
        }
    }

    fn build_request(&self, params: &PipelineParams) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_prompt(params)),
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }
}

pub fn build_prompt(params: &PipelineParams) -> String {
    let deployment = params
        .deployment_target
        .as_deref()
        .map(|target| format!("Deployment Target: {target}"))
        .unwrap_or_default();

    format!(
        "Generate a CI/CD pipeline configuration for {platform}.
Programming Language: {language}
Description: {description}
{deployment}

Requirements:
- Include build, test, and deploy stages
- Use best practices for the specific platform
- Include appropriate caching strategies
- Output ONLY valid YAML, no explanations",
        platform = params.platform,
        language = params.language,
        description = params.description,
    )
}
