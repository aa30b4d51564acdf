use async_trait::async_trait;
use open_ai_rust_responses_by_sshift::{Client as OAIClient, Model, ReasoningEffort, Request};

/// Opaque text-generation capability. Implementations may fail or return empty text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, anyhow::Error>;
}

#[derive(Clone)]
pub struct AI {
    openai_client: OAIClient,
    system_prompt: String,
}

impl AI {
    pub fn new(openai_api_key: &str) -> Result<Self, anyhow::Error> {
        let openai_client = OAIClient::new(openai_api_key)?;

        Ok(Self {
            openai_client,
            system_prompt: "You are a text summarizer. Generate accurate, faithful summaries."
                .to_string(),
        })
    }
}

#[async_trait]
impl TextGenerator for AI {
    async fn generate(&self, prompt: &str) -> Result<String, anyhow::Error> {
        let full_prompt = format!("{}\n\n{}", self.system_prompt, prompt);

        let request = Request::builder()
            .model(Model::GPT5Nano)
            .input(full_prompt)
            .max_output_tokens(2000)
            .reasoning_effort(ReasoningEffort::Minimal)
            .build();

        let response = self.openai_client.responses.create(request).await?;
        log::info!("Received summary response from OpenAI, ID: {}", response.id());

        Ok(response.output_text())
    }
}
