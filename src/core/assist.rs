//! Assistive text generation collaborator
//!
//! The editor only knows how to insert generated text; producing it is the
//! job of a [`TextGenerator`]. The bundled generator is a stand-in that
//! waits and echoes the prompt back.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::error::TaskError;
use super::tasks::{TaskHandle, TaskRunner};

/// Canned prompt starters offered by the generation dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickCommand {
    Summarize,
    Draft,
    Rewrite,
    Fix,
}

impl QuickCommand {
    pub const ALL: [QuickCommand; 4] = [Self::Summarize, Self::Draft, Self::Rewrite, Self::Fix];

    pub fn label(self) -> &'static str {
        match self {
            Self::Summarize => "Özetle",
            Self::Draft => "Taslak Oluştur",
            Self::Rewrite => "Yeniden Yaz",
            Self::Fix => "Dilbilgisini Düzelt",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Self::Summarize => "Aşağıdaki metni özetle: ",
            Self::Draft => "Şu konuda bir taslak oluştur: ",
            Self::Rewrite => "Bu metni daha profesyonel bir dille yeniden yaz: ",
            Self::Fix => "Metindeki dilbilgisi hatalarını düzelt.",
        }
    }
}

/// A non-empty prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt: String,
}

impl GenerationRequest {
    /// `None` when the prompt is blank
    pub fn new(prompt: impl Into<String>) -> Option<Self> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            None
        } else {
            Some(Self { prompt })
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, TaskError>;
}

/// Waits `delay`, then returns the prompt unchanged
#[derive(Debug, Clone)]
pub struct SimulatedGenerator {
    delay: Duration,
}

impl SimulatedGenerator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl TextGenerator for SimulatedGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, TaskError> {
        tokio::time::sleep(self.delay).await;
        Ok(request.prompt)
    }
}

/// Run a generation request in the background
pub fn submit_generation(
    runner: &TaskRunner,
    generator: Arc<dyn TextGenerator>,
    request: GenerationRequest,
) -> TaskHandle<String> {
    runner.submit("generate", move |_| async move { generator.generate(request).await })
}

#[cfg(test)]
mod tests {
    use tokio::runtime::Handle;

    use super::*;

    #[test]
    fn test_blank_prompt_rejected() {
        assert!(GenerationRequest::new("  \n").is_none());
        assert_eq!(
            GenerationRequest::new(QuickCommand::Fix.prompt()).unwrap().prompt(),
            "Metindeki dilbilgisi hatalarını düzelt."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_generation_echoes_prompt() {
        let runner = TaskRunner::new(Handle::current());
        let generator: Arc<dyn TextGenerator> =
            Arc::new(SimulatedGenerator::new(Duration::from_millis(2000)));
        let request = GenerationRequest::new("Q3 hedefleri").unwrap();

        let started = tokio::time::Instant::now();
        let text = submit_generation(&runner, generator, request).wait().await;
        assert_eq!(text.as_deref(), Ok("Q3 hedefleri"));
        assert!(started.elapsed() >= Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_can_be_cancelled() {
        let runner = TaskRunner::new(Handle::current());
        let generator: Arc<dyn TextGenerator> =
            Arc::new(SimulatedGenerator::new(Duration::from_secs(2)));
        let handle = submit_generation(&runner, generator, GenerationRequest::new("x").unwrap());
        handle.cancel();
        assert_eq!(handle.wait().await, Err(TaskError::Cancelled));
    }
}
