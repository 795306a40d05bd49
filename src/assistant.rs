//! Prompt to reply chat path with the assistant persona.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::llm::{CompletionParams, LlmConfig, ModelClient};

/// Reply to an empty prompt.
pub const EMPTY_PROMPT_REPLY: &str = "Please enter a prompt.";
/// Reply when the model answered with nothing.
pub const EMPTY_MODEL_REPLY: &str = "The model returned an empty response.";

/// Default persona description.
pub const DEFAULT_BIO: &str = "Profil: etudiant en pre-ingenierie oriente IA/ML, systemes embarques et agents conversationnels.\n\
Projets: prediction de pannes Smart Grid (LSTM, >90%), wearables (Peltier/Piezo, Arduino), assistant agricole \
(NLP/Dialogflow FR/AR), agent vocal temps reel (VAD/STT/LLM/TTS), automatisations n8n+Puppeteer, MLOps crypto \
(CI/CD, registry), graphe d'outils MCP (Neo4j/LangGraph).\n\
Competences: Python, TensorFlow, Pandas, LSTM, Dialogflow, Arduino, impression 3D, Next.js/TS/Tailwind, Git, Linux.";

const DIRECTIVES: &str = "Directives:\n\
- Repondre en francais (sauf demande explicite contraire).\n\
- Etre clair, structure, pedagogique et concis.\n\
- Citer des approches/outils pertinents si utile.\n\
- Extraits de code minimalistes et corrects si question technique.\n\
- Demander des precisions si ambigu.\n";

/// Suggested prompts shown by the UI.
pub const SUGGESTED_PROMPTS: &[&str] = &[
    "Explique ta solution Smart Grid Failure Prediction (donnees, features, LSTM, entrainement) et propose 3 ameliorations pour la mise en prod.",
    "Comment integrer des capteurs thermoelectriques et piezoelectriques dans une architecture IoT low-power avec analytics temps reel ?",
    "Concois un assistant agricole FR/AR: capteurs sol, pretraitement, modele de recommandation de cultures et interface conversationnelle.",
    "Decris une architecture d'agent vocal temps reel avec VAD, STT, LLM, TTS et tool-calling. Donne un schema de flux textuel.",
    "Quelles bonnes pratiques de securite et robustesse pour un scraper Puppeteer (auth, cookies, proxy, anti-bot, timeouts, Docker) ?",
    "Donne un pipeline MLOps pour predire des prix crypto, avec versionnement, registry et deploiement sans interruption.",
];

/// Persona settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Persona description placed at the top of the system prompt.
    pub bio: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            bio: DEFAULT_BIO.to_string(),
        }
    }
}

/// Answers free-form prompts.
#[derive(Clone)]
pub struct Assistant {
    client: ModelClient,
    system_prompt: String,
    params: CompletionParams,
}

impl Assistant {
    /// Create an assistant.
    #[must_use]
    pub fn new(client: ModelClient, config: &AssistantConfig, llm: &LlmConfig) -> Self {
        Self {
            client,
            system_prompt: build_system_prompt(&config.bio),
            params: llm.chat_params(),
        }
    }

    /// Full system prompt.
    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Answer a prompt. Never fails; errors come back as text.
    pub async fn reply(&self, prompt: &str) -> String {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return EMPTY_PROMPT_REPLY.to_string();
        }
        info!(chars = prompt.chars().count(), "prompt received");
        let text = self
            .client
            .complete(&self.system_prompt, prompt, &self.params)
            .await;
        if text.is_empty() {
            EMPTY_MODEL_REPLY.to_string()
        } else {
            text
        }
    }
}

fn build_system_prompt(bio: &str) -> String {
    format!("{}\n\n{DIRECTIVES}", bio.trim())
}
