//! Summary profiles: role instruction, prompt templates and tunables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::chunker;
use super::types::Segment;
use crate::llm::CompletionParams;

/// Role instruction for company website analysis.
const COMPANY_SYSTEM_PROMPT: &str = r"Tu es un assistant qui analyse et extrait des informations sur les entreprises a partir de leur site web.
Structure attendue:
1) Nom et secteur d'activite
2) Description de l'entreprise
3) Produits/Services principaux
4) Technologies utilisees
5) Taille/Localisation
6) Valeurs et culture d'entreprise
Extrait uniquement les informations factuelles presentes sur le site. Ton professionnel et concis.";

/// Role instruction for CV summaries.
const CV_SYSTEM_PROMPT: &str = r"Tu es un assistant qui resume des CV en francais de maniere professionnelle, structuree et factuelle.
Structure attendue:
1) Profil
2) Competences cles
3) Realisations quantifiees
4) Stack / Outils
5) Valeur ajoutee / Positionnement
Ne pas inventer. Conserver chiffres, metriques, technologies. Ton concis.";

/// Which document family a profile summarizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    /// Public company website.
    Company,
    /// Curriculum vitae.
    Cv,
}

/// How a profile cuts documents into segments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// Whitespace-delimited tokens.
    Words,
    /// Lines, preserving line breaks.
    Lines,
}

/// Tunables of one summary profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Maximum segment size in characters.
    pub chunk_char_limit: usize,
    /// Default word budget of the final result.
    pub target_words: usize,
    /// Share of the final budget spread over partial summaries (< 1).
    pub damping: f64,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling.
    pub top_p: f32,
    /// Maximum output tokens per call.
    pub max_tokens: u32,
    /// Timeout of each remote call.
    #[serde(with = "crate::config::duration_secs")]
    pub request_timeout: Duration,
}

impl SummaryConfig {
    /// Defaults for company website analysis.
    #[must_use]
    pub const fn company() -> Self {
        Self {
            chunk_char_limit: 5000,
            target_words: 300,
            damping: 0.7,
            temperature: 0.3,
            top_p: 0.9,
            max_tokens: 800,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Defaults for CV summaries.
    #[must_use]
    pub const fn cv() -> Self {
        Self {
            chunk_char_limit: 4500,
            target_words: 250,
            damping: 0.6,
            temperature: 0.25,
            top_p: 0.9,
            max_tokens: 600,
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Everything the orchestrator needs to summarize one kind of document.
#[derive(Clone, Debug)]
pub struct SummaryProfile {
    /// Document family.
    pub kind: ProfileKind,
    /// Fixed role instruction used for segment and fusion calls.
    pub system_prompt: String,
    /// Segmentation strategy.
    pub split_mode: SplitMode,
    /// Tunables.
    pub config: SummaryConfig,
}

impl SummaryProfile {
    /// Company website profile.
    #[must_use]
    pub fn company(config: SummaryConfig) -> Self {
        Self {
            kind: ProfileKind::Company,
            system_prompt: COMPANY_SYSTEM_PROMPT.to_string(),
            split_mode: SplitMode::Words,
            config,
        }
    }

    /// CV profile.
    #[must_use]
    pub fn cv(config: SummaryConfig) -> Self {
        Self {
            kind: ProfileKind::Cv,
            system_prompt: CV_SYSTEM_PROMPT.to_string(),
            split_mode: SplitMode::Lines,
            config,
        }
    }

    /// Cut a text according to the profile's split mode and limit.
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<Segment> {
        match self.split_mode {
            SplitMode::Words => chunker::split(text, self.config.chunk_char_limit),
            SplitMode::Lines => chunker::split_lines(text, self.config.chunk_char_limit),
        }
    }

    /// Parameters of every remote call made for this profile.
    #[must_use]
    pub const fn params(&self) -> CompletionParams {
        CompletionParams {
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            max_tokens: self.config.max_tokens,
            timeout: self.config.request_timeout,
        }
    }

    /// User instruction for one segment.
    #[must_use]
    pub fn segment_prompt(&self, content: &str, origin: &str, target_words: usize) -> String {
        match self.kind {
            ProfileKind::Company => format!(
                "Analyse ce contenu du site web {origin} et extrait les informations cles sur l'entreprise \
                 en ~{target_words} mots. Focus sur: activite, produits/services, technologies, valeurs.\n\n\
                 === CONTENU ===\n{content}"
            ),
            ProfileKind::Cv => format!(
                "Resume ce segment de CV ({origin}) en ~{target_words} mots, puces concises, \
                 garde chiffres/tech.\n\n=== SEGMENT ===\n{content}"
            ),
        }
    }

    /// User instruction for the fusion call.
    #[must_use]
    pub fn fusion_prompt(&self, merged: &str, target_words: usize) -> String {
        match self.kind {
            ProfileKind::Company => format!(
                "Synthetise les analyses partielles ci-dessous en une analyse globale de l'entreprise \
                 ({target_words} mots max). Structure: secteur, activite, produits/services, technologies, \
                 culture d'entreprise. Evite les repetitions.\n\n\
                 === ANALYSES PARTIELLES ===\n{merged}"
            ),
            ProfileKind::Cv => format!(
                "Fusionne les resumes partiels ci-dessous en un resume global (~{target_words} mots) \
                 sans repetitions, meme structure exigee, conserve metriques & mots-cles.\n\n\
                 === RESUMES PARTIELS ===\n{merged}"
            ),
        }
    }
}
