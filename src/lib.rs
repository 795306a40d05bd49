//! Voice and text assistant backend with company, CV and LinkedIn briefs
//! produced by a hosted language model.

// Interdiction stricte de pratiques dangereuses ou non idiomatiques
#![deny(warnings)] // Tous les warnings sont traités comme des erreurs
#![deny(unsafe_code)] // Le code unsafe est interdit
#![deny(missing_docs)] // Toute fonction, struct, enum ou module public doit être documenté
#![deny(dead_code)] // Le code inutilisé est interdit
#![deny(non_camel_case_types)]

// Options supplémentaires pour ne rien laisser passer
#![deny(unused_imports)] // Les imports inutilisés sont interdits
#![deny(unused_variables)] // Les variables inutilisées sont interdites
#![deny(unused_must_use)] // Oblige à gérer explicitement les Result et Option
#![deny(non_snake_case)]
#![deny(non_upper_case_globals)]
#![deny(nonstandard_style)]
#![forbid(unsafe_op_in_unsafe_fn)]

// Clippy pour stricte discipline
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(clippy::unwrap_used)] // Interdit unwrap()
#![deny(clippy::expect_used)] // Interdit expect()
#![deny(clippy::panic)] // Interdit panic!()
#![deny(clippy::print_stdout)] // Pas de println!() dans la bibliothèque
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::missing_const_for_fn)] // Force const lorsque possible
#![deny(clippy::unwrap_in_result)]
#![deny(clippy::module_inception)]
#![deny(clippy::redundant_clone)]
#![deny(clippy::shadow_unrelated)] // Interdit le shadowing de variables non liées
#![deny(clippy::too_many_arguments)]
#![deny(clippy::cognitive_complexity)]
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::shadow_unrelated,
        clippy::missing_const_for_fn
    )
)]

// Lints pour sécurité et robustesse
#![deny(overflowing_literals)]

/// Company and CV analyzers.
#[allow(clippy::missing_const_for_fn)]
pub mod analysis;
/// Prompt answering with the assistant persona.
pub mod assistant;
/// Environment-driven configuration.
#[allow(clippy::missing_errors_doc)]
pub mod config;
/// CV file reading.
pub mod documents;
/// Remote model client (Groq chat completions).
#[allow(clippy::doc_markdown)]
pub mod llm;
/// Website and LinkedIn scraping.
#[allow(
    clippy::doc_markdown,
    clippy::similar_names,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,
    clippy::option_if_let_else,
    clippy::cast_possible_truncation
)]
pub mod scraping;
/// HTTP server and API routes.
#[allow(
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::unused_async
)]
pub mod server;
/// Entry helpers to start the voxbrief server.
pub mod start_voxbrief;
/// Chunk, summarize and merge pipeline.
pub mod summarize;
/// Shared text helpers.
pub mod text;
/// Speech-to-text for voice prompts.
pub mod transcription;
