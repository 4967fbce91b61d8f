pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::EngineConfig;
pub use engine::StyleEngine;
pub use error::{EngineError, Result};
pub use models::{
    DecisionKind, InteractionEvent, RankSource, RankedItem, StyleProfile, WardrobeItem,
};
pub use services::{
    CandidateSelector, EmbeddingStore, InMemoryEmbeddingStore, InMemoryInteractionLog,
    InteractionLog, ProfileAggregator, RecommendationRanker, SessionRegistry,
};
