pub mod candidate_selector;
pub mod embedding_store;
pub mod interaction_log;
pub mod profile_builder;
pub mod ranker;
pub mod session_tracker;

pub use candidate_selector::CandidateSelector;
pub use embedding_store::{EmbeddingStore, InMemoryEmbeddingStore};
pub use interaction_log::{InMemoryInteractionLog, InteractionLog};
pub use profile_builder::ProfileAggregator;
pub use ranker::RecommendationRanker;
pub use session_tracker::{PresentationSession, SessionRegistry};
