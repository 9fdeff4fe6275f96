//! Tool selection: vocabulary building, intent inference and ranking.

pub mod intent;
pub mod ranker;
pub mod tokenize;
pub mod vocabulary;

pub use intent::Intent;
pub use ranker::{rank, rank_scored, Query, RankPolicy, ScoredTool};
pub use tokenize::tokenize;
pub use vocabulary::Vocabulary;
