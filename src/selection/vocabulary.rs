//! Bag-of-tokens vocabulary over a tool set, used for partial-match scoring.

use crate::ingestion::Tool;
use crate::selection::tokenize::tokenize;
use std::collections::HashSet;

/// Every token found in any tool's path, name or description.
///
/// Always built from scratch for a whole tool set; there is no incremental
/// update, so re-ingestion replaces rather than merges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    tokens: HashSet<String>,
}

impl Vocabulary {
    pub fn build(tools: &[Tool]) -> Self {
        let tokens = tools
            .iter()
            .flat_map(|tool| {
                tokenize(&tool.path)
                    .into_iter()
                    .chain(tokenize(&tool.name))
                    .chain(tokenize(&tool.description))
            })
            .collect();

        Self { tokens }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().map(Into::into).collect(),
        }
    }
}
