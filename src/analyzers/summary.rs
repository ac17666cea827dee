use crate::types::{Commit, LogSummary};
use std::collections::HashSet;

/// Overall statistics of a revision log, matching code-maat's `summary`
/// analysis: entities are distinct files, entities-changed counts every
/// file change across all commits.
pub fn analyze_summary(commits: &[Commit]) -> LogSummary {
    let entities: HashSet<&str> = commits
        .iter()
        .flat_map(|c| c.files.iter().map(|f| f.as_str()))
        .collect();
    let authors: HashSet<&str> = commits.iter().map(|c| c.author.as_str()).collect();

    LogSummary {
        commits: commits.len(),
        entities: entities.len(),
        entities_changed: commits.iter().map(|c| c.files.len()).sum(),
        authors: authors.len(),
    }
}

impl LogSummary {
    /// Rows in code-maat's `statistic,value` order.
    pub fn rows(&self) -> [(&'static str, usize); 4] {
        [
            ("number-of-commits", self.commits),
            ("number-of-entities", self.entities),
            ("number-of-entities-changed", self.entities_changed),
            ("number-of-authors", self.authors),
        ]
    }
}
