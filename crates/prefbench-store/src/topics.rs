use std::path::Path;

use tracing::info;

use prefbench_core::{PrefError, PrefResult, Topic};

/// Load the ordered topic list from a JSON array file.
pub fn load_topics(path: &Path) -> PrefResult<Vec<Topic>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        PrefError::Topics(format!("cannot read {}: {e}", path.display()))
    })?;
    let topics = parse_topics(&content)
        .map_err(|e| PrefError::Topics(format!("{}: {e}", path.display())))?;
    info!("loaded {} topics from {}", topics.len(), path.display());
    Ok(topics)
}

pub fn parse_topics(content: &str) -> PrefResult<Vec<Topic>> {
    let topics: Vec<Topic> = serde_json::from_str(content)?;
    Ok(topics)
}
