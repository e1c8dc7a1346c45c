//! Genre frequency ranking among viral songs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

/// Count genres of rows whose label is 1 and keep the `limit` most frequent.
///
/// Missing genres are not counted. Ties keep the order in which genres were
/// first encountered.
pub fn rank_viral_genres(
    genres: &[Option<String>],
    labels: &[Option<f64>],
    limit: usize,
) -> Vec<GenreCount> {
    let mut ranking: Vec<GenreCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (genre, label) in genres.iter().zip(labels) {
        let Some(genre) = genre else { continue };
        if *label != Some(1.0) {
            continue;
        }
        match index.get(genre.as_str()) {
            Some(&i) => ranking[i].count += 1,
            None => {
                index.insert(genre.as_str(), ranking.len());
                ranking.push(GenreCount {
                    genre: genre.clone(),
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable, so equal counts stay in first-seen order
    ranking.sort_by(|a, b| b.count.cmp(&a.count));
    ranking.truncate(limit);
    ranking
}
