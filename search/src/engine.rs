use crate::boolean::BooleanQuery;
use crate::error::{QueryError, Result};
use lyrics_core::{smoothed_idf, DocId, InvertedIndex, Posting};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// How ranked queries score candidate documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scoring {
    /// Sum of the query terms' frequencies in the document.
    #[default]
    TermFrequency,
    /// Cosine similarity of tf-idf vectors.
    CosineTfIdf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub doc_id: String,
    pub title: Option<String>,
    pub score: f32,
}

/// Read-only view over an index. Cheap to create; any number of engines may
/// query the same index from different threads.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
    index: &'a InvertedIndex,
    scoring: Scoring,
}

impl<'a> QueryEngine<'a> {
    pub fn new(index: &'a InvertedIndex) -> Self {
        Self { index, scoring: Scoring::default() }
    }

    pub fn with_scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn scoring(&self) -> Scoring { self.scoring }

    pub fn index(&self) -> &'a InvertedIndex { self.index }

    /// Top `k` documents by descending score, ties by ascending document id.
    pub fn query(&self, text: &str, k: usize) -> Result<Vec<SearchHit>> {
        let terms = self.index.analyzer().terms(text);
        if terms.is_empty() {
            return Err(QueryError::InvalidQuery(text.to_string()));
        }
        let mut tf_q: BTreeMap<String, u32> = BTreeMap::new();
        for term in terms {
            *tf_q.entry(term).or_insert(0) += 1;
        }

        let scores = match self.scoring {
            Scoring::TermFrequency => self.tf_scores(&tf_q),
            Scoring::CosineTfIdf => self.cosine_scores(&tf_q),
        };

        let candidates = scores.len();
        let mut scored: Vec<(DocId, f32)> = scores.into_iter().collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);
        tracing::debug!(
            query = text,
            terms = tf_q.len(),
            candidates,
            returned = scored.len(),
            "ranked query"
        );

        Ok(scored.into_iter().filter_map(|(doc_id, score)| self.hit(doc_id, score)).collect())
    }

    fn tf_scores(&self, tf_q: &BTreeMap<String, u32>) -> HashMap<DocId, f32> {
        let mut scores: HashMap<DocId, f32> = HashMap::new();
        for term in tf_q.keys() {
            for p in self.index.postings(term) {
                *scores.entry(p.doc_id).or_insert(0.0) += p.tf as f32;
            }
        }
        scores
    }

    fn cosine_scores(&self, tf_q: &BTreeMap<String, u32>) -> HashMap<DocId, f32> {
        let n = self.index.num_docs();
        let mut scores: HashMap<DocId, f32> = HashMap::new();
        let mut q_norm = 0.0f32;
        for (term, qf) in tf_q {
            // Unknown terms still weigh on the query norm, with df = 0.
            let postings = self.index.postings(term);
            let idf = smoothed_idf(n, postings.len() as u32);
            let q_w = *qf as f32 * idf;
            q_norm += q_w * q_w;
            for p in postings {
                *scores.entry(p.doc_id).or_insert(0.0) += q_w * (p.tf as f32 * idf);
            }
        }
        let q_norm = q_norm.sqrt();
        for (doc_id, score) in scores.iter_mut() {
            let d_norm = self.index.doc(*doc_id).map(|d| d.norm).unwrap_or(0.0);
            if d_norm != 0.0 && q_norm != 0.0 {
                *score /= d_norm * q_norm;
            }
        }
        scores
    }

    /// Documents containing the analyzed phrase terms at the same relative
    /// positions as in `text`, in ascending document id order. The score is
    /// the number of occurrences.
    ///
    /// Positions count removed stopwords too, so with stopword removal on,
    /// `"stars in the air"` matches `stars in the air` but not `stars air`.
    pub fn phrase(&self, text: &str) -> Result<Vec<SearchHit>> {
        let tokens = self.index.analyzer().analyze(text);
        let Some(((first, base), rest)) = tokens.split_first() else {
            return Err(QueryError::InvalidQuery(text.to_string()));
        };
        let offsets: Vec<(&str, u32)> = rest
            .iter()
            .map(|(t, p)| (t.as_str(), (p - base) as u32))
            .collect();

        let mut hits = Vec::new();
        for lead in self.index.postings(first) {
            let Some(others) = self.postings_in_doc(&offsets, lead.doc_id) else { continue };
            let occurrences = lead
                .positions
                .iter()
                .filter(|&&pos| {
                    offsets
                        .iter()
                        .zip(&others)
                        .all(|((_, off), p)| p.has_position(pos + off))
                })
                .count();
            if occurrences > 0 {
                hits.extend(self.hit(lead.doc_id, occurrences as f32));
            }
        }
        tracing::debug!(query = text, returned = hits.len(), "phrase query");
        Ok(hits)
    }

    fn postings_in_doc(
        &self,
        offsets: &[(&str, u32)],
        doc_id: DocId,
    ) -> Option<Vec<&'a Posting>> {
        offsets
            .iter()
            .map(|(term, _)| {
                let plist = self.index.postings(term);
                plist.binary_search_by_key(&doc_id, |p| p.doc_id).ok().map(|i| &plist[i])
            })
            .collect()
    }

    /// Evaluate `[not] w (and|or [not] w)*` left to right. Matching documents
    /// come back in ascending id order with a score of 1.
    pub fn boolean(&self, text: &str) -> Result<Vec<SearchHit>> {
        let parsed = BooleanQuery::parse(text)?;
        let matched = parsed.evaluate(self.index);
        tracing::debug!(query = text, returned = matched.len(), "boolean query");
        Ok(matched.into_iter().filter_map(|doc_id| self.hit(doc_id, 1.0)).collect())
    }

    /// A text wrapped in double quotes runs as a phrase query, anything else
    /// as a ranked query.
    pub fn search(&self, text: &str, k: usize) -> Result<Vec<SearchHit>> {
        let trimmed = text.trim();
        match trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
            Some(inner) => {
                let mut hits = self.phrase(inner)?;
                hits.truncate(k);
                Ok(hits)
            }
            None => self.query(text, k),
        }
    }

    fn hit(&self, doc_id: DocId, score: f32) -> Option<SearchHit> {
        let meta = self.index.doc(doc_id)?;
        Some(SearchHit { doc_id: meta.external_id.clone(), title: meta.title.clone(), score })
    }
}

/// Term-frequency ranking as `(document id, score)` pairs.
pub fn query(index: &InvertedIndex, text: &str, k: usize) -> Result<Vec<(String, f32)>> {
    let hits = QueryEngine::new(index).query(text, k)?;
    Ok(hits.into_iter().map(|h| (h.doc_id, h.score)).collect())
}
