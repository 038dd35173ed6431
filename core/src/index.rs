use crate::error::{IndexError, Result};
use crate::tokenizer::{Analyzer, AnalyzerConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type DocId = u32;

/// A lyric text as handed over by the corpus loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    /// Display name, e.g. `Artist/Song Title`.
    #[serde(default)]
    pub title: Option<String>,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), title: None, text: text.into() }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocMeta {
    pub external_id: String,
    pub title: Option<String>,
    /// Number of indexed tokens.
    pub length: u32,
    /// L2 norm of the document's tf-idf vector.
    pub norm: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u32,
    pub positions: Vec<u32>, // ascending, len == tf
}

impl Posting {
    pub fn has_position(&self, pos: u32) -> bool {
        self.positions.binary_search(&pos).is_ok()
    }
}

/// `ln((1 + N) / (1 + df)) + 1`
pub fn smoothed_idf(num_docs: u32, df: u32) -> f32 {
    ((1.0 + num_docs as f32) / (1.0 + df as f32)).ln() + 1.0
}

/// Immutable term → postings map. Internal doc ids follow the ascending
/// order of the external ids.
#[derive(Debug, Clone)]
pub struct InvertedIndex {
    analyzer: Analyzer,
    postings: HashMap<String, Vec<Posting>>, // postings sorted by doc_id
    docs: Vec<DocMeta>,                      // indexed by doc_id
}

impl InvertedIndex {
    pub fn analyzer(&self) -> &Analyzer { &self.analyzer }

    pub fn num_docs(&self) -> u32 { self.docs.len() as u32 }

    pub fn num_terms(&self) -> usize { self.postings.len() }

    pub fn total_postings(&self) -> usize { self.postings.values().map(Vec::len).sum() }

    pub fn contains_term(&self, term: &str) -> bool { self.postings.contains_key(term) }

    /// Postings for `term`, empty when the term was never seen.
    pub fn postings(&self, term: &str) -> &[Posting] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn doc_freq(&self, term: &str) -> u32 { self.postings(term).len() as u32 }

    pub fn idf(&self, term: &str) -> f32 { smoothed_idf(self.num_docs(), self.doc_freq(term)) }

    pub fn terms(&self) -> impl Iterator<Item = &str> { self.postings.keys().map(String::as_str) }

    pub fn doc(&self, doc_id: DocId) -> Option<&DocMeta> { self.docs.get(doc_id as usize) }

    pub fn docs(&self) -> impl Iterator<Item = (DocId, &DocMeta)> {
        self.docs.iter().enumerate().map(|(i, meta)| (i as DocId, meta))
    }

    pub fn doc_length(&self, doc_id: DocId) -> Option<u32> { self.doc(doc_id).map(|d| d.length) }

    /// Look up the internal id of an external document id.
    pub fn doc_id(&self, external_id: &str) -> Option<DocId> {
        self.docs
            .binary_search_by(|d| d.external_id.as_str().cmp(external_id))
            .ok()
            .map(|i| i as DocId)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Indexer {
    analyzer: Analyzer,
}

impl Indexer {
    pub fn new(config: AnalyzerConfig) -> Self { Self { analyzer: Analyzer::new(config) } }

    pub fn build<I>(&self, documents: I) -> Result<InvertedIndex>
    where
        I: IntoIterator<Item = Document>,
    {
        let mut documents: Vec<Document> = documents.into_iter().collect();
        if documents.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }
        documents.sort_by(|a, b| a.id.cmp(&b.id));
        if let Some(pair) = documents.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(IndexError::DuplicateDocument(pair[0].id.clone()));
        }

        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        let mut docs: Vec<DocMeta> = Vec::with_capacity(documents.len());

        for (ord, doc) in documents.into_iter().enumerate() {
            let doc_id = ord as DocId;
            let tokens = self.analyzer.analyze(&doc.text);
            let length = tokens.len() as u32;

            let mut positions_by_term: HashMap<String, Vec<u32>> = HashMap::new();
            for (term, pos) in tokens {
                positions_by_term.entry(term).or_default().push(pos as u32);
            }
            // Documents are visited in doc_id order, so each list stays sorted.
            for (term, positions) in positions_by_term {
                let tf = positions.len() as u32;
                postings.entry(term).or_default().push(Posting { doc_id, tf, positions });
            }

            docs.push(DocMeta { external_id: doc.id, title: doc.title, length, norm: 0.0 });
        }

        let n = docs.len() as u32;
        for plist in postings.values() {
            let idf = smoothed_idf(n, plist.len() as u32);
            for p in plist {
                let w = p.tf as f32 * idf;
                docs[p.doc_id as usize].norm += w * w;
            }
        }
        for meta in docs.iter_mut() {
            meta.norm = meta.norm.sqrt();
        }

        let index = InvertedIndex { analyzer: self.analyzer, postings, docs };
        tracing::info!(
            num_docs = index.num_docs(),
            num_terms = index.num_terms(),
            num_postings = index.total_postings(),
            "index build complete"
        );
        Ok(index)
    }
}

/// Build an index with the default analyzer.
pub fn build<I>(documents: I) -> Result<InvertedIndex>
where
    I: IntoIterator<Item = Document>,
{
    Indexer::default().build(documents)
}
