//! In-process search index with BM25 ranking.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use super::query::{Clause, ClauseKind, Occur, ParsedQuery, parse_query};
use super::tokenizer::tokenize;
use super::{SearchDocument, SearchError, SearchHit, SearchHits, SearchStore};

const BM25_K1: f32 = 1.2;
const BM25_B: f32 = 0.75;

#[derive(Debug)]
struct IndexedDoc {
    source: Value,
    /// JSON field name -> tokens of its value
    fields: HashMap<String, Vec<String>>,
    length: usize,
}

impl IndexedDoc {
    fn new(source: Value) -> Self {
        let mut fields = HashMap::new();
        match &source {
            Value::Object(map) => {
                for (key, value) in map {
                    let tokens = value_tokens(value);
                    if !tokens.is_empty() {
                        fields.insert(key.clone(), tokens);
                    }
                }
            }
            other => {
                fields.insert("_source".to_string(), value_tokens(other));
            }
        }
        let length = fields.values().map(Vec::len).sum();
        Self {
            source,
            fields,
            length,
        }
    }

    fn scope<'a>(&'a self, field: Option<&'a str>) -> Box<dyn Iterator<Item = &'a String> + 'a> {
        match field {
            Some(name) => Box::new(self.fields.get(name).into_iter().flatten()),
            None => Box::new(self.fields.values().flatten()),
        }
    }

    fn term_frequency(&self, field: Option<&str>, token: &str, prefix: bool) -> usize {
        self.scope(field)
            .filter(|t| *t == token || (prefix && t.starts_with(token)))
            .count()
    }
}

fn value_tokens(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::String(s) => tokenize(s),
        other => tokenize(&other.to_string()),
    }
}

#[derive(Debug, Default)]
struct Index {
    docs: BTreeMap<i64, IndexedDoc>,
    total_length: usize,
}

impl Index {
    fn insert(&mut self, id: i64, source: Value) {
        self.remove(id);
        let doc = IndexedDoc::new(source);
        self.total_length += doc.length;
        self.docs.insert(id, doc);
    }

    fn remove(&mut self, id: i64) {
        if let Some(old) = self.docs.remove(&id) {
            self.total_length -= old.length;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn average_length(&self) -> f32 {
        if self.docs.is_empty() {
            0.0
        } else {
            self.total_length as f32 / self.docs.len() as f32
        }
    }

    /// IDF of every token of every clause, in clause order.
    #[allow(clippy::cast_precision_loss)]
    fn idf_table(&self, query: &ParsedQuery) -> Vec<Vec<f32>> {
        let n = self.docs.len() as f32;
        query
            .clauses
            .iter()
            .map(|clause| match &clause.kind {
                ClauseKind::Terms {
                    field,
                    tokens,
                    prefix,
                } => tokens
                    .iter()
                    .enumerate()
                    .map(|(i, token)| {
                        let is_prefix = *prefix && i + 1 == tokens.len();
                        let df = self
                            .docs
                            .values()
                            .filter(|d| d.term_frequency(field.as_deref(), token, is_prefix) > 0)
                            .count() as f32;
                        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
                    })
                    .collect(),
                _ => Vec::new(),
            })
            .collect()
    }

    /// Score of `clause` on `doc`, or `None` when it does not match.
    #[allow(clippy::cast_precision_loss)]
    fn clause_score(doc: &IndexedDoc, clause: &Clause, idf: &[f32], avgdl: f32) -> Option<f32> {
        match &clause.kind {
            ClauseKind::MatchAll => Some(1.0),
            ClauseKind::FieldExists { field } => doc.fields.contains_key(field).then_some(1.0),
            ClauseKind::Terms {
                field,
                tokens,
                prefix,
            } => {
                let dl = doc.length as f32;
                let mut score = 0.0;
                for (i, token) in tokens.iter().enumerate() {
                    let is_prefix = *prefix && i + 1 == tokens.len();
                    let tf = doc.term_frequency(field.as_deref(), token, is_prefix);
                    if tf == 0 {
                        return None;
                    }
                    let tf = tf as f32;
                    let norm = if avgdl > 0.0 { dl / avgdl } else { 1.0 };
                    let tf_norm = (tf * (BM25_K1 + 1.0)) / (tf + BM25_K1 * (1.0 - BM25_B + BM25_B * norm));
                    score += idf.get(i).copied().unwrap_or(0.0) * tf_norm;
                }
                Some(score)
            }
        }
    }

    /// Matching documents with their scores, best first, ties by id.
    fn evaluate(&self, query: &ParsedQuery) -> Vec<(i64, f32)> {
        if query.is_empty() {
            return Vec::new();
        }
        let idf = self.idf_table(query);
        let avgdl = self.average_length();
        let needs_should = !query.has_required() && !query.is_pure_negative();

        let mut scored: Vec<(i64, f32)> = Vec::new();
        'docs: for (id, doc) in &self.docs {
            let mut score = 0.0;
            let mut matched_should = false;
            for (clause, idf) in query.clauses.iter().zip(&idf) {
                let hit = Self::clause_score(doc, clause, idf, avgdl);
                match (clause.occur, hit) {
                    (Occur::Must, Some(s)) => score += s,
                    (Occur::Must, None) | (Occur::MustNot, Some(_)) => continue 'docs,
                    (Occur::MustNot, None) | (Occur::Should, None) => {}
                    (Occur::Should, Some(s)) => {
                        score += s;
                        matched_should = true;
                    }
                }
            }
            if needs_should && !matched_should {
                continue;
            }
            if query.is_pure_negative() {
                score = 1.0;
            }
            scored.push((*id, score));
        }
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored
    }
}

/// Search store keeping every index in process memory.
///
/// Cloning shares the underlying indexes.
#[derive(Clone, Default)]
pub struct InMemorySearchStore {
    indexes: Arc<RwLock<HashMap<String, Index>>>,
}

impl InMemorySearchStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Unavailable`] if the lock is poisoned.
    pub fn document_count(&self, index: &str) -> Result<usize, SearchError> {
        let indexes = self
            .indexes
            .read()
            .map_err(|e| SearchError::Unavailable(format!("Failed to acquire read lock: {e}")))?;
        Ok(indexes.get(index).map_or(0, |i| i.docs.len()))
    }
}

#[async_trait]
impl SearchStore for InMemorySearchStore {
    async fn upsert(&self, index: &str, document: SearchDocument) -> Result<(), SearchError> {
        let mut indexes = self
            .indexes
            .write()
            .map_err(|e| SearchError::Unavailable(format!("Failed to acquire write lock: {e}")))?;
        indexes
            .entry(index.to_string())
            .or_default()
            .insert(document.id, document.source);
        Ok(())
    }

    async fn delete(&self, index: &str, id: i64) -> Result<(), SearchError> {
        let mut indexes = self
            .indexes
            .write()
            .map_err(|e| SearchError::Unavailable(format!("Failed to acquire write lock: {e}")))?;
        if let Some(index) = indexes.get_mut(index) {
            index.remove(id);
        }
        Ok(())
    }

    async fn search(
        &self,
        index: &str,
        query: &str,
        offset: u64,
        limit: u64,
    ) -> Result<SearchHits, SearchError> {
        let parsed = parse_query(query);
        let indexes = self
            .indexes
            .read()
            .map_err(|e| SearchError::Unavailable(format!("Failed to acquire read lock: {e}")))?;
        let Some(index) = indexes.get(index) else {
            return Ok(SearchHits::default());
        };

        let scored = index.evaluate(&parsed);
        let total = scored.len() as u64;
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let hits = scored
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|(id, score)| {
                index.docs.get(&id).map(|doc| SearchHit {
                    id,
                    score,
                    source: doc.source.clone(),
                })
            })
            .collect();
        Ok(SearchHits { total, hits })
    }

    async fn clear(&self, index: &str) -> Result<(), SearchError> {
        let mut indexes = self
            .indexes
            .write()
            .map_err(|e| SearchError::Unavailable(format!("Failed to acquire write lock: {e}")))?;
        indexes.remove(index);
        Ok(())
    }
}
