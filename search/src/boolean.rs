use crate::error::{QueryError, Result};
use lyrics_core::{DocId, InvertedIndex};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub negated: bool,
    pub word: String,
}

/// `[not] w (and|or [not] w)*`, evaluated strictly left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanQuery {
    pub first: Clause,
    pub rest: Vec<(Op, Clause)>,
}

/// `not` negates only when a word follows it; in term position every word,
/// including `and`, `or` and `not`, is looked up as a term.
fn parse_clause<'w, I>(words: &mut I, text: &str) -> Result<Clause>
where
    I: Iterator<Item = &'w str>,
{
    let Some(word) = words.next() else {
        return Err(QueryError::MalformedBoolean(format!("missing term at end of {text:?}")));
    };
    if word == "not" {
        if let Some(term) = words.next() {
            return Ok(Clause { negated: true, word: term.to_string() });
        }
    }
    Ok(Clause { negated: false, word: word.to_string() })
}

impl BooleanQuery {
    pub fn parse(text: &str) -> Result<Self> {
        let lowered = text.to_lowercase();
        if lowered.trim().is_empty() {
            return Err(QueryError::InvalidQuery(text.to_string()));
        }
        let mut words = lowered.split_whitespace();
        let first = parse_clause(&mut words, text)?;
        let mut rest = Vec::new();
        while let Some(word) = words.next() {
            let op = match word {
                "and" => Op::And,
                "or" => Op::Or,
                other => {
                    let msg = format!("expected \"and\" or \"or\", found {other:?}");
                    return Err(QueryError::MalformedBoolean(msg));
                }
            };
            rest.push((op, parse_clause(&mut words, text)?));
        }
        Ok(Self { first, rest })
    }

    pub fn evaluate(&self, index: &InvertedIndex) -> BTreeSet<DocId> {
        let mut acc = clause_docs(&self.first, index);
        for (op, clause) in &self.rest {
            let rhs = clause_docs(clause, index);
            acc = match op {
                Op::And => acc.intersection(&rhs).copied().collect(),
                Op::Or => acc.union(&rhs).copied().collect(),
            };
        }
        acc
    }
}

fn clause_docs(clause: &Clause, index: &InvertedIndex) -> BTreeSet<DocId> {
    // Normalization can split one word into several terms; all of them must
    // occur. A word with no terms (stopword, punctuation) matches nothing.
    let terms = index.analyzer().terms(&clause.word);
    let mut matched: Option<BTreeSet<DocId>> = None;
    for term in &terms {
        let docs: BTreeSet<DocId> = index.postings(term).iter().map(|p| p.doc_id).collect();
        matched = Some(match matched {
            Some(acc) => acc.intersection(&docs).copied().collect(),
            None => docs,
        });
    }
    let matched = matched.unwrap_or_default();
    if clause.negated {
        index.docs().map(|(doc_id, _)| doc_id).filter(|d| !matched.contains(d)).collect()
    } else {
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyrics_core::{build, Document};

    #[test]
    fn parses_chain() {
        let q = BooleanQuery::parse("Love AND not hate or fire").unwrap();
        assert_eq!(q.first, Clause { negated: false, word: "love".into() });
        assert_eq!(q.rest.len(), 2);
        assert_eq!(q.rest[0], (Op::And, Clause { negated: true, word: "hate".into() }));
        assert_eq!(q.rest[1].0, Op::Or);
    }

    #[test]
    fn rejects_malformed() {
        assert!(matches!(BooleanQuery::parse("love and"), Err(QueryError::MalformedBoolean(_))));
        assert!(matches!(BooleanQuery::parse("love hate"), Err(QueryError::MalformedBoolean(_))));
        let trailing = BooleanQuery::parse("love or hate fire");
        assert!(matches!(trailing, Err(QueryError::MalformedBoolean(_))));
        assert!(matches!(BooleanQuery::parse("   "), Err(QueryError::InvalidQuery(_))));
    }

    #[test]
    fn keywords_in_term_position_are_terms() {
        let lone_not = BooleanQuery::parse("not").unwrap();
        assert_eq!(lone_not.first, Clause { negated: false, word: "not".into() });
        assert!(lone_not.rest.is_empty());

        let q = BooleanQuery::parse("stop and not").unwrap();
        assert_eq!(q.rest, vec![(Op::And, Clause { negated: false, word: "not".into() })]);

        let q = BooleanQuery::parse("not and").unwrap();
        assert_eq!(q.first, Clause { negated: true, word: "and".into() });
        assert_eq!(BooleanQuery::parse("or").unwrap().first.word, "or");
    }

    #[test]
    fn keyword_terms_match_documents() {
        let index = build(vec![
            Document::new("doc1", "i will not stop"),
            Document::new("doc2", "love or hate"),
        ])
        .unwrap();
        let ids = |q: &str| {
            let parsed = BooleanQuery::parse(q).unwrap();
            parsed.evaluate(&index).into_iter().collect::<Vec<_>>()
        };
        assert_eq!(ids("not"), vec![0]);
        assert_eq!(ids("stop and not"), vec![0]);
        assert_eq!(ids("or"), vec![1]);
        assert_eq!(ids("not not"), vec![1]);
    }

    #[test]
    fn split_word_requires_every_term() {
        // NFKC turns U+00A8 into a space plus a combining mark.
        let index = build(vec![
            Document::new("a", "stop \u{a8}will"),
            Document::new("b", "stop"),
        ])
        .unwrap();
        assert_eq!(index.analyzer().terms("stop\u{a8}will").len(), 2);
        let hits = BooleanQuery::parse("stop\u{a8}will").unwrap().evaluate(&index);
        assert_eq!(hits.into_iter().collect::<Vec<_>>(), vec![0]);
    }
}
