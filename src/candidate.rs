//! Candidate entity links and the wire schema they arrive in.
//!
//! A candidate is one proposed association between a span of the input text
//! and a Wikipedia article, together with the statistics the server computed
//! for it. The HTTP and stdio protocols share this schema, so parsing lives
//! here rather than in either client.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SemanticizerError};

/// One proposed entity mention in an input text span.
///
/// Immutable once produced; the caller owns the record after return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Title of the target Wikipedia article.
    pub target: String,
    /// Offset of the anchor in the input string.
    pub offset: u64,
    /// Length of the anchor in the input string.
    pub length: u64,
    /// Prior probability that the anchor refers to this target.
    pub commonness: f64,
    /// Contextual probability of the link.
    pub senseprob: f64,
    /// Total number of links to the target observed in the corpus.
    pub linkcount: u64,
    /// Raw n-gram count estimate for the anchor.
    pub ngramcount: u64,
}

/// Parse a response body into candidate links.
///
/// `null`, an empty body, and `[]` all mean "no candidates" rather than an
/// error. Anything else must be a JSON array of complete candidate objects;
/// a missing required field is a [`SemanticizerError::ProtocolError`], not a
/// partially populated record.
pub(crate) fn parse_candidates(body: &str) -> Result<Vec<Candidate>> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str::<Option<Vec<Candidate>>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| SemanticizerError::ProtocolError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_array_means_no_candidates() {
        assert_eq!(parse_candidates("[]").unwrap(), Vec::new());
    }

    #[test]
    fn null_means_no_candidates() {
        assert_eq!(parse_candidates("null").unwrap(), Vec::new());
    }

    #[test]
    fn empty_body_means_no_candidates() {
        assert_eq!(parse_candidates("").unwrap(), Vec::new());
        assert_eq!(parse_candidates("  \n").unwrap(), Vec::new());
    }

    #[test]
    fn single_candidate_preserves_all_fields() {
        let body = r#"[{"target":"Antwerp","offset":0,"length":9,
            "commonness":0.8,"senseprob":0.6,"linkcount":120,"ngramcount":150}]"#;
        let cands = parse_candidates(body).unwrap();
        assert_eq!(cands.len(), 1);
        let c = &cands[0];
        assert_eq!(c.target, "Antwerp");
        assert_eq!(c.offset, 0);
        assert_eq!(c.length, 9);
        assert_eq!(c.commonness, 0.8);
        assert_eq!(c.senseprob, 0.6);
        assert_eq!(c.linkcount, 120);
        assert_eq!(c.ngramcount, 150);
    }

    #[test]
    fn missing_field_is_protocol_error() {
        // No senseprob.
        let body = r#"[{"target":"Antwerp","offset":0,"length":9,
            "commonness":0.8,"linkcount":120,"ngramcount":150}]"#;
        assert!(matches!(
            parse_candidates(body),
            Err(SemanticizerError::ProtocolError(_))
        ));
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let body = r#"[{"target":"Antwerp","offset":0,"length":9,
            "commonness":0.8,"senseprob":0.6,"linkcount":120,"ngramcount":150,
            "extra":"ignored"}]"#;
        assert_eq!(parse_candidates(body).unwrap().len(), 1);
    }

    #[test]
    fn non_json_is_protocol_error() {
        assert!(matches!(
            parse_candidates("<html>not json</html>"),
            Err(SemanticizerError::ProtocolError(_))
        ));
    }

    #[test]
    fn order_is_preserved_as_received() {
        let body = r#"[
            {"target":"B","offset":2,"length":1,"commonness":0.1,
             "senseprob":0.1,"linkcount":1,"ngramcount":1},
            {"target":"A","offset":0,"length":1,"commonness":0.2,
             "senseprob":0.2,"linkcount":2,"ngramcount":2}
        ]"#;
        let cands = parse_candidates(body).unwrap();
        assert_eq!(cands[0].target, "B");
        assert_eq!(cands[1].target, "A");
    }
}
