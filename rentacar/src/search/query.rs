//! Query-string parsing.
//!
//! ```text
//! toyota                 any field contains the token
//! brandName:toyota       only brandName
//! +brandName:toyota -id:3
//! toyota AND corolla     both required
//! desc*                  prefix
//! description:"red car"  every token of the phrase, in any order
//! *                      every document
//! ```

use super::tokenizer::tokenize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    /// Optional; contributes to the score.
    Should,
    Must,
    MustNot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClauseKind {
    MatchAll,
    /// Documents with a non-empty value in `field`.
    FieldExists { field: String },
    /// Every token must occur in `field` (or any field). With `prefix`, the
    /// last token matches as a prefix.
    Terms {
        field: Option<String>,
        tokens: Vec<String>,
        prefix: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub occur: Occur,
    pub kind: ClauseKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedQuery {
    pub clauses: Vec<Clause>,
}

impl ParsedQuery {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    #[must_use]
    pub fn has_required(&self) -> bool {
        self.clauses.iter().any(|c| c.occur == Occur::Must)
    }

    /// True when every clause is an exclusion.
    #[must_use]
    pub fn is_pure_negative(&self) -> bool {
        !self.clauses.is_empty() && self.clauses.iter().all(|c| c.occur == Occur::MustNot)
    }
}

/// Split on whitespace outside double quotes.
fn split_words(query: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in query.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                current.push(c);
            }
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn is_field_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_clause(word: &str, occur: Occur) -> Option<Clause> {
    let (occur, body) = if let Some(rest) = word.strip_prefix('+') {
        (Occur::Must, rest)
    } else if let Some(rest) = word.strip_prefix('-') {
        (Occur::MustNot, rest)
    } else {
        (occur, word)
    };

    let (field, value) = match body.split_once(':') {
        Some((field, value)) if is_field_name(field) => (Some(field.to_string()), value),
        _ => (None, body),
    };

    let quoted = value.len() >= 2 && value.starts_with('"') && value.ends_with('"');
    let value = value.trim_matches('"');

    if value == "*" && !quoted {
        let kind = match field {
            Some(field) => ClauseKind::FieldExists { field },
            None => ClauseKind::MatchAll,
        };
        return Some(Clause { occur, kind });
    }

    let prefix = !quoted && value.len() > 1 && value.ends_with('*');
    let tokens = tokenize(value);
    if tokens.is_empty() {
        return None;
    }
    Some(Clause {
        occur,
        kind: ClauseKind::Terms {
            field,
            tokens,
            prefix,
        },
    })
}

/// Parse a query string. Clauses that reduce to no tokens are dropped, so a
/// blank query parses to an empty [`ParsedQuery`].
#[must_use]
pub fn parse_query(query: &str) -> ParsedQuery {
    let mut clauses: Vec<Clause> = Vec::new();
    let mut pending_and = false;
    let mut pending_not = false;

    for word in split_words(query) {
        match word.as_str() {
            "AND" | "&&" => {
                if let Some(last) = clauses.last_mut()
                    && last.occur == Occur::Should
                {
                    last.occur = Occur::Must;
                }
                pending_and = true;
            }
            "OR" | "||" => pending_and = false,
            "NOT" | "!" => pending_not = true,
            _ => {
                let occur = if pending_not {
                    Occur::MustNot
                } else if pending_and {
                    Occur::Must
                } else {
                    Occur::Should
                };
                pending_and = false;
                pending_not = false;
                if let Some(clause) = parse_clause(&word, occur) {
                    clauses.push(clause);
                }
            }
        }
    }
    ParsedQuery { clauses }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(field: Option<&str>, tokens: &[&str], prefix: bool) -> ClauseKind {
        ClauseKind::Terms {
            field: field.map(str::to_string),
            tokens: tokens.iter().map(|t| (*t).to_string()).collect(),
            prefix,
        }
    }

    #[test]
    fn test_default_operator_is_or() {
        let parsed = parse_query("Toyota honda");
        assert_eq!(parsed.clauses.len(), 2);
        assert!(parsed.clauses.iter().all(|c| c.occur == Occur::Should));
        assert_eq!(parsed.clauses[0].kind, terms(None, &["toyota"], false));
    }

    #[test]
    fn test_field_prefix_and_modifiers() {
        let parsed = parse_query("+brandName:Toy* -id:3");
        assert_eq!(
            parsed.clauses,
            vec![
                Clause {
                    occur: Occur::Must,
                    kind: terms(Some("brandName"), &["toy"], true)
                },
                Clause {
                    occur: Occur::MustNot,
                    kind: terms(Some("id"), &["3"], false)
                },
            ]
        );
    }

    #[test]
    fn test_and_makes_both_sides_required() {
        let parsed = parse_query("toyota AND corolla OR red");
        let occurs: Vec<Occur> = parsed.clauses.iter().map(|c| c.occur).collect();
        assert_eq!(occurs, vec![Occur::Must, Occur::Must, Occur::Should]);
    }

    #[test]
    fn test_not_and_quotes() {
        let parsed = parse_query(r#"NOT description:"red car""#);
        assert_eq!(
            parsed.clauses,
            vec![Clause {
                occur: Occur::MustNot,
                kind: terms(Some("description"), &["red", "car"], false)
            }]
        );
        assert!(parsed.is_pure_negative());
    }

    #[test]
    fn test_wildcards() {
        assert_eq!(parse_query("*").clauses[0].kind, ClauseKind::MatchAll);
        assert_eq!(
            parse_query("colorId:*").clauses[0].kind,
            ClauseKind::FieldExists {
                field: "colorId".into()
            }
        );
    }

    #[test]
    fn test_blank_query_is_empty() {
        assert!(parse_query("").is_empty());
        assert!(parse_query("   ").is_empty());
        assert!(parse_query("?? !!").is_empty());
    }
}
