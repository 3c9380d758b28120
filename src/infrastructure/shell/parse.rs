use std::collections::BTreeMap;

use crate::domain::errors::TransportError;
use crate::domain::models::{EntityId, StateSnapshot};

/// Parse command output into a snapshot.
///
/// One entity per line: `<id> [<token>]`. A line with only an id means the
/// entity has no state token yet. Blank lines are skipped. An id listed
/// twice is a malformed response.
pub fn parse_snapshot(output: &str) -> Result<StateSnapshot, TransportError> {
    let mut tokens: BTreeMap<EntityId, String> = BTreeMap::new();

    for line in output.lines() {
        let mut parts = line.split_whitespace();
        let Some(id) = parts.next() else {
            continue;
        };
        let token = parts.next().unwrap_or_default();

        if let Some(extra) = parts.next() {
            return Err(TransportError::Malformed {
                reason: format!("unexpected field `{extra}` for entity {id}"),
            });
        }

        if tokens.insert(EntityId::new(id), token.to_string()).is_some() {
            return Err(TransportError::Malformed {
                reason: format!("duplicate entity {id}"),
            });
        }
    }

    Ok(StateSnapshot::from_pairs(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ids_and_tokens() {
        let snapshot = parse_snapshot("pod1 12345\npod2 67890\n").expect("parse");
        assert_eq!(snapshot.get(&"pod1".into()), Some("12345"));
        assert_eq!(snapshot.get(&"pod2".into()), Some("67890"));
    }

    #[test]
    fn test_missing_token_is_unassigned() {
        let snapshot = parse_snapshot("pod1\npod2 7\n\n").expect("parse");
        assert_eq!(snapshot.get(&"pod1".into()), Some(""));
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_duplicate_entity_rejected() {
        let result = parse_snapshot("pod1 1\npod1 2\n");
        assert!(matches!(result, Err(TransportError::Malformed { .. })));
    }

    #[test]
    fn test_extra_field_rejected() {
        assert!(parse_snapshot("pod1 1 2\n").is_err());
    }

    #[test]
    fn test_empty_output_is_empty_snapshot() {
        assert!(parse_snapshot("").expect("parse").is_empty());
    }
}
