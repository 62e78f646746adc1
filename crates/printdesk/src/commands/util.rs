//! Shared helpers for command handlers.

use std::path::Path;

use printdesk_core::{Backend, Query, ResourceStore};

use crate::cli::{BodyArgs, EndpointArgs};
use crate::error::CliError;

/// Parse repeated `key=value` flags into an ordered query.
pub fn parse_query(pairs: &[String]) -> Result<Option<Query>, CliError> {
    if pairs.is_empty() {
        return Ok(None);
    }
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .ok_or_else(|| CliError::Validation {
                    field: "query".into(),
                    reason: format!("expected KEY=VALUE, got '{pair}'"),
                })
        })
        .collect::<Result<Query, _>>()
        .map(Some)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// The JSON body of a create/update command.
pub fn read_body(args: &BodyArgs) -> Result<serde_json::Value, CliError> {
    match (&args.data, &args.from_file) {
        (Some(inline), _) => serde_json::from_str(inline).map_err(|e| CliError::Validation {
            field: "data".into(),
            reason: format!("invalid JSON: {e}"),
        }),
        (None, Some(path)) => read_json_file(path),
        (None, None) => Err(CliError::Validation {
            field: "body".into(),
            reason: "pass --data or --from-file".into(),
        }),
    }
}

/// Store for the endpoint, on the main API or the print service.
pub fn store_for(backend: &Backend, endpoint: &EndpointArgs) -> ResourceStore<serde_json::Value> {
    if endpoint.print {
        backend.print_resource(&endpoint.path)
    } else {
        backend.resource(&endpoint.path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_keep_order() {
        let query = parse_query(&["site=main".into(), "active=true".into(), "q=a=b".into()])
            .unwrap()
            .unwrap();
        let pairs: Vec<(&str, &str)> = query.iter().collect();
        assert_eq!(pairs, vec![("site", "main"), ("active", "true"), ("q", "a=b")]);
    }

    #[test]
    fn empty_query_is_none() {
        assert!(parse_query(&[]).unwrap().is_none());
    }

    #[test]
    fn malformed_pair_is_rejected() {
        assert!(matches!(
            parse_query(&["=oops".into()]),
            Err(CliError::Validation { .. })
        ));
        assert!(parse_query(&["noequals".into()]).is_err());
    }
}
