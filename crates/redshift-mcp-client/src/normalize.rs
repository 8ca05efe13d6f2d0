//! Argument-name repair for known LLM naming drift.

use serde_json::{Map, Value};

/// One rename rule: for `tool`, move `alias` to `canonical` when the
/// canonical key is absent.
struct ArgRepair {
    tool: &'static str,
    alias: &'static str,
    canonical: &'static str,
}

/// Known repairs. Extend this table instead of branching in the dispatcher.
const REPAIRS: &[ArgRepair] = &[
    ArgRepair {
        tool: "get_table_schema",
        alias: "name",
        canonical: "table_name",
    },
    ArgRepair {
        tool: "query",
        alias: "query",
        canonical: "sql",
    },
    // Legacy compatibility path.
    ArgRepair {
        tool: "query",
        alias: "name",
        canonical: "table_name",
    },
];

/// Apply the repair table to `args` for `tool`.
///
/// A rename fires only when the alias key is present and the canonical
/// key is absent; everything else, including unrecognized extra keys,
/// passes through untouched. Applying twice yields the same result.
pub fn normalize(tool: &str, mut args: Map<String, Value>) -> Map<String, Value> {
    for repair in REPAIRS {
        if repair.tool != tool || args.contains_key(repair.canonical) {
            continue;
        }
        if let Some(value) = args.remove(repair.alias) {
            tracing::debug!(
                tool,
                alias = repair.alias,
                canonical = repair.canonical,
                "renamed tool argument"
            );
            args.insert(repair.canonical.to_string(), value);
        }
    }
    args
}
