// Server-sent events framing used by streamable HTTP responses

use crate::protocol::JsonRpcResponse;

/// Split an SSE body into event payloads.
///
/// Only `data:` fields matter; multi-line data within one event is joined with
/// `\n`, comments and other fields are skipped.
pub fn decode_events(body: &str) -> Vec<String> {
    let mut events = Vec::new();
    let mut data_lines: Vec<&str> = Vec::new();

    for line in body.split('\n') {
        let line = line.trim_end_matches('\r');

        if line.is_empty() {
            if !data_lines.is_empty() {
                events.push(data_lines.join("\n"));
                data_lines.clear();
            }
            continue;
        }

        if line.starts_with(':') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }

    if !data_lines.is_empty() {
        events.push(data_lines.join("\n"));
    }

    events
}

/// Pick the JSON-RPC response out of an SSE stream body.
///
/// Servers may interleave notifications before the response; the first event
/// carrying `result` or `error` wins. Returns `None` if no event parses as one.
pub fn find_response(body: &str) -> Option<serde_json::Value> {
    decode_events(body)
        .iter()
        .filter_map(|data| serde_json::from_str::<serde_json::Value>(data).ok())
        .find(JsonRpcResponse::is_response)
}
