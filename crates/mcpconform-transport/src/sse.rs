//! Minimal SSE decoding for Streamable HTTP response bodies
//!
//! Only `data:` lines matter. Each blank-line-delimited event yields its data
//! lines joined with `\n`. Events without data (retry/priming events,
//! comments) produce nothing.

pub fn decode_events(body: &str) -> Vec<String> {
    let mut events = Vec::new();
    let mut data_lines: Vec<&str> = Vec::new();

    for line in body.split('\n') {
        let line = line.trim_end_matches('\r');

        if line.is_empty() {
            flush(&mut data_lines, &mut events);
            continue;
        }
        if line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    flush(&mut data_lines, &mut events);

    events
}

fn flush(data_lines: &mut Vec<&str>, events: &mut Vec<String>) {
    if data_lines.is_empty() {
        return;
    }
    let data = data_lines.join("\n");
    data_lines.clear();
    if !data.trim().is_empty() {
        events.push(data);
    }
}
