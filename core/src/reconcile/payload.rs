use crate::error::{CoreError, CoreResult};
use crate::model::NOT_SPECIFIED;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// What the repair pass had to change to make the payload parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairReport {
    pub nulls_rewritten: usize,
    pub truncated: bool,
    pub string_closed: bool,
    pub dangling_commas_removed: usize,
    pub value_filled: bool,
    /// Closers appended at end of input, in emission order.
    pub closers_appended: String,
}

impl RepairReport {
    pub fn changed(&self) -> bool {
        self.nulls_rewritten > 0
            || self.truncated
            || self.string_closed
            || self.dangling_commas_removed > 0
            || self.value_filled
    }
}

/// Locate the JSON object in a raw model response.
///
/// Order: fenced block (an unclosed fence runs to end of input), then the span from the first
/// `{` to the last `}` (or to end of input when no `}` follows).
pub fn extract_json_payload(raw: &str) -> CoreResult<&str> {
    if let Some(body) = fenced_block(raw) {
        if body.trim_start().starts_with('{') {
            return Ok(body.trim());
        }
    }
    let start = raw
        .find('{')
        .ok_or_else(|| CoreError::Parse("no JSON object found in AI response".to_string()))?;
    let end = match raw.rfind('}') {
        Some(e) if e > start => e + 1,
        _ => raw.len(),
    };
    Ok(raw[start..end].trim())
}

fn fenced_block(raw: &str) -> Option<&str> {
    let lower = raw.to_ascii_lowercase();
    let (open, marker_len) = match lower.find("```json") {
        Some(i) => (i, "```json".len()),
        None => (lower.find("```")?, 3),
    };
    let body_start = open + marker_len;
    let rest = &raw[body_start..];
    match rest.find("```") {
        Some(close) => Some(&rest[..close]),
        None => Some(rest),
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    closer: char,
    // object frames only
    expecting_key: bool,
    after_key: bool,
}

impl Frame {
    fn is_object(&self) -> bool {
        self.closer == '}'
    }
}

fn strip_trailing_comma(out: &mut String) -> bool {
    let trimmed_len = out.trim_end().len();
    if out[..trimmed_len].ends_with(',') {
        out.truncate(trimmed_len - 1);
        true
    } else {
        false
    }
}

/// Rewrite bare `null` tokens to the sentinel and close any frames left open by truncation.
///
/// Single pass over the input tracking string/escape state and a LIFO stack of open
/// containers, so closers are emitted in the reverse order they were opened.
pub fn repair_json(payload: &str) -> (String, RepairReport) {
    let chars: Vec<char> = payload.chars().collect();
    let mut out = String::with_capacity(payload.len() + 16);
    let mut report = RepairReport::default();
    let mut stack: Vec<Frame> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut string_is_key = false;
    let sentinel = format!("\"{}\"", NOT_SPECIFIED);

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
                if string_is_key {
                    if let Some(top) = stack.last_mut() {
                        top.after_key = true;
                    }
                }
            }
            i += 1;
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                string_is_key = stack.last().map(|f| f.is_object() && f.expecting_key).unwrap_or(false);
                if string_is_key {
                    if let Some(top) = stack.last_mut() {
                        top.expecting_key = false;
                    }
                }
                out.push(c);
            }
            '{' | '[' => {
                stack.push(Frame {
                    closer: if c == '{' { '}' } else { ']' },
                    expecting_key: c == '{',
                    after_key: false,
                });
                out.push(c);
            }
            '}' | ']' => {
                if strip_trailing_comma(&mut out) {
                    report.dangling_commas_removed += 1;
                }
                if stack.last().map(|f| f.closer) == Some(c) {
                    stack.pop();
                }
                out.push(c);
            }
            ':' => {
                if let Some(top) = stack.last_mut() {
                    top.after_key = false;
                }
                out.push(c);
            }
            ',' => {
                if let Some(top) = stack.last_mut() {
                    if top.is_object() {
                        top.expecting_key = true;
                    }
                }
                out.push(c);
            }
            'n' if is_null_token(&chars, i) => {
                out.push_str(&sentinel);
                report.nulls_rewritten += 1;
                i += 4;
                continue;
            }
            _ => out.push(c),
        }
        i += 1;
    }

    if in_string {
        if escaped {
            out.pop();
        }
        out.push('"');
        report.string_closed = true;
        if string_is_key {
            if let Some(top) = stack.last_mut() {
                top.after_key = true;
            }
        }
    }

    if !stack.is_empty() {
        report.truncated = true;
        close_truncated(&mut out, &stack, &sentinel, &mut report);
    }

    (out, report)
}

fn is_null_token(chars: &[char], i: usize) -> bool {
    let word: String = chars.iter().skip(i).take(4).collect();
    if word != "null" {
        return false;
    }
    let before_ok = i == 0 || !chars[i - 1].is_alphanumeric();
    let after_ok = chars.get(i + 4).map(|c| !c.is_alphanumeric()).unwrap_or(true);
    before_ok && after_ok
}

fn close_truncated(out: &mut String, stack: &[Frame], sentinel: &str, report: &mut RepairReport) {
    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    while strip_trailing_comma(out) {
        report.dangling_commas_removed += 1;
        let l = out.trim_end().len();
        out.truncate(l);
    }

    // A half-written bare literal ("tru", "12.", "-") cannot be salvaged.
    let tail_start = out
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+'))
        .last()
        .map(|(i, _)| i);
    if let Some(start) = tail_start {
        let tail = &out[start..];
        let complete = matches!(tail, "true" | "false")
            || serde_json::from_str::<serde_json::Number>(tail).is_ok();
        if !complete {
            out.truncate(start);
            let l = out.trim_end().len();
            out.truncate(l);
        }
    }

    if let Some(top) = stack.last() {
        if top.is_object() && top.after_key {
            out.push_str(": ");
            out.push_str(sentinel);
            report.value_filled = true;
        } else if out.ends_with(':') {
            out.push(' ');
            out.push_str(sentinel);
            report.value_filled = true;
        } else if top.is_object() && out.ends_with('{') {
            // empty object, nothing to fill
        } else if out.ends_with(',') {
            out.pop();
        }
    }
    while strip_trailing_comma(out) {
        report.dangling_commas_removed += 1;
    }

    for frame in stack.iter().rev() {
        out.push(frame.closer);
        report.closers_appended.push(frame.closer);
    }
}

/// Extract, repair, and parse the model response into a JSON object.
pub fn parse_ai_payload(raw: &str) -> CoreResult<(Value, RepairReport)> {
    let payload = extract_json_payload(raw)?;
    let (repaired, report) = repair_json(payload);
    if report.changed() {
        warn!(
            nulls = report.nulls_rewritten,
            truncated = report.truncated,
            closers = %report.closers_appended,
            "repaired AI payload before parsing"
        );
    }
    let value: Value = serde_json::from_str(&repaired)
        .map_err(|e| CoreError::Parse(format!("AI payload not recoverable as JSON: {}", e)))?;
    if !value.is_object() {
        return Err(CoreError::Parse("AI payload is not a JSON object".to_string()));
    }
    debug!(bytes = repaired.len(), "parsed AI payload");
    Ok((value, report))
}
