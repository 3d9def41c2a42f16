use crate::error::{CoreError, CoreResult, EntityClass};
use crate::model::{TimelineEvent, NOT_SPECIFIED};
use crate::normalize::{add_days, normalize_date};
use crate::reconcile::fields;
use serde_json::Value;
use tracing::warn;

/// Days before the event implied by a notice phrase; 30 when nothing recognizable is stated.
pub fn notice_offset_days(notice_text: &str) -> i64 {
    let t = notice_text.to_lowercase();
    if t.contains("6 months") || t.contains("six months") || t.contains("180 days") {
        180
    } else if t.contains("3 months") || t.contains("three months") || t.contains("90 days") {
        90
    } else if t.contains("60 days") || t.contains("sixty days") {
        60
    } else {
        30
    }
}

fn notice_required(raw: &Value) -> (bool, String) {
    match raw.get("notice_required") {
        Some(Value::Bool(b)) => (*b, String::new()),
        Some(Value::String(s)) => (s.to_lowercase().contains("yes"), s.clone()),
        _ => (false, String::new()),
    }
}

fn default_priority(event_type: &str) -> &'static str {
    match event_type {
        "deadline" | "termination" | "renewal" | "payment" | "delivery" => "high",
        _ => "medium",
    }
}

fn consequences(event_type: &str) -> &'static str {
    match event_type {
        "deadline" => "Non-compliance may result in breach of contract",
        "payment" => "Payment obligation must be fulfilled",
        "renewal" => "Contract automatically renews unless notice given",
        "termination" => "Contract may be terminated if notice requirements met",
        _ => "As per contract terms",
    }
}

/// `as_of` is the analysis date (`YYYY-MM-DD`) used to decide completion.
pub fn reconcile_timeline(raw: &[Value], as_of: &str) -> CoreResult<Vec<TimelineEvent>> {
    let mut events = Vec::new();
    for candidate in raw {
        let Some(event) = fields::text(candidate, "event") else {
            warn!("timeline entry without an event description skipped");
            continue;
        };
        // Entries must carry a date field; conditional ones ("upon termination") keep the sentinel.
        if candidate.get("date").is_none() {
            warn!(%event, "timeline entry without a date field skipped");
            continue;
        }
        let date = fields::text(candidate, "date").and_then(|d| normalize_date(&d));
        let event_type = fields::text(candidate, "type")
            .map(|t| t.to_lowercase())
            .unwrap_or_else(|| "milestone".to_string());
        let (notice_required, notice_text) = notice_required(candidate);

        let notice_deadline = match fields::text(candidate, "notice_deadline") {
            Some(d) => normalize_date(&d).unwrap_or(d),
            None if notice_required => date
                .as_deref()
                .and_then(|d| add_days(d, -notice_offset_days(&notice_text)))
                .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            None => NOT_SPECIFIED.to_string(),
        };

        let completed = fields::boolean(candidate, "completed").unwrap_or_else(|| {
            date.as_deref().map(|d| d < as_of).unwrap_or(false)
        });

        let priority = fields::text(candidate, "priority")
            .map(|p| p.to_lowercase())
            .unwrap_or_else(|| default_priority(&event_type).to_string());

        events.push(TimelineEvent {
            id: format!("event_{}", events.len() + 1),
            date: date.unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            event,
            consequences: consequences(&event_type).to_string(),
            event_type,
            responsible_party: fields::text(candidate, "responsible_party")
                .unwrap_or_else(|| "Both parties".to_string()),
            notice_required,
            notice_deadline,
            priority,
            completed,
        });
    }

    if events.is_empty() {
        return Err(CoreError::reconciliation(
            EntityClass::Timeline,
            "no timeline events identified",
        ));
    }
    if !events.iter().any(|e| e.date != NOT_SPECIFIED) {
        return Err(CoreError::reconciliation(
            EntityClass::Timeline,
            "no timeline event carries a valid calendar date",
        ));
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn notice_deadline_is_derived_from_notice_text() {
        let raw = vec![json!({
            "date": "December 31, 2025",
            "event": "Renewal window closes",
            "type": "Renewal",
            "notice_required": "Yes - 6 months written notice"
        })];
        let events = reconcile_timeline(&raw, "2024-06-01").unwrap();
        let e = &events[0];
        assert_eq!(e.date, "2025-12-31");
        assert!(e.notice_required);
        assert_eq!(e.notice_deadline, "2025-07-04");
        assert_eq!(e.priority, "high");
        assert!(!e.completed);
        assert_eq!(e.consequences, "Contract automatically renews unless notice given");
    }

    #[test]
    fn completion_follows_analysis_date_unless_given() {
        let raw = vec![
            json!({"date": "2024-01-10", "event": "Initial delivery", "type": "delivery"}),
            json!({"date": "2024-01-10", "event": "Kickoff", "completed": false}),
        ];
        let events = reconcile_timeline(&raw, "2024-06-01").unwrap();
        assert!(events[0].completed);
        assert!(!events[1].completed);
        assert_eq!(events[1].event_type, "milestone");
        assert_eq!(events[1].priority, "medium");
    }

    #[test]
    fn conditional_events_keep_sentinel_date() {
        let raw = vec![
            json!({"date": "2024-03-01", "event": "Effective date"}),
            json!({"date": "Upon termination", "event": "Return of materials"}),
        ];
        let events = reconcile_timeline(&raw, "2024-06-01").unwrap();
        assert_eq!(events[1].date, NOT_SPECIFIED);
        assert!(!events[1].completed);
    }

    #[test]
    fn no_dated_events_fails() {
        let raw = vec![json!({"date": "Not specified", "event": "Ongoing reporting"})];
        assert!(matches!(
            reconcile_timeline(&raw, "2024-06-01"),
            Err(CoreError::Reconciliation { entity: EntityClass::Timeline, .. })
        ));
        assert!(reconcile_timeline(&[], "2024-06-01").is_err());
    }
}
