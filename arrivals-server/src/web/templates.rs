//! Askama templates for the web frontend.

use askama::Template;

use crate::arrivals::PredictionRecord;
use crate::mbta::StopResource;
use crate::snapshot::Snapshot;

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Arrivals board.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub current_time: String,
    pub timezone: String,
    pub inbound: Vec<TrainView>,
    pub outbound: Vec<TrainView>,
}

impl IndexTemplate {
    /// Create from the current snapshot.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let views = |records: &[PredictionRecord]| -> Vec<TrainView> {
            records
                .iter()
                .map(|r| TrainView::from_record(r, snapshot))
                .collect()
        };

        Self {
            current_time: snapshot.current_time.clone(),
            timezone: snapshot.timezone_name().to_string(),
            inbound: views(&snapshot.inbound),
            outbound: views(&snapshot.outbound),
        }
    }

    /// Whether no refresh has succeeded yet.
    pub fn is_stale(&self) -> bool {
        self.current_time.is_empty()
    }
}

/// Stops on the configured route.
#[derive(Template)]
#[template(path = "stops.html")]
pub struct StopsTemplate {
    pub route: String,
    pub stops: Vec<StopView>,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Train view model for templates.
#[derive(Debug, Clone)]
pub struct TrainView {
    pub time: String,
    pub minutes_away: i64,
    pub destination: String,
    pub status: String,
}

impl TrainView {
    /// Create from a record.
    pub fn from_record(record: &PredictionRecord, snapshot: &Snapshot) -> Self {
        Self {
            time: snapshot.display_time(record),
            minutes_away: record.minutes_away,
            destination: record.destination.clone(),
            status: record.status.clone(),
        }
    }

    /// Countdown text, e.g. "Now", "1 min", "7 mins".
    pub fn countdown(&self) -> String {
        match self.minutes_away {
            0 => "Now".to_string(),
            1 => "1 min".to_string(),
            n => format!("{n} mins"),
        }
    }

    /// Whether to show the upstream status; "Unknown" is noise.
    pub fn has_status(&self) -> bool {
        self.status != "Unknown"
    }
}

/// Stop view model for templates.
#[derive(Debug, Clone)]
pub struct StopView {
    pub id: String,
    pub name: String,
    pub municipality: Option<String>,
}

impl StopView {
    /// Create from an API stop resource. Unnamed stops fall back to their id.
    pub fn from_resource(stop: &StopResource) -> Self {
        Self {
            id: stop.id.clone(),
            name: stop
                .attributes
                .name
                .clone()
                .unwrap_or_else(|| stop.id.clone()),
            municipality: stop.attributes.municipality.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use chrono_tz::America::New_York;

    use crate::arrivals::{Arrivals, Direction};

    fn view(minutes_away: i64) -> TrainView {
        TrainView {
            time: "08:05 AM".to_string(),
            minutes_away,
            destination: "Ashmont".to_string(),
            status: "Unknown".to_string(),
        }
    }

    #[test]
    fn countdown_text() {
        assert_eq!(view(0).countdown(), "Now");
        assert_eq!(view(1).countdown(), "1 min");
        assert_eq!(view(12).countdown(), "12 mins");
        assert!(!view(3).has_status());
    }

    #[test]
    fn index_renders_trains_and_empty_direction() {
        let record = PredictionRecord {
            id: "p-1".to_string(),
            destination: "Alewife".to_string(),
            direction: Direction::Inbound,
            arrival_time: DateTime::parse_from_rfc3339("2024-03-15T12:05:00Z").unwrap(),
            minutes_away: 5,
            status: "Approaching".to_string(),
        };
        let arrivals = Arrivals {
            inbound: vec![record],
            ..Arrivals::default()
        };
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let snapshot = Snapshot::from_arrivals(arrivals, now, New_York);

        let html = IndexTemplate::from_snapshot(&snapshot).render().unwrap();

        assert!(html.contains("Alewife"));
        assert!(html.contains("08:05 AM"));
        assert!(html.contains("5 mins"));
        assert!(html.contains("Approaching"));
        assert!(html.contains("No upcoming outbound trains"));
    }

    #[test]
    fn index_renders_before_first_refresh() {
        let template = IndexTemplate::from_snapshot(&Snapshot::empty(New_York));
        assert!(template.is_stale());

        let html = template.render().unwrap();
        assert!(html.contains("Waiting for the first update"));
    }

    #[test]
    fn stops_render_names() {
        let stops: Vec<StopResource> = serde_json::from_value(serde_json::json!([
            { "id": "place-alfcl", "attributes": { "name": "Alewife", "municipality": "Cambridge" } },
            { "id": "place-xxxx", "attributes": {} }
        ]))
        .unwrap();

        let template = StopsTemplate {
            route: "Red".to_string(),
            stops: stops.iter().map(StopView::from_resource).collect(),
        };
        let html = template.render().unwrap();

        assert!(html.contains("Alewife"));
        assert!(html.contains("Cambridge"));
        assert!(html.contains("place-xxxx"));
    }
}
