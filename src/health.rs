//! Health alerts and impact guidance keyed off an AQI value.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Danger,
    Emergency,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub recommendations: Vec<String>,
    pub affected_groups: Vec<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pollutants: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthImpact {
    pub immediate_effects: Vec<String>,
    pub long_term_risks: Vec<String>,
    pub vulnerable_populations: Vec<String>,
    pub protective_measures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertMetadata {
    pub generated_at: DateTime<Utc>,
    pub alert_count: usize,
    pub highest_severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub alerts: Vec<Alert>,
    pub health_impact: HealthImpact,
    pub metadata: AlertMetadata,
}

/// Probability that a deteriorating-forecast alert is raised.
const FORECAST_ALERT_CHANCE: f64 = 0.4;
/// Probability that a wildfire smoke advisory is raised.
const SMOKE_ADVISORY_CHANCE: f64 = 0.2;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn alert_id(kind: &str, now: DateTime<Utc>) -> String {
    format!("{kind}-{}", now.timestamp_millis())
}

fn current_conditions_alert(aqi: u32, place: &str, now: DateTime<Utc>) -> Option<Alert> {
    let (kind, severity, title, description, recommendations, groups, pollutants) = if aqi > 150 {
        let emergency = aqi > 200;
        (
            "current",
            if emergency {
                Severity::Emergency
            } else {
                Severity::Danger
            },
            if emergency {
                "EMERGENCY: Hazardous Air Quality"
            } else {
                "Unhealthy Air Quality Alert"
            },
            format!("Current AQI of {aqi} poses health risks to all individuals"),
            strings(&[
                "Avoid all outdoor activities",
                "Keep windows and doors closed",
                "Use air purifiers if available",
                "Seek medical attention if experiencing symptoms",
            ]),
            strings(&["Everyone"]),
            strings(&["PM2.5", "PM10", "Ozone"]),
        )
    } else if aqi > 100 {
        (
            "moderate",
            Severity::Warning,
            "Air Quality Alert for Sensitive Groups",
            format!("AQI of {aqi} may cause health effects for sensitive individuals"),
            strings(&[
                "Sensitive groups should limit outdoor activities",
                "Consider moving exercise indoors",
                "Monitor air quality throughout the day",
            ]),
            strings(&[
                "Children",
                "Elderly",
                "People with respiratory conditions",
            ]),
            strings(&["PM2.5", "Ozone"]),
        )
    } else {
        return None;
    };

    Some(Alert {
        id: alert_id(kind, now),
        severity,
        title: title.to_string(),
        description,
        recommendations,
        affected_groups: groups,
        timestamp: now,
        expires_at: None,
        location: Some(place.to_string()),
        pollutants: Some(pollutants),
    })
}

fn deterioration_alert(place: &str, now: DateTime<Utc>) -> Alert {
    Alert {
        id: alert_id("forecast", now),
        severity: Severity::Warning,
        title: "Air Quality Expected to Deteriorate".to_string(),
        description: "Forecast models predict AQI will exceed 120 in the next 4 hours due to \
                      stagnant weather conditions"
            .to_string(),
        recommendations: strings(&[
            "Complete outdoor activities before conditions worsen",
            "Prepare indoor alternatives for planned activities",
            "Close windows and prepare air filtration systems",
        ]),
        affected_groups: strings(&["Sensitive groups", "Outdoor workers", "Athletes"]),
        timestamp: now,
        expires_at: Some(now + Duration::hours(8)),
        location: Some(place.to_string()),
        pollutants: None,
    }
}

fn smoke_advisory(now: DateTime<Utc>) -> Alert {
    Alert {
        id: alert_id("event", now),
        severity: Severity::Danger,
        title: "Wildfire Smoke Advisory".to_string(),
        description: "Smoke from regional wildfires is affecting local air quality".to_string(),
        recommendations: strings(&[
            "Stay indoors with windows closed",
            "Avoid outdoor exercise and activities",
            "Use air purifiers with HEPA filters",
            "Check on vulnerable family members and neighbors",
        ]),
        affected_groups: strings(&["Everyone", "Especially sensitive groups"]),
        timestamp: now,
        expires_at: Some(now + Duration::hours(24)),
        location: Some("Regional".to_string()),
        pollutants: Some(strings(&["PM2.5", "PM10", "Carbon Monoxide"])),
    }
}

fn ozone_advisory(now: DateTime<Utc>) -> Alert {
    Alert {
        id: alert_id("pollutant", now),
        severity: Severity::Info,
        title: "Elevated Ozone Levels".to_string(),
        description: "Ground-level ozone concentrations are elevated due to sunny, warm conditions"
            .to_string(),
        recommendations: strings(&[
            "Limit outdoor activities during peak sun hours (10 AM - 4 PM)",
            "Choose early morning or evening for outdoor exercise",
            "Stay hydrated and take frequent breaks if outdoors",
        ]),
        affected_groups: strings(&["People with asthma", "Children", "Outdoor workers"]),
        timestamp: now,
        expires_at: Some(now + Duration::hours(12)),
        location: None,
        pollutants: Some(strings(&["Ozone"])),
    }
}

/// Alerts for the current index plus the randomly raised forecast and
/// smoke advisories. `place` labels location-specific alerts.
pub fn generate_alerts<R: Rng + ?Sized>(
    rng: &mut R,
    aqi: u32,
    place: &str,
    now: DateTime<Utc>,
) -> Vec<Alert> {
    let mut alerts = Vec::new();
    alerts.extend(current_conditions_alert(aqi, place, now));

    if rng.gen_bool(FORECAST_ALERT_CHANCE) {
        alerts.push(deterioration_alert(place, now));
    }
    if rng.gen_bool(SMOKE_ADVISORY_CHANCE) {
        alerts.push(smoke_advisory(now));
    }
    if aqi > 80 {
        alerts.push(ozone_advisory(now));
    }
    alerts
}

pub fn assess_impact(aqi: u32) -> HealthImpact {
    let immediate_effects = match aqi {
        0..=50 => strings(&["None for healthy individuals"]),
        51..=100 => strings(&["Possible minor irritation for sensitive individuals"]),
        101..=150 => strings(&[
            "Eye irritation",
            "Throat irritation",
            "Coughing for sensitive groups",
        ]),
        151..=200 => strings(&[
            "Breathing difficulties",
            "Chest tightness",
            "Reduced lung function",
        ]),
        _ => strings(&[
            "Serious respiratory symptoms",
            "Cardiovascular stress",
            "Emergency medical attention may be needed",
        ]),
    };

    let long_term_risks = match aqi {
        0..=100 => strings(&["Minimal long-term health risks"]),
        101..=150 => strings(&[
            "Increased risk of respiratory infections",
            "Accelerated lung function decline",
        ]),
        _ => strings(&[
            "Cardiovascular disease",
            "Chronic respiratory conditions",
            "Premature mortality risk",
        ]),
    };

    let mut vulnerable_populations = strings(&["Children", "Elderly (65+)", "Pregnant women"]);
    if aqi > 50 {
        vulnerable_populations.extend(strings(&["People with asthma", "Heart disease patients"]));
    }
    if aqi > 100 {
        vulnerable_populations.extend(strings(&["Outdoor workers", "Athletes"]));
    }

    let mut protective_measures = strings(&["Monitor air quality regularly"]);
    if aqi > 50 {
        protective_measures.push("Limit prolonged outdoor exertion".to_string());
    }
    if aqi > 100 {
        protective_measures.extend(strings(&["Use air purifiers indoors", "Keep windows closed"]));
    }
    if aqi > 150 {
        protective_measures.extend(strings(&[
            "Wear N95 masks outdoors",
            "Avoid all outdoor activities",
        ]));
    }

    HealthImpact {
        immediate_effects,
        long_term_risks,
        vulnerable_populations,
        protective_measures,
    }
}

/// `Info` when there are no alerts.
pub fn highest_severity(alerts: &[Alert]) -> Severity {
    alerts
        .iter()
        .map(|a| a.severity)
        .max()
        .unwrap_or(Severity::Info)
}

/// Full `/health-alerts` body.
pub fn health_report<R: Rng + ?Sized>(
    rng: &mut R,
    aqi: u32,
    place: &str,
    now: DateTime<Utc>,
) -> HealthReport {
    let alerts = generate_alerts(rng, aqi, place, now);
    HealthReport {
        metadata: AlertMetadata {
            generated_at: now,
            alert_count: alerts.len(),
            highest_severity: highest_severity(&alerts),
        },
        alerts,
        health_impact: assess_impact(aqi),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn has(alerts: &[Alert], title: &str) -> bool {
        alerts.iter().any(|a| a.title == title)
    }

    #[test]
    fn test_current_alert_severity_bands() {
        let now = Utc::now();
        assert!(current_conditions_alert(100, "x", now).is_none());
        assert_eq!(
            current_conditions_alert(101, "x", now).unwrap().severity,
            Severity::Warning
        );
        assert_eq!(
            current_conditions_alert(151, "x", now).unwrap().severity,
            Severity::Danger
        );
        let worst = current_conditions_alert(201, "Boston", now).unwrap();
        assert_eq!(worst.severity, Severity::Emergency);
        assert_eq!(worst.location.as_deref(), Some("Boston"));
        assert!(worst.description.contains("201"));
    }

    #[test]
    fn test_ozone_advisory_above_80() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            assert!(has(
                &generate_alerts(&mut rng, 85, "x", Utc::now()),
                "Elevated Ozone Levels"
            ));
            assert!(!has(
                &generate_alerts(&mut rng, 80, "x", Utc::now()),
                "Elevated Ozone Levels"
            ));
        }
    }

    #[test]
    fn test_random_alerts_appear_at_roughly_their_rates() {
        let mut rng = StdRng::seed_from_u64(42);
        let runs = 2000;
        let (mut forecast, mut smoke) = (0, 0);
        for _ in 0..runs {
            let alerts = generate_alerts(&mut rng, 10, "x", Utc::now());
            forecast += has(&alerts, "Air Quality Expected to Deteriorate") as usize;
            smoke += has(&alerts, "Wildfire Smoke Advisory") as usize;
        }
        let rate = |n: usize| n as f64 / runs as f64;
        assert!((rate(forecast) - FORECAST_ALERT_CHANCE).abs() < 0.05);
        assert!((rate(smoke) - SMOKE_ADVISORY_CHANCE).abs() < 0.05);
    }

    #[test]
    fn test_impact_grows_with_aqi() {
        let clean = assess_impact(30);
        assert_eq!(clean.immediate_effects, vec!["None for healthy individuals"]);
        assert_eq!(clean.vulnerable_populations.len(), 3);
        assert_eq!(clean.protective_measures.len(), 1);

        let bad = assess_impact(180);
        assert_eq!(bad.long_term_risks.len(), 3);
        assert_eq!(bad.vulnerable_populations.len(), 7);
        assert_eq!(bad.protective_measures.len(), 6);
        assert!(bad.protective_measures.contains(&"Wear N95 masks outdoors".to_string()));
    }

    #[test]
    fn test_report_metadata_tracks_highest_severity() {
        let mut rng = StdRng::seed_from_u64(7);
        let report = health_report(&mut rng, 250, "x", Utc::now());
        assert_eq!(report.metadata.highest_severity, Severity::Emergency);
        assert_eq!(report.metadata.alert_count, report.alerts.len());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["metadata"]["highestSeverity"], "emergency");
        assert!(json["healthImpact"]["immediateEffects"].is_array());
        assert!(json["alerts"][0]["affectedGroups"].is_array());
    }

    #[test]
    fn test_no_alerts_means_info() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Danger < Severity::Emergency);
        assert_eq!(highest_severity(&[]), Severity::Info);
    }
}
