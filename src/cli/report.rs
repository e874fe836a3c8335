use std::fmt::Write;

use colored::*;

use crate::trip::{ItineraryRecord, TripStatus};

const RULE_WIDTH: usize = 50;
const ACTIVITIES_SHOWN: usize = 3;

/// `$1,234.50` style amount.
pub(crate) fn money(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

pub(crate) fn render_itinerary(record: &ItineraryRecord) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "\n{rule}");
    let _ = writeln!(out, "{}", "🌍 YOUR NOMADIC ITINERARY IS READY!".bold().green());
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Origin: {}", record.origin);
    let _ = writeln!(out, "Destinations: {}", record.destinations.join(" -> "));
    let _ = writeln!(
        out,
        "Total Cost: {} (Budget: {})",
        money(record.total_cost).bold(),
        money(record.budget)
    );
    let _ = writeln!(out, "{}", budget_verdict(record.total_cost, record.budget));
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));

    let _ = writeln!(out, "\n{}", "✈️ FLIGHT DETAILS".bold());
    let _ = writeln!(out, "Details: {}", record.flight_info.summary);
    for leg in &record.flight_info.legs {
        let _ = writeln!(
            out,
            "  - {} to {} on {} ({})",
            leg.from, leg.to, leg.date, leg.carrier
        );
    }

    let _ = writeln!(out, "\n{}", "🏨 ACCOMMODATIONS".bold());
    for stay in &record.hotel_info {
        let _ = writeln!(out, "📍 {}:", stay.location.cyan());
        let _ = writeln!(out, "   {}", stay.description.trim_end());
    }

    let _ = writeln!(out, "\n{}", "🎡 ACTIVITIES".bold());
    for group in &record.activity_info {
        let _ = writeln!(out, "📍 {}:", group.location.cyan());
        for activity in group.activities.iter().take(ACTIVITIES_SHOWN) {
            let _ = writeln!(
                out,
                "  - {}: {} ({})",
                activity.name, activity.description, activity.cost
            );
        }
    }

    let notes = record.messages();
    if !notes.is_empty() {
        let _ = writeln!(out, "\n{}", "📝 NOTES".bold());
        for note in notes {
            let _ = writeln!(out, "  [cycle {}] {}: {}", note.cycle, note.stage, note.text);
        }
    }

    let _ = writeln!(out, "{rule}");
    out
}

/// Remaining money when the trip fits, the overage when it does not.
pub(crate) fn budget_verdict(total: f64, budget: f64) -> String {
    if total <= budget {
        format!(
            "{} You are within budget! You have {} left over for souvenirs.",
            "✅".green(),
            money(budget - total)
        )
    } else {
        format!("{} You are over budget by {}.", "❌".red(), money(total - budget))
    }
}

/// One explanatory line per non-success terminal status.
pub(crate) fn render_failure(record: &ItineraryRecord) -> String {
    let detail = record
        .last_message()
        .map(|note| format!("\n   {} (stage: {}, cycle {})", note.text, note.stage, note.cycle))
        .unwrap_or_default();

    match record.status {
        TripStatus::BudgetUnreachable => format!(
            "{} Sorry, we couldn't find a trip that fits your budget of {} after {} attempts. Try adjusting your request!{detail}",
            "❌".red(),
            money(record.budget),
            record.cycle
        ),
        TripStatus::Cancelled => format!("{} Planning cancelled.", "⚠️".yellow()),
        TripStatus::Error => format!("{} Trip planning failed.{detail}", "❌".red()),
        other => format!(
            "{} Planning stopped unexpectedly with status {other}.{detail}",
            "❌".red()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::{
        Activity, ActivityGroup, FlightInfo, FlightLeg, HotelStay, StageKind, TripDelta,
    };

    fn plain() {
        colored::control::set_override(false);
    }

    fn activity(name: &str) -> Activity {
        Activity {
            name: name.to_string(),
            description: "worth it".to_string(),
            cost: "Free".to_string(),
            vibe: "Relaxing".to_string(),
            url: "N/A".to_string(),
        }
    }

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(3250.0), "$3,250.00");
        assert_eq!(money(0.5), "$0.50");
        assert_eq!(money(1234567.891), "$1,234,567.89");
        assert_eq!(money(-20.0), "-$20.00");
    }

    #[test]
    fn itinerary_report_lists_every_section() {
        plain();
        let mut record = ItineraryRecord::new("Tokyo");
        record.origin = "London".to_string();
        record.destinations = vec!["Tokyo".to_string(), "Osaka".to_string()];
        record.budget = 8000.0;
        record.total_cost = 3250.0;
        record.flight_info = FlightInfo {
            price: 2000.0,
            summary: "Direct".to_string(),
            legs: vec![FlightLeg {
                from: "London".to_string(),
                to: "Tokyo".to_string(),
                date: "2026-06-01".to_string(),
                carrier: "BA".to_string(),
                nights: 4,
            }],
        };
        record.hotel_info = vec![HotelStay {
            location: "Tokyo".to_string(),
            price: 1200.0,
            description: "Loft near Shibuya".to_string(),
        }];
        record.activity_info = vec![ActivityGroup {
            location: "Tokyo".to_string(),
            cost: 50.0,
            activities: ["A", "B", "C", "D"].iter().map(|name| activity(name)).collect(),
        }];

        let report = render_itinerary(&record);

        assert!(report.contains("Destinations: Tokyo -> Osaka"));
        assert!(report.contains("Total Cost: $3,250.00 (Budget: $8,000.00)"));
        assert!(report.contains("  - London to Tokyo on 2026-06-01 (BA)"));
        assert!(report.contains("   Loft near Shibuya"));
        assert!(report.contains("  - C: worth it (Free)"));
        assert!(!report.contains("  - D:"));
        assert!(report.contains("You have $4,750.00 left over"));
        assert!(!report.contains("NOTES"));
    }

    #[test]
    fn verdict_reports_remaining_or_overage() {
        plain();
        assert!(budget_verdict(3250.0, 3250.0).contains("You have $0.00 left over"));
        assert!(budget_verdict(2050.0, 500.0).contains("over budget by $1,550.00"));
    }

    #[test]
    fn diagnostics_are_listed_under_the_report() {
        plain();
        let mut record = ItineraryRecord::new("Tokyo and Osaka");
        record.cycle = 1;
        record.apply(
            TripDelta::default().with_message(StageKind::Activities, "Osaka lookup failed"),
        );

        let report = render_itinerary(&record);

        assert!(report.contains("NOTES"));
        assert!(report.contains("  [cycle 1] activities: Osaka lookup failed"));
    }

    #[test]
    fn failure_messages_are_distinct() {
        plain();
        let mut record = ItineraryRecord::new("Tokyo");
        record.budget = 500.0;
        record.cycle = 3;

        record.status = TripStatus::BudgetUnreachable;
        let unreachable = render_failure(&record);
        assert!(unreachable.contains("couldn't find a trip that fits your budget of $500.00"));

        record.apply(TripDelta::failed(StageKind::Flights, "No flights found"));
        let error = render_failure(&record);
        assert!(error.contains("Trip planning failed."));
        assert!(error.contains("No flights found (stage: flights, cycle 3)"));

        record.status = TripStatus::Cancelled;
        assert!(render_failure(&record).contains("Planning cancelled."));

        assert_ne!(unreachable, error);
    }
}
