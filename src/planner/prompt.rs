use crate::trip::ItineraryRecord;

pub(crate) const PLANNER_SYSTEM_PROMPT: &str = r#"You are a STRICT JSON travel coordinator that converts a traveller's free-text request into a structured multi-city itinerary.

FIELDS
1. "origin": the city the trip starts from and returns to.
2. "destinations": every city the traveller wants to visit, in visiting order.
3. "durations": nights to spend in each destination, one integer per destination. Use 3 when a stay length is not mentioned.
4. "start_window": the departure timeframe as written by the traveller (e.g. "June 2026"). Use "Flexible" when none is given.
5. "budget": total budget for the whole trip in USD as a number. Use 2500.0 when none is given.

OUTPUT FORMAT (STRICT JSON ONLY)
- Return exactly one JSON object.
- No prose, no markdown, no comments, no trailing text.
- JSON must match this shape:

{"origin":"London","destinations":["Tokyo","Osaka"],"durations":[4,2],"start_window":"June 2026","budget":4000.0}

ADDITIONAL CONSTRAINTS
- `destinations` MUST contain at least one city.
- `durations` MUST have the same length as `destinations`.
- `budget` MUST be a number (not a string).
"#;

/// User turn for the planner. On a replanning cycle the previous total is
/// included so the generator can trim stays or stops.
pub(crate) fn planner_user_content(record: &ItineraryRecord, replanning: bool) -> String {
    let mut content = format!("User Request: {}", record.request().trim());
    if replanning {
        content.push_str(&format!(
            "\n\nThe previous itinerary ({}) cost ${:.2}, which exceeds the budget of ${:.2}. \
             Produce a cheaper itinerary: shorten stays or drop destinations, \
             but keep the traveller's stated budget unchanged.",
            record.destinations.join(" -> "),
            record.total_cost,
            record.budget
        ));
    }
    content
}
