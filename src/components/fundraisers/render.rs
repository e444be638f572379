use super::engine::Summary;
use super::models::{ClassifiedEvent, ViewQuery};
use crate::components::school_events::{fmt_date_only, SchoolEvent};
use rust_i18n::t;
use std::fmt::Write;

fn meta(item: &ClassifiedEvent) -> String {
    [item.event.location.as_str(), item.event.notes.as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" • ")
}

/// Line shown under "Next Up" for the school calendar.
///
/// `None` when the school feed could not be loaded at all.
pub fn school_line(events: Option<&[SchoolEvent]>, next: Option<&SchoolEvent>) -> Option<String> {
    events?;
    Some(match next {
        Some(event) => t!(
            "next_school_event",
            title = event.title.as_str(),
            date = fmt_date_only(event.date)
        )
        .to_string(),
        None => t!("no_school_events").to_string(),
    })
}

/// Render the home summary followed by the fundraiser listing
pub fn render_board(
    summary: &Summary,
    listing: &[ClassifiedEvent],
    view: &ViewQuery,
    school: Option<&str>,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", t!("happening_now"));
    if summary.happening_now.is_empty() {
        let _ = writeln!(out, "  * {}", t!("nothing_live"));
        let _ = writeln!(out, "    {}", t!("nothing_live_hint"));
    } else {
        for item in &summary.happening_now {
            let _ = writeln!(out, "  * {} [{}] ({})", item.event.title, t!("live_now"), item.relative);
            let _ = writeln!(out, "    {} • {}", item.range, meta(item));
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", t!("next_up"));
    match &summary.next_up {
        Some(item) => {
            let _ = writeln!(out, "  * {} [{}] ({})", item.event.title, item.range, item.relative);
            let details = meta(item);
            if !details.is_empty() {
                let _ = writeln!(out, "    {}", details);
            }
        }
        None => {
            let _ = writeln!(out, "  * {} [TBD]", t!("no_upcoming"));
        }
    }
    if let Some(line) = school {
        let _ = writeln!(out, "  {}", line);
    }

    let _ = writeln!(out);
    let query = view.to_query_string();
    if query.is_empty() {
        let _ = writeln!(out, "{}", t!("fundraisers_heading"));
    } else {
        let _ = writeln!(out, "{} ?{}", t!("fundraisers_heading"), query);
    }
    if listing.is_empty() {
        let _ = writeln!(out, "  {}", t!("no_matches"));
    }
    for item in listing {
        let _ = writeln!(
            out,
            "  {:<7} {:<8} {} | {} | {} | {}",
            item.id, item.status, item.event.title, item.range, item.relative, item.event.location
        );
    }

    out
}
