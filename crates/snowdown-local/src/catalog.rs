//! The festival's static event list.
//!
//! Authored independently of the schedule PDF; titles double as search anchors
//! into the PDF text, so keep them verbatim with the printed program.

use snowdown_core::{Category, Coordinates, Event, ALL_WEEK};
use std::sync::OnceLock;

struct Row {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    date: &'static str,
    time: &'static str,
    location: &'static str,
    category: Category,
    lat: f64,
    lng: f64,
    cost: Option<&'static str>,
    age_restriction: Option<&'static str>,
}

const ROWS: &[Row] = &[
    Row {
        id: "1",
        title: "Ski Joring Championship",
        description: "Watch horses pull skiers through downtown at breakneck speeds in this uniquely Colorado tradition.",
        date: "2026-01-22",
        time: "2:00 PM",
        location: "Main Street",
        category: Category::Competition,
        lat: 37.2753,
        lng: -107.8801,
        cost: None,
        age_restriction: None,
    },
    Row {
        id: "2",
        title: "Snowshoe Race",
        description: "Test your endurance in our annual snowshoe race through historic trails.",
        date: "2026-01-23",
        time: "10:00 AM",
        location: "Animas River Trail",
        category: Category::Competition,
        lat: 37.2785,
        lng: -107.8800,
        cost: None,
        age_restriction: None,
    },
    Row {
        id: "3",
        title: "Ice Sculpture Contest",
        description: "Artists transform blocks of ice into stunning works of art celebrating Colorado heritage.",
        date: "2026-01-23",
        time: "9:00 AM",
        location: "Town Plaza",
        category: Category::Competition,
        lat: 37.2749,
        lng: -107.8820,
        cost: None,
        age_restriction: None,
    },
    Row {
        id: "4",
        title: "Hot Wing Eating Challenge",
        description: "Can you handle the heat? Compete for the title of wing champion.",
        date: "2026-01-24",
        time: "6:00 PM",
        location: "Steamworks Brewing",
        category: Category::Competition,
        lat: 37.2756,
        lng: -107.8807,
        cost: None,
        age_restriction: None,
    },
    Row {
        id: "5",
        title: "Snow Sculpture Showdown",
        description: "Teams compete to build the most impressive snow sculptures.",
        date: "2026-01-25",
        time: "11:00 AM",
        location: "Rotary Park",
        category: Category::Competition,
        lat: 37.2720,
        lng: -107.8795,
        cost: None,
        age_restriction: None,
    },
    Row {
        id: "6",
        title: "Cardboard Sled Derby",
        description: "Build a sled from cardboard and race down the hill! Creativity counts.",
        date: "2026-01-25",
        time: "1:00 PM",
        location: "Chapman Hill",
        category: Category::Competition,
        lat: 37.2695,
        lng: -107.8760,
        cost: None,
        age_restriction: None,
    },
    Row {
        id: "7",
        title: "Beard & Stache Contest",
        description: "Show off your finest facial hair in true frontier fashion.",
        date: "2026-01-26",
        time: "3:00 PM",
        location: "El Rancho Tavern",
        category: Category::Competition,
        lat: 37.2761,
        lng: -107.8815,
        cost: None,
        age_restriction: None,
    },
    Row {
        id: "8",
        title: "Polar Plunge",
        description: "Take a dip in the icy Animas River for charity. Not for the faint of heart!",
        date: "2026-01-26",
        time: "12:00 PM",
        location: "Santa Rita Park",
        category: Category::Competition,
        lat: 37.2790,
        lng: -107.8785,
        cost: None,
        age_restriction: None,
    },
];

static EVENTS: OnceLock<Vec<Event>> = OnceLock::new();

/// Every event, in catalog order.
pub fn events() -> &'static [Event] {
    EVENTS.get_or_init(|| {
        ROWS.iter()
            .map(|r| Event {
                id: r.id.to_string(),
                title: r.title.to_string(),
                description: r.description.to_string(),
                date: r.date.to_string(),
                time: r.time.to_string(),
                location: r.location.to_string(),
                category: r.category,
                coordinates: Coordinates {
                    lat: r.lat,
                    lng: r.lng,
                },
                cost: r.cost.map(str::to_string),
                age_restriction: r.age_restriction.map(str::to_string),
                image: None,
            })
            .collect()
    })
}

pub fn titles() -> impl Iterator<Item = &'static str> {
    events().iter().map(|e| e.title.as_str())
}

pub fn find_by_id(id: &str) -> Option<&'static Event> {
    events().iter().find(|e| e.id == id)
}

pub fn find_by_title(title: &str) -> Option<&'static Event> {
    events().iter().find(|e| e.title == title)
}

/// Id first, then exact title, then case-insensitive title.
pub fn find(id_or_title: &str) -> Option<&'static Event> {
    let q = id_or_title.trim();
    find_by_id(q)
        .or_else(|| find_by_title(q))
        .or_else(|| events().iter().find(|e| e.title.eq_ignore_ascii_case(q)))
}

/// Case-insensitive substring search over title, location and short description.
/// A blank query matches nothing.
pub fn search(query: &str) -> Vec<&'static Event> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return Vec::new();
    }
    events()
        .iter()
        .filter(|e| {
            e.title.to_lowercase().contains(&q)
                || e.location.to_lowercase().contains(&q)
                || e.description.to_lowercase().contains(&q)
        })
        .collect()
}

pub fn on_date(date: &str) -> Vec<&'static Event> {
    events().iter().filter(|e| e.date == date).collect()
}

pub fn by_category(category: Category) -> Vec<&'static Event> {
    events().iter().filter(|e| e.category == category).collect()
}

/// Sort key for schedule dates: [`ALL_WEEK`] before any calendar day.
pub fn date_order(a: &str, b: &str) -> std::cmp::Ordering {
    match (a == ALL_WEEK, b == ALL_WEEK) {
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

/// Distinct event dates, `all-week` first, then chronological.
pub fn unique_dates() -> Vec<&'static str> {
    let mut dates: Vec<&'static str> = events().iter().map(|e| e.date.as_str()).collect();
    dates.sort_by(|a, b| date_order(a, b));
    dates.dedup();
    dates
}

fn format_date(date: &str, fmt: &str) -> String {
    if date == ALL_WEEK {
        return "All Week".to_string();
    }
    match chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format(fmt).to_string(),
        Err(_) => date.to_string(),
    }
}

/// Heading label for a schedule date, e.g. "Thursday, January 22".
/// Unparseable dates are returned as-is.
pub fn date_label(date: &str) -> String {
    format_date(date, "%A, %B %-d")
}

/// Compact label for date tabs and list rows, e.g. "Thu Jan 22".
pub fn short_date_label(date: &str) -> String {
    format_date(date, "%a %b %-d")
}
