use crate::models::{DayRecord, DayStatus, StatsResponse, TrackingData};
use crate::stats::{classify, date_key, today};
use chrono::{Datelike, Duration, NaiveDate};

pub enum Banner {
    Saved(String),
    SaveFailed,
}

pub struct DashboardView<'a> {
    pub data: &'a TrackingData,
    pub stats: &'a StatsResponse,
    /// First day of the month the calendar shows.
    pub month: NaiveDate,
    pub selected: NaiveDate,
    pub record: Option<&'a DayRecord>,
    pub banner: Option<Banner>,
    pub guest: bool,
    pub track_from: &'a str,
}

pub fn render_dashboard(view: &DashboardView) -> String {
    PAGE_HTML
        .replace("{{BANNER}}", &render_banner(view.banner.as_ref()))
        .replace("{{MODE}}", if view.guest { " (Guest Mode)" } else { "" })
        .replace("{{TRACK_FROM}}", view.track_from)
        .replace("{{STATS}}", &render_stats(view.stats))
        .replace("{{MONTH_LABEL}}", &month_label(view.month))
        .replace("{{PREV_MONTH}}", &month_query(prev_month(view.month)))
        .replace("{{NEXT_MONTH}}", &month_query(next_month(view.month)))
        .replace("{{SELECTED}}", &date_key(view.selected))
        .replace("{{CALENDAR}}", &render_calendar(view))
        .replace("{{DETAIL}}", &render_detail(view.selected, view.record))
}

fn render_banner(banner: Option<&Banner>) -> String {
    match banner {
        None => String::new(),
        Some(Banner::Saved(date)) => format!(
            r#"<div class="banner ok">Tracking data for {} has been saved.</div>"#,
            escape_html(date)
        ),
        Some(Banner::SaveFailed) => {
            r#"<div class="banner err">Failed to save tracking data.</div>"#.to_string()
        }
    }
}

fn render_stats(stats: &StatsResponse) -> String {
    let card = |label: &str, value: String, sub: String| {
        format!(
            r#"<div class="stat-card"><h3>{label}</h3><p class="value">{value}</p><p class="sub">{sub}</p></div>"#
        )
    };

    [
        card(
            "Gym Days",
            stats.gym_days.to_string(),
            format!("{}% success", stats.gym_success_rate),
        ),
        card(
            "Diet Days",
            stats.diet_days.to_string(),
            format!("{}% success", stats.diet_success_rate),
        ),
        card(
            "Perfect Days",
            stats.perfect_days.to_string(),
            format!("{}% rate", stats.perfect_day_rate),
        ),
        card(
            "Days Tracked",
            stats.total_days.to_string(),
            format!("{} excl. Sundays", stats.total_days_excluding_sundays),
        ),
        card(
            "Gym Streak",
            format!("{} days", stats.current_gym_streak),
            format!("{} gym-only days", stats.gym_only_days),
        ),
        card(
            "Diet Streak",
            format!("{} days", stats.current_diet_streak),
            format!("perfect streak: {} days", stats.current_perfect_streak),
        ),
    ]
    .join("\n")
}

fn render_calendar(view: &DashboardView) -> String {
    let today = today();
    let month_str = view.month.format("%Y-%m").to_string();
    let mut cells = String::new();

    for _ in 0..view.month.weekday().num_days_from_sunday() {
        cells.push_str(r#"<div class="day blank"></div>"#);
        cells.push('\n');
    }

    let mut date = view.month;
    while date.month() == view.month.month() {
        let mut classes = String::from("day");
        if let Some(status) = status_class(classify(view.data, date)) {
            classes.push(' ');
            classes.push_str(status);
        }
        if date == view.selected {
            classes.push_str(" selected");
        }
        if date == today {
            classes.push_str(" today");
        }
        cells.push_str(&format!(
            r#"<a class="{classes}" href="/?month={month_str}&selected={key}">{day}</a>"#,
            key = date_key(date),
            day = date.day(),
        ));
        cells.push('\n');
        date += Duration::days(1);
    }

    cells
}

fn render_detail(selected: NaiveDate, record: Option<&DayRecord>) -> String {
    let gym_done = record.map(|r| r.gym_completed).unwrap_or(false);
    let diet_done = record.map(|r| r.diet_maintained).unwrap_or(false);
    let gym_notes = record.and_then(|r| r.gym_notes.as_deref()).unwrap_or("");
    let diet_notes = record.and_then(|r| r.diet_notes.as_deref()).unwrap_or("");

    let status = match record.map(|r| (r.gym_completed, r.diet_maintained)) {
        None => ("none", "Not tracked yet"),
        Some((true, true)) => ("perfect", "Perfect day!"),
        Some((true, false)) => ("gym-only", "Gym completed, diet skipped"),
        Some((false, true)) => ("diet-only", "Diet maintained, gym skipped"),
        Some((false, false)) => ("skipped", "Both gym and diet skipped"),
    };

    format!(
        r#"<h2>{heading}</h2>
<p class="status {status_class}">{status_text}</p>
<form method="post" action="/day/save">
  <input type="hidden" name="date" value="{key}" />
  <label class="habit"><input type="checkbox" name="gym_completed"{gym_checked} /> Gym session</label>
  <textarea name="gym_notes" rows="2" placeholder="Gym notes">{gym_notes}</textarea>
  <label class="habit"><input type="checkbox" name="diet_maintained"{diet_checked} /> Diet maintained</label>
  <textarea name="diet_notes" rows="2" placeholder="Diet notes">{diet_notes}</textarea>
  <button type="submit">Save</button>
</form>"#,
        heading = pretty_date(selected),
        status_class = status.0,
        status_text = status.1,
        key = date_key(selected),
        gym_checked = if gym_done { " checked" } else { "" },
        diet_checked = if diet_done { " checked" } else { "" },
        gym_notes = escape_html(gym_notes),
        diet_notes = escape_html(diet_notes),
    )
}

fn status_class(status: DayStatus) -> Option<&'static str> {
    match status {
        DayStatus::Perfect => Some("perfect"),
        DayStatus::GymOnly => Some("gym-only"),
        DayStatus::DietOnly => Some("diet-only"),
        DayStatus::Skipped => Some("skipped"),
        DayStatus::Untracked => None,
    }
}

fn month_label(month: NaiveDate) -> String {
    month.format("%B %Y").to_string()
}

fn month_query(month: NaiveDate) -> String {
    month.format("%Y-%m").to_string()
}

fn prev_month(first: NaiveDate) -> NaiveDate {
    let back = first - Duration::days(1);
    back.with_day(1).unwrap_or(back)
}

fn next_month(first: NaiveDate) -> NaiveDate {
    let forward = first + Duration::days(32);
    forward.with_day(1).unwrap_or(forward)
}

/// "23rd May, 2025" — the header format for the day-detail panel.
fn pretty_date(date: NaiveDate) -> String {
    let day = date.day();
    let ordinal = match day {
        4..=20 => "th",
        n if n % 10 == 1 => "st",
        n if n % 10 == 2 => "nd",
        n if n % 10 == 3 => "rd",
        _ => "th",
    };
    format!("{day}{ordinal} {}", date.format("%B, %Y"))
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Gym &amp; Diet Tracker</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&display=swap');

    :root {
      --bg-1: #eef4fb;
      --bg-2: #cfe2f7;
      --ink: #24323f;
      --accent: #2f6fb4;
      --card: rgba(255, 255, 255, 0.92);
      --shadow: 0 20px 50px rgba(36, 50, 63, 0.14);
      --perfect: #bbf7d0;
      --perfect-ink: #166534;
      --gym-only: #fef08a;
      --gym-only-ink: #854d0e;
      --diet-only: #bfdbfe;
      --diet-only-ink: #1e40af;
      --skipped: #fecaca;
      --skipped-ink: #991b1b;
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 55%),
        linear-gradient(140deg, var(--bg-1), #f3f7fc 65%, #e8f0f9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
      display: grid;
      justify-items: center;
    }

    .app {
      width: min(980px, 100%);
      display: grid;
      gap: 20px;
    }

    header.card {
      display: flex;
      flex-wrap: wrap;
      justify-content: space-between;
      align-items: baseline;
      gap: 10px;
    }

    .card {
      background: var(--card);
      border-radius: 20px;
      box-shadow: var(--shadow);
      padding: 22px 26px;
    }

    h1 { margin: 0; font-size: 1.6rem; }
    h2 { margin: 0 0 10px; font-size: 1.2rem; }
    .muted { color: #5d6b78; font-size: 0.9rem; }

    .banner {
      border-radius: 12px;
      padding: 12px 18px;
      font-weight: 500;
    }
    .banner.ok { background: var(--perfect); color: var(--perfect-ink); }
    .banner.err { background: var(--skipped); color: var(--skipped-ink); }

    .stats {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(140px, 1fr));
      gap: 14px;
    }
    .stat-card {
      background: var(--card);
      border-radius: 16px;
      box-shadow: var(--shadow);
      padding: 14px 18px;
    }
    .stat-card h3 { margin: 0; font-size: 0.78rem; color: #5d6b78; text-transform: uppercase; }
    .stat-card .value { margin: 6px 0 2px; font-size: 1.5rem; font-weight: 600; }
    .stat-card .sub { margin: 0; font-size: 0.8rem; color: #5d6b78; }

    .columns {
      display: grid;
      grid-template-columns: 3fr 2fr;
      gap: 20px;
    }
    @media (max-width: 760px) { .columns { grid-template-columns: 1fr; } }

    .cal-nav {
      display: flex;
      justify-content: space-between;
      align-items: center;
      margin-bottom: 12px;
    }
    .cal-nav a {
      color: var(--accent);
      text-decoration: none;
      font-weight: 600;
    }

    .weekdays, .grid {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 6px;
    }
    .weekdays span {
      text-align: center;
      font-size: 0.75rem;
      color: #5d6b78;
      padding-bottom: 4px;
    }

    .day {
      aspect-ratio: 1;
      display: grid;
      place-items: center;
      border-radius: 10px;
      text-decoration: none;
      color: var(--ink);
      background: rgba(255, 255, 255, 0.6);
      font-size: 0.9rem;
    }
    .day.blank { background: transparent; }
    .day.perfect { background: var(--perfect); color: var(--perfect-ink); font-weight: 600; }
    .day.gym-only { background: var(--gym-only); color: var(--gym-only-ink); font-weight: 600; }
    .day.diet-only { background: var(--diet-only); color: var(--diet-only-ink); font-weight: 600; }
    .day.skipped { background: var(--skipped); color: var(--skipped-ink); font-weight: 600; }
    .day.selected { outline: 2px solid var(--accent); }
    .day.today { box-shadow: inset 0 0 0 2px var(--ink); }

    .legend {
      display: flex;
      flex-wrap: wrap;
      gap: 14px;
      margin-top: 14px;
      font-size: 0.8rem;
    }
    .legend span { display: flex; align-items: center; gap: 6px; }
    .swatch { width: 14px; height: 14px; border-radius: 4px; display: inline-block; }

    .status { border-radius: 10px; padding: 8px 12px; font-weight: 500; }
    .status.perfect { background: var(--perfect); color: var(--perfect-ink); }
    .status.gym-only { background: var(--gym-only); color: var(--gym-only-ink); }
    .status.diet-only { background: var(--diet-only); color: var(--diet-only-ink); }
    .status.skipped { background: var(--skipped); color: var(--skipped-ink); }
    .status.none { background: rgba(93, 107, 120, 0.12); }

    form { display: grid; gap: 10px; margin-top: 12px; }
    .habit { font-weight: 500; }
    textarea {
      border: 1px solid #c6d4e2;
      border-radius: 10px;
      padding: 8px 10px;
      font-family: inherit;
      resize: vertical;
    }
    button {
      justify-self: start;
      background: var(--accent);
      color: #fff;
      border: none;
      border-radius: 10px;
      padding: 10px 26px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
    }
    button:hover { filter: brightness(1.08); }
  </style>
</head>
<body>
  <div class="app">
    {{BANNER}}
    <header class="card">
      <div>
        <h1>Gym &amp; Diet Tracker{{MODE}}</h1>
        <p class="muted">Tracking from {{TRACK_FROM}}</p>
      </div>
    </header>

    <section class="stats">
      {{STATS}}
    </section>

    <div class="columns">
      <section class="card">
        <div class="cal-nav">
          <a href="/?month={{PREV_MONTH}}&selected={{SELECTED}}">&larr; Prev</a>
          <h2>{{MONTH_LABEL}}</h2>
          <a href="/?month={{NEXT_MONTH}}&selected={{SELECTED}}">Next &rarr;</a>
        </div>
        <div class="weekdays">
          <span>Sun</span><span>Mon</span><span>Tue</span><span>Wed</span>
          <span>Thu</span><span>Fri</span><span>Sat</span>
        </div>
        <div class="grid">
          {{CALENDAR}}
        </div>
        <div class="legend">
          <span><i class="swatch" style="background: var(--perfect)"></i>Both gym &amp; diet</span>
          <span><i class="swatch" style="background: var(--gym-only)"></i>Gym only</span>
          <span><i class="swatch" style="background: var(--diet-only)"></i>Diet only</span>
          <span><i class="swatch" style="background: var(--skipped)"></i>Both skipped</span>
        </div>
      </section>

      <section class="card">
        {{DETAIL}}
      </section>
    </div>
  </div>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn view_fixture(data: &TrackingData, stats: &StatsResponse) -> String {
        render_dashboard(&DashboardView {
            data,
            stats,
            month: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            selected: NaiveDate::from_ymd_opt(2025, 5, 23).unwrap(),
            record: None,
            banner: None,
            guest: true,
            track_from: "2025-05-01",
        })
    }

    #[test]
    fn dashboard_marks_tracked_days_with_status_classes() {
        let mut data = TrackingData::default();
        data.days.insert(
            "2025-05-20".to_string(),
            DayRecord {
                gym_completed: true,
                diet_maintained: true,
                gym_notes: None,
                diet_notes: None,
            },
        );
        let stats = crate::stats::build_stats(&data, "2025-05-01");
        let html = view_fixture(&data, &stats);

        assert!(html.contains(r#"selected=2025-05-20"#));
        assert!(html.contains("day perfect"));
        assert!(html.contains("(Guest Mode)"));
    }

    #[test]
    fn notes_are_escaped_in_the_detail_form() {
        let record = DayRecord {
            gym_completed: true,
            diet_maintained: false,
            gym_notes: Some("<script>alert(1)</script>".to_string()),
            diet_notes: None,
        };
        let detail = render_detail(NaiveDate::from_ymd_opt(2025, 5, 23).unwrap(), Some(&record));
        assert!(!detail.contains("<script>"));
        assert!(detail.contains("&lt;script&gt;"));
    }

    #[test]
    fn pretty_date_uses_english_ordinals() {
        let day = |d| NaiveDate::from_ymd_opt(2025, 5, d).unwrap();
        assert_eq!(pretty_date(day(1)), "1st May, 2025");
        assert_eq!(pretty_date(day(2)), "2nd May, 2025");
        assert_eq!(pretty_date(day(3)), "3rd May, 2025");
        assert_eq!(pretty_date(day(11)), "11th May, 2025");
        assert_eq!(pretty_date(day(23)), "23rd May, 2025");
    }

    #[test]
    fn month_navigation_wraps_the_year() {
        let jan = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let dec = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert_eq!(month_query(prev_month(jan)), "2024-12");
        assert_eq!(month_query(next_month(dec)), "2026-01");
    }

    #[test]
    fn untracked_status_has_no_class() {
        assert_eq!(status_class(DayStatus::Untracked), None);
        assert_eq!(status_class(DayStatus::Perfect), Some("perfect"));
    }
}
