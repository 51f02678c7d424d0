use crate::controller::DashboardView;
use crate::models::{Condition, FilterState, Population};

pub const PAGE_TITLE: &str = "GENERIC: COVID-19";

pub fn render_index(filter: &FilterState, view: &DashboardView) -> Result<String, serde_json::Error> {
    let population_controls: String = Population::ALL
        .iter()
        .map(|population| {
            let checked = if *population == filter.population { " checked" } else { "" };
            format!(
                r#"<label class="radio"><input type="radio" name="population" value="{value}"{checked} /> {value}</label>"#,
                value = population.as_str()
            )
        })
        .collect();

    let condition_options: String = Condition::ALL
        .iter()
        .map(|condition| {
            let selected = if *condition == filter.condition { " selected" } else { "" };
            format!(
                r#"<option value="{value}"{selected}>{value}</option>"#,
                value = condition.as_str()
            )
        })
        .collect();

    let cards: String = view
        .summary
        .cards
        .iter()
        .map(|card| {
            format!(
                r#"<div class="stat"><span class="label">{label}</span><span id="{id}" class="value">{text}</span></div>"#,
                label = escape_html(&card.label),
                id = card.id,
                text = escape_html(&card.text)
            )
        })
        .collect();

    let snapshot = escape_html(&serde_json::to_string(&view.views.latest_snapshot)?);
    let initial = serde_json::to_string(view)?.replace("</", "<\\/");

    Ok(fill_template(
        INDEX_HTML,
        &[
            ("TITLE", PAGE_TITLE),
            ("POPULATION_CONTROLS", &population_controls),
            ("CONDITION_OPTIONS", &condition_options),
            ("CARDS", &cards),
            ("SNAPSHOT", &snapshot),
            ("INITIAL_VIEW", &initial),
        ],
    ))
}

/// Single pass over `template`; substituted text is never rescanned.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };
        let key = &after[..end];
        match values.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <script src="https://cdn.plot.ly/plotly-2.27.0.min.js"></script>
  <style>
    :root {
      --bg: #f3f3f3;
      --banner: #a1a1a1;
      --ink: #2b2a28;
      --accent: #2f4858;
      --card: #ffffff;
      --shadow: 0 12px 32px rgba(47, 72, 88, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
    }

    header {
      background: var(--banner);
      text-align: center;
      padding: 28px 16px;
    }

    h1 {
      margin: 0;
      color: white;
      text-shadow: 2px 2px 4px #000000;
    }

    main {
      display: grid;
      gap: 24px;
      padding: 24px;
    }

    .row {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(420px, 1fr));
      gap: 24px;
    }

    .controls {
      display: flex;
      align-items: center;
      gap: 14px;
      font-weight: 600;
    }

    .radio {
      margin-right: 10px;
      font-weight: 400;
    }

    select {
      width: 200px;
      padding: 6px 8px;
    }

    .chart {
      background: var(--card);
      border-radius: 12px;
      box-shadow: var(--shadow);
      min-height: 420px;
    }

    .cards {
      display: grid;
      grid-template-columns: repeat(2, 1fr);
      gap: 16px;
      align-content: start;
    }

    .stat {
      background: var(--card);
      border-radius: 12px;
      box-shadow: var(--shadow);
      padding: 18px;
      display: grid;
      gap: 8px;
      text-align: center;
    }

    .stat .label {
      font-size: 0.9rem;
      letter-spacing: 0.08em;
      color: #6b645d;
    }

    .stat .value {
      font-size: 1.5rem;
      font-weight: 600;
      color: var(--accent);
    }

    .status {
      min-height: 1.2em;
      color: #c63b2b;
    }
  </style>
</head>
<body>
  <header>
    <h1>GENERIC COVID-19 DASHBOARD</h1>
  </header>

  <main>
    <div class="controls">
      <span>POPULATION</span>
      {{POPULATION_CONTROLS}}
    </div>

    <div class="row">
      <div id="affected_bar_chart" class="chart"></div>
      <div class="cards">{{CARDS}}</div>
    </div>

    <div class="controls">
      <span>CONDITION</span>
      <select id="cond_dropdown">{{CONDITION_OPTIONS}}</select>
    </div>

    <div class="row">
      <div id="site_pie_chart" class="chart"></div>
      <div id="site_time_series_chart" class="chart"></div>
    </div>

    <div class="status" id="status"></div>
    <div id="most_recent_data_div" style="display:none">{{SNAPSHOT}}</div>
  </main>

  <script id="initial-view" type="application/json">{{INITIAL_VIEW}}</script>
  <script>
    const statusEl = document.getElementById('status');
    const snapshotEl = document.getElementById('most_recent_data_div');
    const conditionEl = document.getElementById('cond_dropdown');
    const populationEls = Array.from(document.querySelectorAll('input[name="population"]'));

    const setStatus = (message) => {
      statusEl.textContent = message || '';
    };

    const renderChart = (id, figure) => {
      if (window.Plotly) {
        Plotly.react(id, figure.data, figure.layout, { responsive: true });
      }
    };

    const renderCharts = (view) => {
      renderChart('affected_bar_chart', view.affected_bar_chart);
      renderChart('site_pie_chart', view.site_pie_chart);
      renderChart('site_time_series_chart', view.site_time_series_chart);
    };

    const renderCards = (summary) => {
      summary.cards.forEach((card) => {
        const el = document.getElementById(card.id);
        if (el) {
          el.textContent = card.text;
        }
      });
    };

    const selectedFilter = () => {
      const population = populationEls.find((el) => el.checked);
      return {
        population: population ? population.value : 'STUDENTS',
        condition: conditionEl.value
      };
    };

    // canonical form so server-rendered and fetched snapshots compare equal
    let currentSnapshot = JSON.stringify(JSON.parse(snapshotEl.textContent));

    const publishSnapshot = async (snapshot) => {
      const serialized = JSON.stringify(snapshot);
      if (serialized === currentSnapshot) {
        return;
      }
      currentSnapshot = serialized;
      snapshotEl.textContent = serialized;

      const res = await fetch('/api/cards', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: serialized
      });
      if (!res.ok) {
        throw new Error('Unable to load summary cards');
      }
      renderCards(await res.json());
    };

    const refresh = async () => {
      const params = new URLSearchParams(selectedFilter());
      history.replaceState(null, '', `/?${params}`);

      const res = await fetch(`/api/views?${params}`);
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Unable to load charts');
      }
      const view = await res.json();
      renderCharts(view);
      await publishSnapshot(view.latest_snapshot);
      setStatus('');
    };

    const onChange = () => refresh().catch((err) => setStatus(err.message));
    populationEls.forEach((el) => el.addEventListener('change', onChange));
    conditionEl.addEventListener('change', onChange);

    renderCharts(JSON.parse(document.getElementById('initial-view').textContent));
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Controller;
    use crate::dataset::fixtures::two_week_dataset;
    use crate::dataset::{DashboardContext, PopulationTotals};

    #[test]
    fn page_preselects_filter_and_renders_cards() {
        let ctx = DashboardContext::new(two_week_dataset(), PopulationTotals::default());
        let filter = FilterState {
            population: Population::Staff,
            condition: Condition::Recovered,
        };
        let view = Controller::new(&ctx).apply(filter);
        let page = render_index(&filter, &view).unwrap();

        assert!(page.contains(r#"value="STAFF" checked"#));
        assert!(page.contains(r#"<option value="RECOVERED" selected>"#));
        assert!(page.contains(r#"id="staff_rec_card_data""#));
        assert!(page.contains(r#"id="most_recent_data_div""#));
        assert!(!page.contains("{{CARDS}}"));
        assert!(!page.contains("{{INITIAL_VIEW}}"));
    }

    #[test]
    fn placeholder_text_in_data_is_not_expanded() {
        let records = vec![crate::dataset::fixtures::record(
            (2021, 1, 11),
            "{{INITIAL_VIEW}}",
            crate::models::CondType::StudIso,
            Some(2.0),
        )];
        let ctx = DashboardContext::new(crate::dataset::Dataset::new(records), PopulationTotals::default());
        let filter = FilterState::default();
        let view = Controller::new(&ctx).apply(filter);
        let page = render_index(&filter, &view).unwrap();

        // the location survives verbatim and the view blob is embedded exactly once
        assert!(page.contains(r#""location":"{{INITIAL_VIEW}}""#));
        assert_eq!(page.matches(r#""affected_bar_chart":{"#).count(), 1);
    }

    #[test]
    fn fill_template_keeps_unknown_placeholders() {
        assert_eq!(
            fill_template("a {{X}} {{Y}} {{", &[("X", "{{Y}}")]),
            "a {{Y}} {{Y}} {{"
        );
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html(r#"<a href="x">&</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }
}
