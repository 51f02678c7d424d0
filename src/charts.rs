use crate::dataset::{max_date, Dataset, PopulationTotals};
use crate::errors::DashboardError;
use crate::figure::{Annotation, Axis, BarTrace, Figure, Layout, PieTrace, ScatterTrace, Trace};
use crate::models::{date_label, CondType, FilterState, Population, Record};
use crate::summary::format_count;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub frac_enrollment: f64,
}

/// Per-date totals for one code, ordered by date. Dates without rows are absent.
pub fn weekly_aggregate(dataset: &Dataset, cond_type: CondType, population_total: u32) -> Vec<WeeklyPoint> {
    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in dataset.for_cond_type(cond_type) {
        *sums.entry(record.date).or_default() += record.value.unwrap_or(0.0);
    }

    sums.into_iter()
        .map(|(date, value)| WeeklyPoint {
            date,
            value,
            frac_enrollment: fraction(value, population_total),
        })
        .collect()
}

fn fraction(value: f64, total: u32) -> f64 {
    if total == 0 { 0.0 } else { value / f64::from(total) }
}

fn point_on(points: &[WeeklyPoint], date: NaiveDate, cond_type: CondType) -> Result<&WeeklyPoint, DashboardError> {
    points
        .binary_search_by_key(&date, |point| point.date)
        .map(|index| &points[index])
        .map_err(|_| DashboardError::MissingAggregate { date, cond_type })
}

pub fn build_affected_bar_chart(dataset: &Dataset, totals: &PopulationTotals, population: Population) -> Figure {
    let population_total = totals.for_population(population);
    let aggregates = CondType::for_population(population)
        .map(|cond_type| (cond_type, weekly_aggregate(dataset, cond_type, population_total)));

    let dates: BTreeSet<NaiveDate> = aggregates
        .iter()
        .flat_map(|(_, points)| points.iter().map(|point| point.date))
        .collect();
    let labels: Vec<String> = dates.iter().copied().map(date_label).collect();

    let data = aggregates
        .iter()
        .map(|(cond_type, points)| {
            let (y, customdata) = dates
                .iter()
                .map(|date| match point_on(points, *date, *cond_type) {
                    Ok(point) => (point.value, point.frac_enrollment),
                    Err(err) => {
                        warn!(%err, "rendering missing aggregate as zero");
                        (0.0, 0.0)
                    }
                })
                .unzip();
            Trace::Bar(BarTrace {
                name: cond_type.condition().to_string(),
                x: labels.clone(),
                y,
                customdata,
                hovertemplate: "%{y} (%{customdata:.1%} of enrollment)".to_string(),
            })
        })
        .collect();

    let mut layout = Layout::titled(format!("TOTAL {population} AFFECTED"));
    layout.barmode = Some("stack".to_string());
    layout.xaxis = Some(Axis {
        kind: "category".to_string(),
    });

    Figure { data, layout }
}

/// `records` must already be narrowed to the selected code.
pub fn build_recent_pie_chart(records: &[&Record], filter: &FilterState) -> Figure {
    let base_title = format!(
        "DISTRIBUTION BY QTY. {} {}",
        filter.population, filter.condition
    );

    let Some(latest) = max_date(records.iter().copied()) else {
        let err = DashboardError::EmptySnapshot(filter.cond_type());
        warn!(%err, "rendering empty pie chart");
        return Figure {
            data: vec![Trace::Pie(PieTrace {
                labels: Vec::new(),
                values: Vec::new(),
                hole: 0.3,
            })],
            layout: Layout::titled(base_title),
        };
    };

    let (labels, values): (Vec<String>, Vec<f64>) = records
        .iter()
        .filter(|record| record.date == latest)
        .filter_map(|record| match record.value {
            Some(value) if value > 0.0 => Some((record.location.clone(), value)),
            _ => None,
        })
        .unzip();

    let mut layout = Layout::titled(format!("{base_title} - {}", date_label(latest)));
    if !values.is_empty() {
        layout.annotations.push(Annotation {
            text: format_count(values.iter().sum()),
            showarrow: false,
            x: 0.5,
            y: 0.5,
        });
    }

    Figure {
        data: vec![Trace::Pie(PieTrace {
            labels,
            values,
            hole: 0.3,
        })],
        layout,
    }
}

/// One line per site, over every date the site reported the selected code.
pub fn build_site_time_series_chart(records: &[&Record], filter: &FilterState) -> Figure {
    let cond_type = filter.cond_type();

    let mut sites: Vec<&str> = Vec::new();
    for record in records {
        if !sites.contains(&record.location.as_str()) {
            sites.push(&record.location);
        }
    }

    let data = sites
        .into_iter()
        .map(|site| {
            let (x, y) = records
                .iter()
                .filter(|record| record.location == site && record.cond_type == cond_type)
                .map(|record| (record.date.to_string(), record.value))
                .unzip();
            Trace::Scatter(ScatterTrace {
                name: site.to_string(),
                x,
                y,
                mode: "lines+markers".to_string(),
            })
        })
        .collect();

    Figure {
        data,
        layout: Layout::titled(format!(
            "{} {} BY BUILDING",
            filter.condition, filter.population
        )),
    }
}
