use crate::dataset::{LatestSnapshot, PopulationTotals, STUDENT_SITES};
use crate::errors::DashboardError;
use crate::models::{CondType, Population};
use serde::Serialize;
use tracing::debug;

/// Card order on the page: students first, then staff.
pub const CARD_ORDER: [CondType; 6] = [
    CondType::StudIso,
    CondType::StudQ,
    CondType::StudRec,
    CondType::StaffIso,
    CondType::StaffQ,
    CondType::StaffRec,
];

/// Row order of the site breakdown table.
pub const BREAKDOWN_ORDER: [CondType; 6] = [
    CondType::StaffIso,
    CondType::StudIso,
    CondType::StaffQ,
    CondType::StudQ,
    CondType::StaffRec,
    CondType::StudRec,
];

pub const OTHER_SITE: &str = "Other";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCard {
    pub id: String,
    pub label: String,
    pub cond_type: CondType,
    pub count: f64,
    pub percent: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCards {
    pub cards: Vec<SummaryCard>,
}

impl SummaryCards {
    pub fn get(&self, cond_type: CondType) -> Option<&SummaryCard> {
        self.cards.iter().find(|card| card.cond_type == cond_type)
    }
}

pub fn compute_summary_cards(snapshot: &LatestSnapshot, totals: &PopulationTotals) -> SummaryCards {
    let cards = CARD_ORDER
        .into_iter()
        .map(|cond_type| {
            let count = match snapshot_count(snapshot, cond_type) {
                Ok(count) => count,
                Err(err) => {
                    debug!(%err, "summary card falls back to zero");
                    0.0
                }
            };
            let total = totals.for_population(cond_type.population());
            let percent = percent_of(count, total);
            SummaryCard {
                id: card_id(cond_type),
                label: format!("{} {}", cond_type.population(), cond_type.condition()),
                cond_type,
                count,
                percent,
                text: format!(" {} - {percent:.1}%", format_count(count)),
            }
        })
        .collect();

    SummaryCards { cards }
}

fn snapshot_count(snapshot: &LatestSnapshot, cond_type: CondType) -> Result<f64, DashboardError> {
    let mut rows = snapshot.for_cond_type(cond_type).peekable();
    if rows.peek().is_none() {
        return Err(DashboardError::EmptySnapshot(cond_type));
    }
    Ok(rows.filter_map(|record| record.value).sum())
}

fn card_id(cond_type: CondType) -> String {
    let population = match cond_type.population() {
        Population::Students => "student",
        Population::Staff => "staff",
    };
    format!(
        "{population}_{}_card_data",
        cond_type.condition().suffix().to_lowercase()
    )
}

/// `100 * count / total`, rounded to one decimal.
pub fn percent_of(count: f64, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count / f64::from(total) * 1000.0).round() / 10.0
}

/// Integral counts print without a decimal point.
pub fn format_count(count: f64) -> String {
    if count.is_finite() && count.fract() == 0.0 {
        format!("{}", count as i64)
    } else {
        count.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub cond_type: CondType,
    pub values: Vec<f64>,
    pub total: f64,
}

/// Latest-date counts per code and site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteBreakdown {
    pub date: Option<chrono::NaiveDate>,
    pub sites: Vec<String>,
    pub rows: Vec<BreakdownRow>,
}

/// Locations outside the site taxonomy are folded into `Other`.
pub fn build_site_breakdown(snapshot: &LatestSnapshot) -> SiteBreakdown {
    let sites: Vec<String> = STUDENT_SITES
        .iter()
        .map(|(name, _)| name.to_string())
        .chain(std::iter::once(OTHER_SITE.to_string()))
        .collect();
    let other = sites.len() - 1;

    let rows = BREAKDOWN_ORDER
        .into_iter()
        .map(|cond_type| {
            let mut values = vec![0.0; sites.len()];
            for record in snapshot.for_cond_type(cond_type) {
                let column = sites
                    .iter()
                    .position(|site| *site == record.location)
                    .unwrap_or(other);
                values[column] += record.value.unwrap_or(0.0);
            }
            BreakdownRow {
                cond_type,
                total: values.iter().sum(),
                values,
            }
        })
        .collect();

    SiteBreakdown {
        date: snapshot.date,
        sites,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::record;
    use crate::dataset::Dataset;

    #[test]
    fn student_isolated_card_matches_scenario() {
        let dataset = Dataset::new(vec![
            record((2021, 1, 4), "HS", CondType::StudIso, Some(10.0)),
            record((2021, 1, 11), "HS", CondType::StudIso, Some(15.0)),
        ]);
        let totals = PopulationTotals { students: 707, staff: 460 };
        let cards = compute_summary_cards(&dataset.latest_snapshot(), &totals);

        let card = cards.get(CondType::StudIso).unwrap();
        assert_eq!(card.text, " 15 - 2.1%");
        assert_eq!(card.id, "student_iso_card_data");
        assert_eq!(card.label, "STUDENTS ISOLATED");
        assert_eq!(cards.cards.len(), 6);
    }

    #[test]
    fn missing_code_reads_zero() {
        let dataset = Dataset::new(vec![record((2021, 1, 11), "HS", CondType::StudIso, Some(3.0))]);
        let cards = compute_summary_cards(&dataset.latest_snapshot(), &PopulationTotals::default());
        let card = cards.get(CondType::StaffRec).unwrap();
        assert_eq!(card.text, " 0 - 0.0%");
        assert_eq!(card.id, "staff_rec_card_data");
    }

    #[test]
    fn percent_rounds_to_one_decimal_within_bounds() {
        for count in [0.0, 1.0, 7.0, 100.0, 459.0, 460.0] {
            assert!((0.0..=100.0).contains(&percent_of(count, 460)));
        }
        assert_eq!(percent_of(7.0, 460), 1.5);
        assert_eq!(percent_of(459.0, 460), 99.8);
        assert_eq!(percent_of(460.0, 460), 100.0);
        assert_eq!(percent_of(15.0, 707), 2.1);
        assert_eq!(percent_of(5.0, 0), 0.0);
    }

    #[test]
    fn counts_format_without_trailing_zero() {
        assert_eq!(format_count(15.0), "15");
        assert_eq!(format_count(0.0), "0");
        assert_eq!(format_count(2.5), "2.5");
    }

    #[test]
    fn breakdown_folds_unknown_sites_and_totals_rows() {
        let dataset = Dataset::new(vec![
            record((2021, 1, 11), "HS", CondType::StaffIso, Some(2.0)),
            record((2021, 1, 11), "Central Office", CondType::StaffIso, Some(1.0)),
            record((2021, 1, 11), "K-1", CondType::StudQ, None),
        ]);
        let breakdown = build_site_breakdown(&dataset.latest_snapshot());
        assert_eq!(breakdown.sites.last().map(String::as_str), Some("Other"));
        assert_eq!(breakdown.rows[0].cond_type, CondType::StaffIso);
        assert_eq!(breakdown.rows[0].values[5], 2.0);
        assert_eq!(breakdown.rows[0].values[7], 1.0);
        assert_eq!(breakdown.rows[0].total, 3.0);
        assert!(breakdown.rows[3].values.iter().all(|v| *v == 0.0));
    }
}
