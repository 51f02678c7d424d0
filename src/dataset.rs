use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{CondType, Population, Record};

/// Student headcount per site, in site-taxonomy order.
pub const STUDENT_SITES: [(&str, u32); 7] = [
    ("DC/PK", 166),
    ("K-1", 497),
    ("2-3", 489),
    ("INT", 707),
    ("JH", 499),
    ("HS", 947),
    ("Alt", 26),
];

pub const TOTAL_STAFF: u32 = 460;

/// Denominators for the percentage figures. Not derived from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationTotals {
    pub students: u32,
    pub staff: u32,
}

impl PopulationTotals {
    pub fn for_population(&self, population: Population) -> u32 {
        match population {
            Population::Students => self.students,
            Population::Staff => self.staff,
        }
    }
}

impl Default for PopulationTotals {
    fn default() -> Self {
        Self {
            students: STUDENT_SITES.iter().map(|(_, count)| count).sum(),
            staff: TOTAL_STAFF,
        }
    }
}

/// Records in file order. Never mutated after load.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn max_date(&self) -> Option<NaiveDate> {
        max_date(&self.records)
    }

    pub fn for_population(&self, population: Population) -> Vec<&Record> {
        let codes = CondType::for_population(population);
        self.records
            .iter()
            .filter(|record| codes.contains(&record.cond_type))
            .collect()
    }

    pub fn for_cond_type(&self, cond_type: CondType) -> impl Iterator<Item = &Record> {
        self.records
            .iter()
            .filter(move |record| record.cond_type == cond_type)
    }

    /// Every row dated at the dataset's maximum date, regardless of population.
    pub fn latest_snapshot(&self) -> LatestSnapshot {
        match self.max_date() {
            Some(date) => LatestSnapshot {
                date: Some(date),
                records: self
                    .records
                    .iter()
                    .filter(|record| record.date == date)
                    .cloned()
                    .collect(),
            },
            None => LatestSnapshot::default(),
        }
    }
}

pub fn max_date<'a, I>(records: I) -> Option<NaiveDate>
where
    I: IntoIterator<Item = &'a Record>,
{
    records.into_iter().map(|record| record.date).max()
}

/// Rows at the most recent date. Travels between the two update stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestSnapshot {
    pub date: Option<NaiveDate>,
    pub records: Vec<Record>,
}

impl LatestSnapshot {
    pub fn for_cond_type(&self, cond_type: CondType) -> impl Iterator<Item = &Record> {
        self.records
            .iter()
            .filter(move |record| record.cond_type == cond_type)
    }
}

/// Immutable state shared by every request.
#[derive(Debug, Clone, Default)]
pub struct DashboardContext {
    pub dataset: Dataset,
    pub totals: PopulationTotals,
}

impl DashboardContext {
    pub fn new(dataset: Dataset, totals: PopulationTotals) -> Self {
        Self { dataset, totals }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn record(date: (i32, u32, u32), location: &str, cond_type: CondType, value: Option<f64>) -> Record {
        Record {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            location: location.to_string(),
            cond_type,
            value,
        }
    }

    /// Two weeks, two sites, every code present.
    pub fn two_week_dataset() -> Dataset {
        let mut records = Vec::new();
        for (date, base) in [((2021, 1, 4), 1.0), ((2021, 1, 11), 2.0)] {
            for (site, weight) in [("HS", 10.0), ("JH", 1.0)] {
                for (index, cond_type) in CondType::ALL.into_iter().enumerate() {
                    records.push(record(date, site, cond_type, Some(base * weight + index as f64)));
                }
            }
        }
        Dataset::new(records)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn default_totals_sum_student_sites() {
        let totals = PopulationTotals::default();
        assert_eq!(totals.students, 3331);
        assert_eq!(totals.staff, 460);
        let names: Vec<_> = STUDENT_SITES.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["DC/PK", "K-1", "2-3", "INT", "JH", "HS", "Alt"]);
    }

    #[test]
    fn population_filter_keeps_only_its_codes() {
        let dataset = two_week_dataset();
        let staff = dataset.for_population(Population::Staff);
        assert_eq!(staff.len(), 12);
        assert!(staff.iter().all(|r| r.cond_type.population() == Population::Staff));
    }

    #[test]
    fn latest_snapshot_spans_all_populations() {
        let dataset = two_week_dataset();
        let snapshot = dataset.latest_snapshot();
        assert_eq!(snapshot.date, NaiveDate::from_ymd_opt(2021, 1, 11));
        assert_eq!(snapshot.records.len(), 12);
        assert!(snapshot.records.iter().all(|r| Some(r.date) == snapshot.date));
    }

    #[test]
    fn empty_dataset_has_empty_snapshot() {
        let snapshot = Dataset::default().latest_snapshot();
        assert_eq!(snapshot, LatestSnapshot::default());
    }
}
