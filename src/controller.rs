//! Two-stage update pipeline behind the page.
//!
//! Stage one runs on every filter change and produces the three charts plus the
//! latest-date snapshot. Stage two turns a snapshot into the summary cards and
//! only runs when the published snapshot differs from the last one seen.
//!
//! The server builds a fresh `Controller` per request for the first page render
//! and for `/api/dashboard`; across requests the page keeps the last snapshot in
//! its hidden element and only posts to `/api/cards` when it changes.

use crate::charts::{build_affected_bar_chart, build_recent_pie_chart, build_site_time_series_chart};
use crate::dataset::{DashboardContext, LatestSnapshot, PopulationTotals};
use crate::figure::Figure;
use crate::models::{FilterState, Record};
use crate::summary::{compute_summary_cards, SummaryCards};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewUpdate {
    pub affected_bar_chart: Figure,
    pub site_pie_chart: Figure,
    pub site_time_series_chart: Figure,
    pub latest_snapshot: LatestSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    #[serde(flatten)]
    pub views: ViewUpdate,
    pub summary: SummaryCards,
}

pub fn recompute_views(ctx: &DashboardContext, filter: &FilterState) -> ViewUpdate {
    let population_records = ctx.dataset.for_population(filter.population);
    let cond_type = filter.cond_type();
    let selected: Vec<&Record> = population_records
        .iter()
        .copied()
        .filter(|record| record.cond_type == cond_type)
        .collect();

    ViewUpdate {
        affected_bar_chart: build_affected_bar_chart(&ctx.dataset, &ctx.totals, filter.population),
        site_pie_chart: build_recent_pie_chart(&selected, filter),
        site_time_series_chart: build_site_time_series_chart(&population_records, filter),
        latest_snapshot: ctx.dataset.latest_snapshot(),
    }
}

pub fn recompute_cards(snapshot: &LatestSnapshot, totals: &PopulationTotals) -> SummaryCards {
    compute_summary_cards(snapshot, totals)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Recomputing,
}

pub struct Controller<'a> {
    ctx: &'a DashboardContext,
    phase: Phase,
    snapshot: Option<LatestSnapshot>,
    cards: Option<SummaryCards>,
}

impl<'a> Controller<'a> {
    pub fn new(ctx: &'a DashboardContext) -> Self {
        Self {
            ctx,
            phase: Phase::Idle,
            snapshot: None,
            cards: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cards(&self) -> Option<&SummaryCards> {
        self.cards.as_ref()
    }

    /// Stage one. Publishes the snapshot, which may in turn fire stage two.
    pub fn on_filter_change(&mut self, filter: FilterState) -> ViewUpdate {
        self.enter();
        debug!(population = %filter.population, condition = %filter.condition, "recomputing views");
        let update = recompute_views(self.ctx, &filter);
        self.leave();

        self.on_snapshot_change(update.latest_snapshot.clone());
        update
    }

    /// Stage two. Returns `None` when the snapshot is unchanged.
    pub fn on_snapshot_change(&mut self, snapshot: LatestSnapshot) -> Option<&SummaryCards> {
        if self.snapshot.as_ref() == Some(&snapshot) {
            return None;
        }

        self.enter();
        debug!(date = ?snapshot.date, rows = snapshot.records.len(), "recomputing summary cards");
        self.cards = Some(recompute_cards(&snapshot, &self.ctx.totals));
        self.snapshot = Some(snapshot);
        self.leave();

        self.cards.as_ref()
    }

    /// Runs both stages and returns everything the page renders.
    pub fn apply(&mut self, filter: FilterState) -> DashboardView {
        let views = self.on_filter_change(filter);
        let summary = match &self.cards {
            Some(cards) => cards.clone(),
            None => recompute_cards(&views.latest_snapshot, &self.ctx.totals),
        };
        DashboardView { views, summary }
    }

    fn enter(&mut self) {
        debug_assert_eq!(self.phase, Phase::Idle);
        self.phase = Phase::Recomputing;
    }

    fn leave(&mut self) {
        self.phase = Phase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::two_week_dataset;
    use crate::figure::Trace;
    use crate::models::{CondType, Condition, Population};

    fn context() -> DashboardContext {
        DashboardContext::new(two_week_dataset(), PopulationTotals::default())
    }

    #[test]
    fn filter_change_recomputes_charts_and_cards() {
        let ctx = context();
        let mut controller = Controller::new(&ctx);
        let view = controller.apply(FilterState {
            population: Population::Staff,
            condition: Condition::Quarantined,
        });

        assert_eq!(controller.phase(), Phase::Idle);
        assert_eq!(view.views.affected_bar_chart.layout.title.text, "TOTAL STAFF AFFECTED");
        assert_eq!(
            view.views.site_time_series_chart.layout.title.text,
            "QUARANTINED STAFF BY BUILDING"
        );
        let Trace::Pie(pie) = &view.views.site_pie_chart.data[0] else {
            panic!("expected pie trace");
        };
        assert_eq!(pie.labels, ["HS", "JH"]);
        assert_eq!(view.summary.cards.len(), 6);
        assert!(view.summary.get(CondType::StaffQ).is_some());
    }

    #[test]
    fn cards_only_recompute_when_snapshot_changes() {
        let ctx = context();
        let mut controller = Controller::new(&ctx);
        let first = controller.on_filter_change(FilterState::default());
        let cards = controller.cards().cloned().unwrap();

        // snapshot covers the whole dataset, so switching filters leaves it unchanged
        let second = controller.on_filter_change(FilterState {
            population: Population::Staff,
            condition: Condition::Recovered,
        });
        assert_eq!(first.latest_snapshot, second.latest_snapshot);
        assert!(controller.on_snapshot_change(second.latest_snapshot).is_none());
        assert_eq!(controller.cards(), Some(&cards));

        assert!(controller.on_snapshot_change(LatestSnapshot::default()).is_some());
        let cards = controller.cards().unwrap();
        assert_eq!(cards.get(CondType::StudIso).unwrap().text, " 0 - 0.0%");
    }

    #[test]
    fn stages_are_independently_callable() {
        let ctx = context();
        let update = recompute_views(&ctx, &FilterState::default());
        let cards = recompute_cards(&update.latest_snapshot, &ctx.totals);
        let mut controller = Controller::new(&ctx);
        let view = controller.apply(FilterState::default());
        assert_eq!(view.views, update);
        assert_eq!(view.summary, cards);
    }
}
