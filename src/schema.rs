//! Static chart specifications and the panel -> column mapping they imply.

use tracing::warn;

use crate::data::{Datasets, TableId};
use crate::error::ColumnError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelId {
    BedsVsRevenue,
    NetVsOperatingExpenses,
    PopulationHistogram,
    CapitalVsNetRevenue,
    TopCounties,
    BedsPerThousandVsRevenue,
}

impl PanelId {
    /// All panels, in render order.
    pub fn all() -> &'static [PanelId] {
        &[
            PanelId::BedsVsRevenue,
            PanelId::NetVsOperatingExpenses,
            PanelId::PopulationHistogram,
            PanelId::CapitalVsNetRevenue,
            PanelId::TopCounties,
            PanelId::BedsPerThousandVsRevenue,
        ]
    }

    pub fn index(&self) -> usize {
        Self::all().iter().position(|p| p == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn prev(&self) -> Self {
        let all = Self::all();
        all[(self.index() + all.len() - 1) % all.len()]
    }

    pub fn spec(&self) -> &'static ChartSpec {
        &CHART_SPECS[self.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Scatter,
    Histogram { bins: usize },
    HorizontalBar { top: usize },
}

/// Everything the renderer needs to know about one panel, minus the data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartSpec {
    pub title: &'static str,
    pub table: TableId,
    pub kind: ChartKind,
    pub x: &'static str,
    /// `None` for histograms, where y is the bin count.
    pub y: Option<&'static str>,
    pub hover: Option<&'static str>,
    pub x_label: &'static str,
    pub y_label: &'static str,
    /// Height hint in pixels; the layout turns these into row weights.
    pub height: u16,
    pub log_x_toggle: bool,
}

impl ChartSpec {
    pub fn required_columns(&self) -> Vec<&'static str> {
        let mut cols = vec![self.x];
        cols.extend(self.y);
        cols.extend(self.hover);
        cols
    }
}

static CHART_SPECS: [ChartSpec; 6] = [
    ChartSpec {
        title: "Beds vs Gross Inpatient Revenue",
        table: TableId::Hospital,
        kind: ChartKind::Scatter,
        x: "AVL_BEDS",
        y: Some("GRIP_TOT"),
        hover: Some("FAC_NAME"),
        x_label: "Available Beds",
        y_label: "Gross Inpatient Revenue",
        height: 600,
        log_x_toggle: false,
    },
    ChartSpec {
        title: "Net Revenue vs Operating Expenses",
        table: TableId::Hospital,
        kind: ChartKind::Scatter,
        x: "TOT_OP_EXP",
        y: Some("NET_TOT"),
        hover: Some("FAC_NAME"),
        x_label: "Total Operating Expenses",
        y_label: "Net Revenue",
        height: 280,
        log_x_toggle: false,
    },
    ChartSpec {
        title: "County Population Distribution",
        table: TableId::Population,
        kind: ChartKind::Histogram { bins: 30 },
        x: "POPULATION",
        y: None,
        hover: None,
        x_label: "POPULATION",
        y_label: "count",
        height: 280,
        log_x_toggle: false,
    },
    ChartSpec {
        title: "Capital Expenditure vs Net Revenue",
        table: TableId::Hospital,
        kind: ChartKind::Scatter,
        x: "CAP_EXP",
        y: Some("NET_TOT"),
        hover: None,
        x_label: "Capital Expenditure (USD)",
        y_label: "Net Revenue (USD)",
        height: 500,
        log_x_toggle: true,
    },
    ChartSpec {
        title: "Top 10 Counties by Revenue",
        table: TableId::CountyLevel,
        kind: ChartKind::HorizontalBar { top: 10 },
        x: "REVENUE",
        y: Some("COUNTY_NAME"),
        hover: None,
        x_label: "REVENUE",
        y_label: "COUNTY_NAME",
        height: 450,
        log_x_toggle: false,
    },
    ChartSpec {
        title: "Beds per 1,000 vs Revenue",
        table: TableId::CountyLevel,
        kind: ChartKind::Scatter,
        x: "AVL_BEDS_PER_THOUSAND",
        y: Some("REVENUE"),
        hover: Some("COUNTY_NAME"),
        x_label: "AVL_BEDS_PER_THOUSAND",
        y_label: "REVENUE",
        height: 450,
        log_x_toggle: false,
    },
];

/// Per-panel outcome of checking bound columns against the loaded tables.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaReport {
    results: Vec<(PanelId, Result<(), ColumnError>)>,
}

impl SchemaReport {
    pub fn get(&self, panel: PanelId) -> Result<(), ColumnError> {
        self.results
            .iter()
            .find(|(id, _)| *id == panel)
            .map(|(_, r)| r.clone())
            .unwrap_or(Ok(()))
    }

    pub fn is_ok(&self) -> bool {
        self.results.iter().all(|(_, r)| r.is_ok())
    }
}

/// Check every panel's required columns once, before anything is drawn.
pub fn validate(data: &Datasets) -> SchemaReport {
    let results = PanelId::all()
        .iter()
        .map(|&panel| {
            let spec = panel.spec();
            let table = data.table(spec.table);
            let result = spec
                .required_columns()
                .into_iter()
                .find(|col| !table.has_column(col))
                .map_or(Ok(()), |column| {
                    Err(ColumnError::Missing {
                        table: spec.table.name(),
                        column,
                    })
                });
            if let Err(e) = &result {
                warn!(panel = spec.title, error = %e, "panel schema check failed");
            }
            (panel, result)
        })
        .collect();

    SchemaReport { results }
}
