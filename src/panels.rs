//! Panel views: the data each chart needs, computed from the loaded tables.

use tracing::{debug, info};

use crate::data::{CountyAggregate, Datasets, FacilityRecord, Table};
use crate::error::ColumnError;
use crate::filter::{filter_by_capital_expenditure, FilterControl, FilterEvent};
use crate::schema::{validate, ChartKind, ChartSpec, PanelId, SchemaReport};

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterView {
    pub points: Vec<Point>,
    pub log_x: bool,
}

impl ScatterView {
    /// Points in display space: x is log10 when the toggle is on, and points
    /// that cannot sit on a log axis are dropped.
    pub fn plotted(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .filter_map(|p| self.display_x(p.x).map(|x| (x, p.y)))
            .collect()
    }

    pub fn display_x(&self, x: f64) -> Option<f64> {
        if !self.log_x {
            Some(x)
        } else if x > 0.0 {
            Some(x.log10())
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramView {
    pub bins: Vec<Bin>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarView {
    /// (label, value), ascending by value from the first bar to the last.
    pub bars: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelBody {
    Scatter(ScatterView),
    Histogram(HistogramView),
    Bars(BarView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub id: PanelId,
    pub body: Result<PanelBody, ColumnError>,
}

// ========== Aggregations ==========

/// Equal-width bins over [min, max]; the last bin is closed on the right.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (Some(min), Some(max)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };

    if bins == 0 {
        return Vec::new();
    }

    if min == max {
        return vec![Bin {
            start: min,
            end: max,
            count: values.len() as u64,
        }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            start: min + width * i as f64,
            end: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// The `n` counties with the highest revenue, highest first.
/// Stable: equal revenues keep their table order. Counties without a
/// revenue value are not ranked.
pub fn top_by_revenue(counties: &[CountyAggregate], n: usize) -> Vec<&CountyAggregate> {
    let mut ranked: Vec<&CountyAggregate> = counties
        .iter()
        .filter(|c| c.revenue.is_some_and(f64::is_finite))
        .collect();
    ranked.sort_by(|a, b| {
        let (a, b) = (a.revenue.unwrap_or_default(), b.revenue.unwrap_or_default());
        b.total_cmp(&a)
    });
    ranked.truncate(n);
    ranked
}

fn scatter<T>(
    rows: impl IntoIterator<Item = T>,
    project: impl Fn(&T) -> (Option<f64>, Option<f64>, Option<String>),
    log_x: bool,
) -> ScatterView {
    let points = rows
        .into_iter()
        .filter_map(|row| match project(&row) {
            (Some(x), Some(y), label) if x.is_finite() && y.is_finite() => {
                Some(Point { x, y, label })
            }
            _ => None,
        })
        .collect();
    ScatterView { points, log_x }
}

/// The panel's x column and, when it has one, its numeric y column.
fn numeric_pair(
    table: &Table,
    spec: &ChartSpec,
) -> Result<(Vec<Option<f64>>, Vec<Option<f64>>), ColumnError> {
    let xs = table.numeric_column(spec.x)?;
    let ys = match spec.y {
        Some(column) => table.numeric_column(column)?,
        None => vec![None; xs.len()],
    };
    Ok((xs, ys))
}

fn labels(
    table: &Table,
    column: Option<&'static str>,
    len: usize,
) -> Result<Vec<Option<String>>, ColumnError> {
    match column {
        Some(column) => table.text_column(column),
        None => Ok(vec![None; len]),
    }
}

/// Hospital rows projected onto the filtered panel's columns, so a bad
/// cell elsewhere in the table cannot take the panel down.
fn decode_facilities(datasets: &Datasets) -> Result<Vec<FacilityRecord>, ColumnError> {
    let spec = PanelId::CapitalVsNetRevenue.spec();
    let (caps, net) = numeric_pair(datasets.table(spec.table), spec)?;
    Ok(caps
        .into_iter()
        .zip(net)
        .map(|(capital_expenditure, net_revenue)| FacilityRecord {
            capital_expenditure,
            net_revenue,
        })
        .collect())
}

// ========== Dashboard ==========

/// The composed dashboard: the datasets, their schema report, the filter
/// state and one cached view per panel in render order.
#[derive(Debug)]
pub struct Dashboard {
    datasets: Datasets,
    /// Decoded once; the filtered panel is rebuilt from these on every change.
    facilities: Result<Vec<FacilityRecord>, ColumnError>,
    schema: SchemaReport,
    filter: FilterControl,
    views: Vec<PanelView>,
}

impl Dashboard {
    pub fn compose(datasets: Datasets) -> Self {
        let schema = validate(&datasets);
        if schema.is_ok() {
            info!("all panel columns present");
        }
        let facilities = decode_facilities(&datasets);

        let mut dashboard = Self {
            datasets,
            facilities,
            schema,
            filter: FilterControl::default(),
            views: Vec::with_capacity(PanelId::all().len()),
        };
        let views = PanelId::all()
            .iter()
            .map(|&id| dashboard.build(id))
            .collect();
        dashboard.views = views;
        dashboard
    }

    pub fn datasets(&self) -> &Datasets {
        &self.datasets
    }

    pub fn filter(&self) -> &FilterControl {
        &self.filter
    }

    /// Views in render order.
    pub fn views(&self) -> &[PanelView] {
        &self.views
    }

    pub fn view(&self, id: PanelId) -> &PanelView {
        &self.views[id.index()]
    }

    /// Panels that cannot be drawn, with the reason.
    pub fn failures(&self) -> Vec<(PanelId, &ColumnError)> {
        self.views
            .iter()
            .filter_map(|v| v.body.as_ref().err().map(|e| (v.id, e)))
            .collect()
    }

    /// Feed one control event through the filter. When the control state
    /// changes, only the capital-expenditure panel is rebuilt and returned.
    pub fn handle_filter(&mut self, event: FilterEvent) -> Option<&PanelView> {
        if !self.filter.apply(event) {
            return None;
        }

        let id = PanelId::CapitalVsNetRevenue;
        let view = self.build(id);
        let rows = match &view.body {
            Ok(PanelBody::Scatter(s)) => s.points.len(),
            _ => 0,
        };
        debug!(
            low = self.filter.range().low(),
            high = self.filter.range().high(),
            log_x = self.filter.log_x(),
            rows,
            "filter changed"
        );
        self.views[id.index()] = view;
        Some(&self.views[id.index()])
    }

    fn build(&self, id: PanelId) -> PanelView {
        let body = self.schema.get(id).and_then(|()| self.build_body(id));
        PanelView { id, body }
    }

    /// Each panel decodes only the columns it binds.
    fn build_body(&self, id: PanelId) -> Result<PanelBody, ColumnError> {
        let spec = id.spec();
        let table = self.datasets.table(spec.table);

        let body = match spec.kind {
            ChartKind::Histogram { bins } => {
                let values: Vec<f64> =
                    table.numeric_column(spec.x)?.into_iter().flatten().collect();
                PanelBody::Histogram(HistogramView {
                    bins: histogram(&values, bins),
                })
            }
            ChartKind::HorizontalBar { top } => {
                let revenues = table.numeric_column(spec.x)?;
                let names = labels(table, spec.y, revenues.len())?;
                let counties: Vec<CountyAggregate> = names
                    .into_iter()
                    .zip(revenues)
                    .map(|(name, revenue)| CountyAggregate {
                        name: name.unwrap_or_default(),
                        revenue,
                    })
                    .collect();
                let bars = top_by_revenue(&counties, top)
                    .into_iter()
                    .rev()
                    .map(|c| (c.name.clone(), c.revenue.unwrap_or_default()))
                    .collect();
                PanelBody::Bars(BarView { bars })
            }
            ChartKind::Scatter if spec.log_x_toggle => {
                let facilities = self.facilities.as_deref().map_err(ColumnError::clone)?;
                let filtered = filter_by_capital_expenditure(facilities, self.filter.range());
                PanelBody::Scatter(scatter(
                    filtered,
                    |f| (f.capital_expenditure, f.net_revenue, None),
                    self.filter.log_x(),
                ))
            }
            ChartKind::Scatter => {
                let (xs, ys) = numeric_pair(table, spec)?;
                let names = labels(table, spec.hover, xs.len())?;
                PanelBody::Scatter(scatter(
                    xs.into_iter().zip(ys).zip(names),
                    |((x, y), label)| (*x, *y, label.clone()),
                    false,
                ))
            }
        };
        Ok(body)
    }
}
