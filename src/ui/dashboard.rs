use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use crate::panels::Dashboard;
use crate::schema::PanelId;
use crate::ui::charts::render_panel;
use crate::ui::filter::{render_filter_control, FILTER_CONTROL_HEIGHT};

/// Screen regions for the six panels and the filter control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardLayout {
    panels: [Rect; 6],
    pub filter: Rect,
}

impl DashboardLayout {
    /// Three bands sized by the panels' pixel height hints:
    /// A | (B over C), then filter + D centered, then E | F.
    pub fn new(area: Rect) -> Self {
        let height = |id: PanelId| id.spec().height;
        let top = height(PanelId::BedsVsRevenue)
            .max(height(PanelId::NetVsOperatingExpenses) + height(PanelId::PopulationHistogram));
        let middle = height(PanelId::CapitalVsNetRevenue);
        let bottom = height(PanelId::TopCounties).max(height(PanelId::BedsPerThousandVsRevenue));

        let bands = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Fill(top),
                Constraint::Fill(middle),
                Constraint::Fill(bottom),
            ])
            .split(area);

        let two_to_one = |band: Rect| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Fill(2), Constraint::Fill(1)])
                .split(band)
        };

        // === Top: A | B over C ===
        let top_cols = two_to_one(bands[0]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Fill(height(PanelId::NetVsOperatingExpenses)),
                Constraint::Fill(height(PanelId::PopulationHistogram)),
            ])
            .split(top_cols[1]);

        // === Middle: filter control over D, centered 1:6:1 ===
        let middle_cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Fill(6), Constraint::Fill(1)])
            .split(bands[1]);
        let center = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(FILTER_CONTROL_HEIGHT), Constraint::Min(0)])
            .split(middle_cols[1]);

        // === Bottom: E | F ===
        let bottom_cols = two_to_one(bands[2]);

        Self {
            panels: [
                top_cols[0],
                right[0],
                right[1],
                center[1],
                bottom_cols[0],
                bottom_cols[1],
            ],
            filter: center[0],
        }
    }

    pub fn panel(&self, id: PanelId) -> Rect {
        self.panels[id.index()]
    }
}

/// One render pass: every panel in order, the filter control just before
/// the panel it drives.
pub fn render_dashboard(
    frame: &mut Frame,
    area: Rect,
    dashboard: &Dashboard,
    focus: PanelId,
    cursor: Option<usize>,
) {
    let layout = DashboardLayout::new(area);

    for view in dashboard.views() {
        if view.id == PanelId::CapitalVsNetRevenue {
            render_filter_control(frame, layout.filter, dashboard.filter());
        }
        let focused = view.id == focus;
        render_panel(
            frame,
            layout.panel(view.id),
            view,
            focused,
            cursor.filter(|_| focused),
        );
    }
}


#[cfg(test)]
mod render_tests {
    use super::*;
    use crate::filter::FilterEvent;
    use crate::panels::tests::{dashboard_from, scenario};
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(dashboard: &Dashboard) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 60)).unwrap();
        terminal
            .draw(|f| render_dashboard(f, f.area(), dashboard, PanelId::BedsVsRevenue, None))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_every_panel_titled() {
        let screen = draw(&scenario());
        for id in PanelId::all() {
            assert!(screen.contains(id.spec().title), "missing {}", id.spec().title);
        }
        assert!(screen.contains("Capital Expenditure Range"));
        assert!(screen.contains("[ ] Log Scale for X-Axis (CAP_EXP)"));
    }

    #[test]
    fn test_empty_selection_draws_empty_plot() {
        let mut dash = scenario();
        for _ in 0..60 {
            dash.handle_filter(FilterEvent::Increase);
        }
        let screen = draw(&dash);
        assert!(screen.contains("no rows in range"));
        assert!(!screen.contains("ERROR"));
    }

    #[test]
    fn test_column_error_shown_in_its_panel_only() {
        let dash = dashboard_from(
            "FAC_NAME,AVL_BEDS,GRIP_TOT,TOT_OP_EXP,NET_TOT\nA,1,2,3,4\n",
            "COUNTY_NAME,REVENUE,AVL_BEDS_PER_THOUSAND\nKern,10,1\n",
            "POPULATION\n5\n",
        );
        let screen = draw(&dash);
        assert!(screen.contains("column `CAP_EXP` not found in table `hospital`"));
        assert_eq!(screen.matches("ERROR: ").count(), 1);
        assert!(screen.contains("Kern"));
    }
}
