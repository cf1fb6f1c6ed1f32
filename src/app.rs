use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    DefaultTerminal, Frame,
};

use crate::filter::{FilterEvent, Handle};
use crate::panels::{Dashboard, PanelBody};
use crate::schema::PanelId;
use crate::ui::charts::render_panel;
use crate::ui::{render_dashboard, render_help_bar, render_title_bar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Zoom,
}

pub struct App {
    dashboard: Dashboard,
    focus: PanelId,
    overlay: Overlay,
    /// Index into the focused scatter panel's points.
    cursor: Option<usize>,
    should_quit: bool,
}

impl App {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            focus: PanelId::BedsVsRevenue,
            overlay: Overlay::None,
            cursor: None,
            should_quit: false,
        }
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            if self.handle_events()? {
                break;
            }
        }
        Ok(())
    }

    fn handle_events(&mut self) -> Result<bool> {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(self.handle_key(key.code));
            }
        }
        Ok(false)
    }

    /// Returns true when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        // Zoom overlay swallows its close keys; everything else still works
        if self.overlay == Overlay::Zoom {
            if let KeyCode::Esc | KeyCode::Enter | KeyCode::Char('z') = code {
                self.overlay = Overlay::None;
                return false;
            }
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                return true;
            }
            KeyCode::Tab => self.set_focus(self.focus.next()),
            KeyCode::BackTab => self.set_focus(self.focus.prev()),
            KeyCode::Enter | KeyCode::Char('z') => self.overlay = Overlay::Zoom,
            KeyCode::Char('n') => self.step_cursor(true),
            KeyCode::Char('p') => self.step_cursor(false),
            KeyCode::Left | KeyCode::Char('h') => self.filter(FilterEvent::Decrease),
            KeyCode::Right | KeyCode::Char('l') => self.filter(FilterEvent::Increase),
            KeyCode::Up | KeyCode::Char('k') => self.filter(FilterEvent::Select(Handle::High)),
            KeyCode::Down | KeyCode::Char('j') => self.filter(FilterEvent::Select(Handle::Low)),
            KeyCode::Char('s') => self.filter(FilterEvent::ToggleHandle),
            KeyCode::Home => self.filter(FilterEvent::JumpToMin),
            KeyCode::End => self.filter(FilterEvent::JumpToMax),
            KeyCode::Char('x') => self.filter(FilterEvent::ToggleLogScale),
            KeyCode::Char('r') => self.filter(FilterEvent::Reset),
            _ => {}
        }
        false
    }

    fn set_focus(&mut self, focus: PanelId) {
        self.focus = focus;
        self.cursor = None;
    }

    fn filter(&mut self, event: FilterEvent) {
        let changed = self.dashboard.handle_filter(event).map(|view| view.id);
        if changed == Some(self.focus) {
            self.cursor = None;
        }
    }

    fn step_cursor(&mut self, forward: bool) {
        let len = match &self.dashboard.view(self.focus).body {
            Ok(PanelBody::Scatter(s)) => s.points.len(),
            _ => 0,
        };
        if len == 0 {
            self.cursor = None;
            return;
        }
        self.cursor = Some(match (self.cursor, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        });
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.area());

        render_title_bar(frame, chunks[0], &self.dashboard);
        render_dashboard(frame, chunks[1], &self.dashboard, self.focus, self.cursor);
        render_help_bar(frame, chunks[2]);

        if self.overlay == Overlay::Zoom {
            let view = self.dashboard.view(self.focus);
            self.render_overlay(frame, |f, area| render_panel(f, area, view, true, self.cursor));
        }
    }

    fn render_overlay<F>(&self, frame: &mut Frame, render_fn: F)
    where
        F: FnOnce(&mut Frame, Rect),
    {
        let area = frame.area();

        // Center the overlay, taking 80% of screen
        let popup_width = (area.width as f32 * 0.8) as u16;
        let popup_height = (area.height as f32 * 0.8) as u16;
        let popup_x = (area.width - popup_width) / 2;
        let popup_y = (area.height - popup_height) / 2;

        let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

        // Clear the area behind the popup
        frame.render_widget(Clear, popup_area);

        render_fn(frame, popup_area);

        if popup_height < 3 || popup_width < 5 {
            return;
        }

        // Hint just below the top border
        let hint = Paragraph::new(Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::DarkGray)),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::styled(" or ", Style::default().fg(Color::DarkGray)),
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::styled(" to close", Style::default().fg(Color::DarkGray)),
        ]));
        let hint_area = Rect::new(popup_x + 2, popup_y + 1, popup_width - 4, 1);
        frame.render_widget(hint, hint_area);
    }
}
