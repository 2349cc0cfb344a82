use std::time::Duration;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Paragraph, Widget},
};

#[derive(Default)]
pub struct DebugState {
    pub num_events: usize,
    pub num_frames: usize,
    pub num_key_events: usize,
    pub last_key_event_name: String,
    pub last_type_name: String,
    /// Last action taken (e.g. "focus_next") for debugging key handling.
    pub last_action: String,
    /// How long the last filter/aggregate pass took.
    pub last_evaluation: Option<Duration>,
    pub evaluations: usize,
    pub enabled: bool,
    /// Append pipeline timings to the debug line.
    pub show_performance: bool,
}

impl DebugState {
    pub fn on_key(&mut self, event: &crossterm::event::KeyEvent) {
        self.num_key_events += 1;
        self.last_key_event_name = format!("{:?}", event.code);
        self.last_type_name = format!("{:?}", event.kind);
    }

    pub fn on_evaluation(&mut self, elapsed: Duration) {
        self.evaluations += 1;
        self.last_evaluation = Some(elapsed);
    }
}

impl Widget for &DebugState {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut line = format!(
            "events={} keys={} last_key={} kind={} last_action={} frames={}",
            self.num_events,
            self.num_key_events,
            self.last_key_event_name,
            self.last_type_name,
            self.last_action,
            self.num_frames,
        );
        if self.show_performance {
            let eval = self
                .last_evaluation
                .map(|d| format!("{:.2}ms", d.as_secs_f64() * 1000.0))
                .unwrap_or_else(|| "-".to_string());
            line.push_str(&format!(" evals={} eval={}", self.evaluations, eval));
        }
        Paragraph::new(line).render(area, buf);
    }
}
