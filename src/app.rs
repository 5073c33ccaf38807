use futures_util::FutureExt;
use ratatui::layout::Rect;
use ratatui::text::Text;
use ratatui::widgets::{Paragraph, Wrap};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use ragchat::{AnswerClient, AnswerError, ExchangeController, Submission};

use crate::ui;

/// Result of the start-up `/health` probe, shown in the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    Checking,
    Online,
    Unreachable,
}

pub struct App {
    pub should_quit: bool,
    pub exchange: ExchangeController,
    pub endpoint: String,
    pub service_status: ServiceStatus,

    // Chat view state
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the chat area
    pub chat_width: u16,  // inner width, for wrapped line counts
    pub chat_area: Option<Rect>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    health_task: Option<JoinHandle<Result<String, AnswerError>>>,
}

impl App {
    pub fn new(exchange: ExchangeController, endpoint: String) -> Self {
        Self {
            should_quit: false,
            exchange,
            endpoint,
            service_status: ServiceStatus::Checking,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,
            animation_frame: 0,
            health_task: None,
        }
    }

    /// Probe the service in the background; the result only feeds the header.
    pub fn start_health_probe(&mut self, client: AnswerClient) {
        self.health_task = Some(tokio::spawn(async move { client.health().await }));
    }

    pub fn on_tick(&mut self) {
        if self.exchange.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        if self.exchange.poll_response() {
            self.scroll_to_bottom();
        }
        self.poll_health();
    }

    pub fn submit(&mut self) {
        if self.exchange.submit_draft() == Submission::Accepted {
            self.animation_frame = 0;
            self.scroll_to_bottom();
        }
    }

    pub fn reset_session(&mut self) {
        if self.exchange.reset() {
            self.chat_scroll = 0;
        }
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn half_page(&self) -> u16 {
        (self.visible_height() / 2).max(1)
    }

    /// Scroll so the newest line (or the "Thinking..." indicator) is visible
    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
    }

    /// Rendered height of the transcript at the current chat width, using the
    /// same lines and wrapping as `ui::render`
    pub fn transcript_line_count(&self) -> u16 {
        let wrap_width = if self.chat_width > 0 { self.chat_width } else { 50 };

        let lines = ui::chat_lines(
            self.exchange.transcript().messages(),
            self.exchange.is_busy(),
            self.animation_frame,
        );
        let total = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .line_count(wrap_width);

        total.min(u16::MAX as usize) as u16
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    fn max_scroll(&self) -> u16 {
        self.transcript_line_count()
            .saturating_sub(self.visible_height())
    }

    fn poll_health(&mut self) {
        let Some(handle) = self.health_task.as_mut() else {
            return;
        };
        if !handle.is_finished() {
            return;
        }
        let Some(joined) = handle.now_or_never() else {
            return;
        };
        self.health_task = None;

        self.service_status = match joined {
            Ok(Ok(status)) if status == "ok" => {
                info!(endpoint = %self.endpoint, "answer service is healthy");
                ServiceStatus::Online
            }
            Ok(Ok(status)) => {
                warn!(endpoint = %self.endpoint, %status, "answer service reported unexpected status");
                ServiceStatus::Unreachable
            }
            Ok(Err(err)) => {
                warn!(endpoint = %self.endpoint, error = %err, "health probe failed");
                ServiceStatus::Unreachable
            }
            Err(err) => {
                warn!(error = %err, "health probe task failed");
                ServiceStatus::Unreachable
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragchat::AnswerService;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    struct Fixed(&'static str);

    #[async_trait]
    impl AnswerService for Fixed {
        async fn answer(&self, _query: &str) -> Result<String, AnswerError> {
            Ok(self.0.to_string())
        }
    }

    fn app_with(answer: &'static str) -> App {
        App::new(
            ExchangeController::new(Arc::new(Fixed(answer))),
            "http://test".to_string(),
        )
    }

    fn type_draft(app: &mut App, text: &str) {
        for c in text.chars() {
            if let Some(draft) = app.exchange.editable_draft() {
                draft.insert(c);
            }
        }
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn test_submit_scrolls_to_show_thinking_indicator() {
        let mut app = app_with("ok");
        app.chat_width = 10;
        app.chat_height = 4;
        type_draft(&mut app, "a question that wraps");
        app.submit();

        assert!(app.exchange.is_busy());
        let total = app.transcript_line_count();
        // label, at least two wrapped lines, blank, label + "Thinking..."
        assert!(total >= 6);
        assert_eq!(app.chat_scroll, total - 4);

        app.exchange.settle().await;
        assert!(!app.exchange.is_busy());
    }

    #[tokio::test]
    async fn test_end_of_word_wrapped_answer_is_reachable() {
        let mut app = app_with("aaaaaa bbbbbb cccccc dddddd eeeeee ffffff gggggg hhhhhh ENDWORD");
        let mut terminal = Terminal::new(TestBackend::new(12, 12)).unwrap();

        // First frame records the chat dimensions
        terminal.draw(|frame| ui::render(&mut app, frame)).unwrap();

        type_draft(&mut app, "q");
        app.submit();
        app.exchange.settle().await;
        app.scroll_to_bottom();
        terminal.draw(|frame| ui::render(&mut app, frame)).unwrap();

        assert!(
            screen_text(&terminal).contains("ENDWORD"),
            "last word of the answer is not on screen"
        );

        // Manual scrolling is capped at the same place
        app.scroll_up(100);
        app.scroll_down(100);
        terminal.draw(|frame| ui::render(&mut app, frame)).unwrap();
        assert!(screen_text(&terminal).contains("ENDWORD"));
    }

    #[tokio::test]
    async fn test_line_count_covers_every_logical_line() {
        let mut app = app_with("a\n\nb");
        app.chat_width = 40;
        assert_eq!(app.transcript_line_count(), 0);

        type_draft(&mut app, "hi");
        app.submit();
        app.exchange.settle().await;

        // You, hi, blank, Assistant, a, (empty), b, blank
        assert!(app.transcript_line_count() >= 8);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut app = app_with("ok");
        app.chat_width = 10;
        app.chat_height = 4;
        app.scroll_down(5);
        assert_eq!(app.chat_scroll, 0);
        app.scroll_up(5);
        assert_eq!(app.chat_scroll, 0);
        assert_eq!(app.half_page(), 2);
    }
}
