// controller.rs

use std::time::Duration;

use futures::future::BoxFuture;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::buffer::InputBuffer;
use crate::error::EvalError;
use crate::evaluator::{format_number, Evaluator};
use crate::history::{History, HistoryEntry};
use crate::render::Render;
use crate::token::{Operation, Token};

pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(2);

const INVALID_OPERAND: &str = "Invalid input for operation";
const SCIENTIFIC_OFF: &str = "Switch to scientific mode first";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Basic,
    Scientific,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Basic => Mode::Scientific,
            Mode::Scientific => Mode::Basic,
        }
    }
}

/// One submission to the evaluator.
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    Evaluate { expression: String, label: String },
    Scientific { operation: Operation, value: f64 },
}

impl Request {
    /// Expression text recorded in the history.
    pub fn label(&self) -> String {
        match self {
            Request::Evaluate { label, .. } => label.clone(),
            Request::Scientific { operation, value } => {
                format!("{operation}({})", format_number(*value))
            }
        }
    }

    pub fn send<E: Evaluator + ?Sized>(
        &self,
        evaluator: &E,
    ) -> BoxFuture<'static, Result<String, EvalError>> {
        match self {
            Request::Evaluate { expression, .. } => evaluator.evaluate(expression.clone()),
            Request::Scientific { operation, value } => {
                evaluator.evaluate_scientific(*operation, *value)
            }
        }
    }
}

/// Longest decimal number at the start of `text`, after leading whitespace.
pub fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    text[..end].parse().ok()
}

/// Input/history controller. Owns all calculator state; the only way out
/// is through the renderer.
pub struct Controller<R> {
    buffer: InputBuffer,
    mode: Mode,
    history: History,
    renderer: R,
    error: Option<String>,
    reset_at: Option<Instant>,
    reset_delay: Duration,
    in_flight: bool,
}

impl<R: Render> Controller<R> {
    pub fn new(renderer: R, mode: Mode, reset_delay: Duration) -> Self {
        let mut controller = Self {
            buffer: InputBuffer::new(),
            mode,
            history: History::new(),
            renderer,
            error: None,
            reset_at: None,
            reset_delay,
            in_flight: false,
        };
        controller.renderer.set_error(false);
        controller.renderer.set_display_text("");
        controller.renderer.set_history_items(&[]);
        controller.renderer.set_scientific_visible(mode == Mode::Scientific);
        controller
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }
    pub fn history(&self) -> &History {
        &self.history
    }
    pub fn expression(&self) -> String {
        self.buffer.expression()
    }
    pub fn display_text(&self) -> String {
        match &self.error {
            Some(message) => message.clone(),
            None => self.buffer.display(),
        }
    }
    pub fn is_busy(&self) -> bool {
        self.in_flight
    }
    pub fn renderer(&self) -> &R {
        &self.renderer
    }
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn append(&mut self, token: Token) {
        self.settle_error();
        self.buffer.push(token);
        self.refresh_display();
    }

    pub fn delete_last(&mut self) {
        self.settle_error();
        if self.buffer.pop() {
            self.refresh_display();
        }
    }

    pub fn clear(&mut self) {
        self.settle_error();
        self.buffer.clear();
        self.refresh_display();
    }

    pub fn show_history(&mut self) {
        self.renderer.show_history();
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        debug!(mode = ?self.mode, "mode toggled");
        self.renderer
            .set_scientific_visible(self.mode == Mode::Scientific);
    }

    /// Load the result of history entry `index` (0 = newest) as the new input.
    pub fn recall_history(&mut self, index: usize) -> bool {
        let Some(result) = self.history.get(index).map(|e| e.result().to_string()) else {
            debug!(index, "no history entry to recall");
            return false;
        };
        self.settle_error();
        self.buffer.load(&result);
        self.refresh_display();
        true
    }

    pub fn begin_submit(&mut self) -> Option<Request> {
        if self.in_flight {
            debug!("submit ignored, request already in flight");
            return None;
        }
        self.settle_error();
        if self.buffer.is_empty() {
            return None;
        }
        self.in_flight = true;
        Some(Request::Evaluate {
            expression: self.buffer.expression(),
            label: self.buffer.display(),
        })
    }

    pub fn begin_scientific(&mut self, operation: Operation) -> Option<Request> {
        if self.in_flight {
            debug!(%operation, "operation ignored, request already in flight");
            return None;
        }
        self.settle_error();
        if self.mode != Mode::Scientific {
            debug!(%operation, "scientific operation in basic mode");
            self.show_error(SCIENTIFIC_OFF);
            return None;
        }
        if self.buffer.is_empty() {
            return None;
        }
        let Some(value) = leading_number(&self.buffer.expression()) else {
            info!(%operation, "no numeric operand in input");
            self.show_error(INVALID_OPERAND);
            return None;
        };
        self.in_flight = true;
        Some(Request::Scientific { operation, value })
    }

    /// Apply the evaluator's answer to a request started by `begin_*`.
    pub fn finish(&mut self, request: &Request, outcome: Result<String, EvalError>) {
        self.in_flight = false;
        match outcome {
            Ok(result) => {
                let label = request.label();
                info!(expression = %label, %result, "evaluated");
                self.error = None;
                self.reset_at = None;
                self.renderer.set_error(false);
                self.renderer.set_display_text(&result);
                self.history.add(HistoryEntry::new(label, result.as_str()));
                self.renderer.set_history_items(self.history.all());
                self.buffer.load(&result);
            }
            Err(err) => {
                match &err {
                    EvalError::Collaborator(_) => {
                        info!(request = %request.label(), "evaluator rejected request: {err}")
                    }
                    EvalError::Transport(_) => {
                        warn!(request = %request.label(), "evaluation failed: {err}")
                    }
                }
                self.show_error(err.user_message());
            }
        }
    }

    pub async fn submit<E: Evaluator + ?Sized>(&mut self, evaluator: &E) {
        if let Some(request) = self.begin_submit() {
            let outcome = request.send(evaluator).await;
            self.finish(&request, outcome);
        }
    }

    pub async fn scientific<E: Evaluator + ?Sized>(&mut self, evaluator: &E, operation: Operation) {
        if let Some(request) = self.begin_scientific(operation) {
            let outcome = request.send(evaluator).await;
            self.finish(&request, outcome);
        }
    }

    /// When the pending error reset is due, if any.
    pub fn reset_deadline(&self) -> Option<Instant> {
        self.reset_at
    }

    pub fn expire_error(&mut self, now: Instant) {
        if self.reset_at.is_some_and(|at| now >= at) {
            debug!("error display expired");
            self.settle_error();
        }
    }

    fn show_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
        self.reset_at = Some(Instant::now() + self.reset_delay);
        self.renderer.set_error(true);
        self.renderer.set_display_text(message);
    }

    /// Finish a pending error reset early. Cancels the timer and puts the
    /// (now empty) buffer back on the display.
    fn settle_error(&mut self) {
        if self.error.take().is_some() {
            self.reset_at = None;
            self.buffer.clear();
            self.renderer.set_error(false);
            self.refresh_display();
        }
    }

    fn refresh_display(&mut self) {
        let text = self.buffer.display();
        self.renderer.set_display_text(&text);
    }
}
