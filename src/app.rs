// app.rs

use std::collections::VecDeque;

use futures::future::{BoxFuture, FutureExt, OptionFuture};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use crate::command::Command;
use crate::controller::{Controller, Request};
use crate::error::EvalError;
use crate::evaluator::Evaluator;
use crate::render::Render;

/// Input delivered to the event loop by a front end.
#[derive(Debug)]
pub enum Event {
    /// A single keypad command, applied immediately.
    Key(Command),
    /// A parsed line. Its commands run in order, each request finishing
    /// before the next command; `done` fires once the whole line is applied.
    Line(Vec<Command>, oneshot::Sender<()>),
}

type InFlight = BoxFuture<'static, (Request, Result<String, EvalError>)>;

enum Step {
    Continue,
    Request(Request),
    Quit,
}

fn apply<R: Render>(controller: &mut Controller<R>, command: Command) -> Step {
    debug!(?command, "applying");
    match command {
        Command::Append(token) => controller.append(token),
        Command::DeleteLast => controller.delete_last(),
        Command::Clear => controller.clear(),
        Command::ToggleMode => controller.toggle_mode(),
        Command::Recall(index) => {
            controller.recall_history(index);
        }
        Command::Submit => {
            if let Some(request) = controller.begin_submit() {
                return Step::Request(request);
            }
        }
        Command::Scientific(operation) => {
            if let Some(request) = controller.begin_scientific(operation) {
                return Step::Request(request);
            }
        }
        Command::ShowHistory => controller.show_history(),
        Command::Quit => return Step::Quit,
    }
    Step::Continue
}

fn dispatch<E: Evaluator + ?Sized>(evaluator: &E, request: Request) -> InFlight {
    let call = request.send(evaluator);
    async move {
        let outcome = call.await;
        (request, outcome)
    }
    .boxed()
}

/// Drive `controller` from `events` until a quit command arrives or every
/// sender is gone. At most one request is in flight; the error reset timer
/// runs alongside input handling. Input is polled first, and a request
/// still in flight when the loop ends is dropped.
pub async fn run<E, R>(controller: &mut Controller<R>, evaluator: &E, mut events: mpsc::Receiver<Event>)
where
    E: Evaluator + ?Sized,
    R: Render,
{
    let mut pending: Option<InFlight> = None;
    let mut queue: VecDeque<Command> = VecDeque::new();
    let mut done: Option<oneshot::Sender<()>> = None;

    'events: loop {
        while pending.is_none() {
            let Some(command) = queue.pop_front() else {
                break;
            };
            match apply(controller, command) {
                Step::Continue => {}
                Step::Request(request) => pending = Some(dispatch(evaluator, request)),
                Step::Quit => break 'events,
            }
        }
        if pending.is_none() && queue.is_empty() {
            controller.renderer_mut().flush();
            if let Some(done) = done.take() {
                let _ = done.send(());
            }
        }

        let deadline = controller.reset_deadline();
        tokio::select! {
            biased;
            event = events.recv() => match event {
                None => break 'events,
                Some(Event::Key(command)) => match apply(controller, command) {
                    Step::Continue => {}
                    Step::Request(request) => pending = Some(dispatch(evaluator, request)),
                    Step::Quit => break 'events,
                },
                Some(Event::Line(commands, ack)) => {
                    queue.extend(commands);
                    done = Some(ack);
                }
            },
            Some((request, outcome)) = OptionFuture::from(pending.as_mut()) => {
                pending = None;
                controller.finish(&request, outcome);
            }
            Some(()) = OptionFuture::from(deadline.map(sleep_until)) => {
                controller.expire_error(Instant::now());
            }
        }
    }

    controller.renderer_mut().flush();
    if let Some(done) = done.take() {
        let _ = done.send(());
    }
}
