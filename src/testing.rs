//! Scripted stand-ins for the network seams.
use crate::engine::Evaluation;
use crate::engine::EvaluationError;
use crate::engine::Evaluator;
use crate::engine::Score;
use crate::lichess::Route;
use crate::lichess::StreamError;
use crate::lichess::Streamer;
use crate::ndjson::Lines;
use crate::throttle::AnalysisRequest;
use crate::throttle::Analyst;
use futures::StreamExt;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;

pub type Feed = mpsc::UnboundedSender<Result<String, StreamError>>;

enum Plan {
    Refuse(StreamError),
    Stall,
    Serve(mpsc::UnboundedReceiver<Result<String, StreamError>>),
}

/// [`Streamer`] answering each open with the next planned response for its
/// route. Unplanned opens fail with a transport error.
#[derive(Default)]
pub struct Script {
    plans: Mutex<HashMap<Route, VecDeque<Plan>>>,
    opened: Mutex<Vec<(Route, String)>>,
}

impl Script {
    /// Next open of `route` succeeds; lines sent on the feed arrive in order
    /// and dropping the feed ends the body.
    pub fn serve(&self, route: Route) -> Feed {
        let (tx, rx) = mpsc::unbounded_channel();
        self.plan(route, Plan::Serve(rx));
        tx
    }

    /// Next open of `route` fails with `error`.
    pub fn refuse(&self, route: Route, error: StreamError) {
        self.plan(route, Plan::Refuse(error));
    }

    /// Next open of `route` never answers.
    pub fn stall(&self, route: Route) {
        self.plan(route, Plan::Stall);
    }

    /// How many times `route` was opened.
    pub fn opened(&self, route: &Route) -> usize {
        self.opened
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| r == route)
            .count()
    }

    /// Tokens presented, in open order.
    pub fn tokens(&self) -> Vec<String> {
        self.opened
            .lock()
            .unwrap()
            .iter()
            .map(|(_, t)| t.clone())
            .collect()
    }

    fn plan(&self, route: Route, plan: Plan) {
        self.plans
            .lock()
            .unwrap()
            .entry(route)
            .or_default()
            .push_back(plan);
    }
}

#[async_trait::async_trait]
impl Streamer for Script {
    async fn open(&self, route: &Route, token: &str) -> Result<Lines, StreamError> {
        self.opened
            .lock()
            .unwrap()
            .push((route.clone(), token.to_string()));
        let plan = self
            .plans
            .lock()
            .unwrap()
            .get_mut(route)
            .and_then(VecDeque::pop_front);
        match plan {
            Some(Plan::Refuse(e)) => Err(e),
            Some(Plan::Stall) => futures::future::pending().await,
            Some(Plan::Serve(rx)) => Ok(futures::stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|line| (line, rx))
            })
            .boxed()),
            None => Err(StreamError::Transport("unscripted".to_string())),
        }
    }
}

/// [`Evaluator`] with a canned answer, remembering every call.
#[derive(Default)]
pub struct Scorer {
    failing: bool,
    depth: Option<u8>,
    calls: Mutex<Vec<(String, u8)>>,
}

impl Scorer {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }
    pub fn at_depth(depth: u8) -> Self {
        Self {
            depth: Some(depth),
            ..Self::default()
        }
    }
    pub fn calls(&self) -> Vec<(String, u8)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Evaluator for Scorer {
    async fn evaluate(&self, fen: &str, depth: u8) -> Result<Evaluation, EvaluationError> {
        self.calls.lock().unwrap().push((fen.to_string(), depth));
        match self.failing {
            true => Err(EvaluationError::Status(500)),
            false => Ok(Evaluation {
                best_move: Some("e2e4".to_string()),
                score: Some(Score::centipawns(20.0)),
                depth: self.depth,
                ..Evaluation::default()
            }),
        }
    }
}

/// [`Analyst`] remembering what reached it and when.
#[derive(Default)]
pub struct Recorder {
    seen: Mutex<Vec<(AnalysisRequest, Instant)>>,
}

impl Recorder {
    pub fn seen(&self) -> Vec<(AnalysisRequest, Instant)> {
        self.seen.lock().unwrap().clone()
    }
    pub fn fens(&self) -> Vec<String> {
        self.seen().into_iter().map(|(r, _)| r.fen).collect()
    }
}

#[async_trait::async_trait]
impl Analyst for Recorder {
    async fn analyze(&self, request: AnalysisRequest) {
        self.seen.lock().unwrap().push((request, Instant::now()));
    }
}
