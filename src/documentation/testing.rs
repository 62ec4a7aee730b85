//! Scripted generation service for orchestration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, stream};

use super::board::UnitBoard;
use super::unit::UnitStatus;
use crate::ai::provider::{ByteStream, GenerationRequest, GenerationService};
use crate::ai::stream::{StreamEvent, TokenUsage};
use crate::types::{ContentAccessor, DirectoryNode, DocError, Result, StateCell};

/// Scripted answer for one unit
pub enum Reply {
    /// Content records, a `usage(10, 3)` record, then `done`
    Deltas(Vec<&'static str>),
    /// Exact byte chunks
    Raw(Vec<Vec<u8>>),
    /// Non-success HTTP status before streaming
    Status(u16),
}

/// Records requests and the board as seen at each dispatch
pub struct FakeService {
    board: Arc<StateCell<UnitBoard>>,
    scripts: Mutex<HashMap<String, Reply>>,
    requests: Mutex<Vec<GenerationRequest>>,
    observed: Mutex<Vec<Vec<&'static str>>>,
    latency: Mutex<Duration>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

/// Counts a response stream as in flight until it is dropped
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FakeService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            board: Arc::new(StateCell::new(UnitBoard::empty())),
            scripts: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            observed: Mutex::new(Vec::new()),
            latency: Mutex::new(Duration::ZERO),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn board(&self) -> Arc<StateCell<UnitBoard>> {
        Arc::clone(&self.board)
    }

    /// Script the reply for a unit id (`"combined"` or a file path)
    pub fn script(&self, unit: &str, reply: Reply) {
        self.scripts.lock().unwrap().insert(unit.to_string(), reply);
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn observed_statuses(&self) -> Vec<Vec<&'static str>> {
        self.observed.lock().unwrap().clone()
    }

    /// Delay before each response stream yields its first chunk
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    /// Highest number of response streams open at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationService for FakeService {
    async fn generate(&self, request: &GenerationRequest) -> Result<ByteStream> {
        let board = self.board.snapshot();
        self.observed
            .lock()
            .unwrap()
            .push(board.units.iter().map(|u| u.status.label()).collect());
        self.requests.lock().unwrap().push(request.clone());

        let unit = board
            .units
            .iter()
            .find(|u| u.status == UnitStatus::Generating)
            .map(|u| u.id.as_str().to_string())
            .unwrap_or_default();
        let reply = self
            .scripts
            .lock()
            .unwrap()
            .remove(&unit)
            .unwrap_or_else(|| Reply::Deltas(vec!["Docs for ", "the file"]));

        let chunks = match reply {
            Reply::Status(status) => {
                return Err(DocError::request_failed(
                    status,
                    format!("endpoint returned {}", status),
                ));
            }
            Reply::Raw(chunks) => chunks,
            Reply::Deltas(deltas) => {
                let mut events: Vec<StreamEvent> = deltas
                    .into_iter()
                    .map(|d| StreamEvent::Content {
                        content: d.to_string(),
                    })
                    .collect();
                events.push(StreamEvent::Usage {
                    usage: TokenUsage::new(10, 3),
                });
                events.push(StreamEvent::Done);
                events
                    .iter()
                    .map(|e| e.to_record().into_bytes())
                    .collect()
            }
        };
        let open = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(open, Ordering::SeqCst);
        let guard = InFlight(Arc::clone(&self.in_flight));
        let latency = *self.latency.lock().unwrap();

        let delay = stream::once(tokio::time::sleep(latency))
            .filter_map(|()| async { None::<Result<Vec<u8>>> });
        Ok(delay
            .chain(stream::iter(chunks.into_iter().map(Ok)))
            .map(move |chunk| {
                let _open = &guard;
                chunk
            })
            .boxed())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// `a.ts`, `b.ts`, `src/c.ts`, each holding `content of <stem>`
pub fn tree() -> Vec<DirectoryNode> {
    let file = |name: &str, path: &str, stem: &str| {
        DirectoryNode::file(
            name,
            path,
            ContentAccessor::from_bytes(format!("content of {}", stem)),
        )
    };
    vec![
        DirectoryNode::directory("src", "src", vec![file("c.ts", "src/c.ts", "c")]),
        file("a.ts", "a.ts", "a"),
        file("b.ts", "b.ts", "b"),
    ]
}
