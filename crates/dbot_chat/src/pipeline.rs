//! Message pipeline.
//!
//! One pipeline is one chat session. It owns the resolver, the conversation
//! state machine and the history store, and talks to the UI through a
//! [`ChatSurface`].
//!
//! ```text
//! submit(text) ──▶ user message shown ──▶ resolve ──▶ reply queue (FIFO)
//!                                                        │
//!                                     reply worker ◀─────┘
//!                                     typing delay ─▶ state machine ─▶ bot message shown
//! ```
//!
//! Replies are produced by a single worker task, so they are emitted in
//! submission order no matter how the random typing delays fall.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ChatConfig;
use crate::error::{ChatError, ChatResult};
use crate::history::{FileHistory, HistoryStore, MemoryHistory};
use crate::knowledge::KnowledgeBase;
use crate::resolver::IntentResolver;
use crate::state::{ConversationState, ConversationStateMachine};
use crate::types::{Message, ResponsePayload};

/// Mixed into the configured seed so delays and tips use distinct streams
const DELAY_SEED_SALT: u64 = 0x5eed_de1a;

/// Outbound side of the UI.
///
/// Callbacks run while the pipeline holds its surface slot; implementations
/// must not call back into [`MessagePipeline`] from inside them.
pub trait ChatSurface: Send + Sync {
    /// A user message was accepted (trimmed, never empty)
    fn on_user_message(&self, text: &str);

    /// A bot reply is ready; `body` is raw, see [`crate::render::render_bot_body`]
    fn on_bot_message(&self, body: &str, is_structured: bool);

    fn on_typing_started(&self) {}

    fn on_typing_stopped(&self) {}
}

enum Outbound {
    User(String),
    Bot { body: String, is_structured: bool },
}

/// Attached surface plus whatever was emitted while none was attached
#[derive(Default)]
struct SurfaceSlot {
    surface: Option<Arc<dyn ChatSurface>>,
    undelivered: VecDeque<Outbound>,
}

impl SurfaceSlot {
    fn deliver(&mut self, outbound: Outbound) {
        match &self.surface {
            Some(surface) => send_to(surface.as_ref(), &outbound),
            None => self.undelivered.push_back(outbound),
        }
    }
}

fn send_to(surface: &dyn ChatSurface, outbound: &Outbound) {
    match outbound {
        Outbound::User(text) => surface.on_user_message(text),
        Outbound::Bot {
            body,
            is_structured,
        } => surface.on_bot_message(body, *is_structured),
    }
}

/// Session context shared with the reply worker
struct Session {
    kb: Arc<KnowledgeBase>,
    resolver: Mutex<IntentResolver>,
    state: Mutex<ConversationStateMachine>,
    surface: Mutex<SurfaceSlot>,
    history: Arc<dyn HistoryStore>,
}

impl Session {
    fn record(&self, message: &Message) {
        if let Err(e) = self.history.record(message) {
            warn!("Failed to record {:?} message: {}", message.role, e);
        }
    }

    fn emit_user(&self, text: &str) {
        self.record(&Message::user(text));
        self.surface.lock().deliver(Outbound::User(text.to_string()));
    }

    fn emit_bot(&self, payload: &ResponsePayload) {
        self.record(&payload.to_message());
        self.surface.lock().deliver(Outbound::Bot {
            body: payload.body.clone(),
            is_structured: payload.is_structured,
        });
    }

    fn typing(&self, started: bool) {
        let slot = self.surface.lock();
        if let Some(surface) = &slot.surface {
            if started {
                surface.on_typing_started();
            } else {
                surface.on_typing_stopped();
            }
        }
    }

    /// Greet if this is the first display request of a fresh session
    fn greet(&self) {
        let has_prior_history = self.history.has_prior_history();
        let greeting = self
            .state
            .lock()
            .start(has_prior_history, self.kb.templates());
        if let Some(payload) = greeting {
            self.emit_bot(&payload);
        }
    }
}

struct ReplyJob {
    payload: ResponsePayload,
    done: oneshot::Sender<ResponsePayload>,
}

/// Completion of one submitted message
pub struct ReplyHandle {
    rx: oneshot::Receiver<ResponsePayload>,
}

impl ReplyHandle {
    /// Wait until the reply has been emitted; yields what was shown
    pub async fn wait(self) -> ChatResult<ResponsePayload> {
        self.rx.await.map_err(|_| ChatError::PipelineClosed)
    }
}

/// A chat session: accepts user messages and emits bot replies in order
pub struct MessagePipeline {
    session: Arc<Session>,
    queue: Mutex<Option<mpsc::UnboundedSender<ReplyJob>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl MessagePipeline {
    /// Start a session. Fails with [`ChatError::NoRuntime`] outside a Tokio
    /// runtime.
    ///
    /// The history store is asked once whether prior history exists; a fresh
    /// session emits the greeting immediately (buffered until a surface is
    /// attached).
    pub fn new(
        kb: Arc<KnowledgeBase>,
        history: Arc<dyn HistoryStore>,
        config: &ChatConfig,
    ) -> ChatResult<Self> {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ChatError::NoRuntime(e.to_string()))?;

        let (resolver, delay_rng) = match config.seed {
            Some(seed) => (
                IntentResolver::with_seed(Arc::clone(&kb), seed),
                StdRng::seed_from_u64(seed ^ DELAY_SEED_SALT),
            ),
            None => (IntentResolver::new(Arc::clone(&kb)), StdRng::from_entropy()),
        };

        let session = Arc::new(Session {
            kb,
            resolver: Mutex::new(resolver),
            state: Mutex::new(ConversationStateMachine::new()),
            surface: Mutex::new(SurfaceSlot::default()),
            history,
        });

        let (tx, rx) = mpsc::unbounded_channel();
        let worker = runtime.spawn(run_reply_worker(
            Arc::clone(&session),
            rx,
            delay_rng,
            config.typing_delay_bounds(),
        ));

        session.greet();
        info!("Chat session started");

        Ok(Self {
            session,
            queue: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Build a session from configuration: knowledge file or the built-in
    /// knowledge base, file history or in-memory history
    pub fn from_config(config: &ChatConfig) -> ChatResult<Self> {
        let kb = match &config.knowledge_path {
            Some(path) => KnowledgeBase::from_file(path)?,
            None => KnowledgeBase::default(),
        };

        let history: Arc<dyn HistoryStore> = match &config.history_dir {
            Some(dir) => Arc::new(FileHistory::new(dir)),
            None => Arc::new(MemoryHistory::new()),
        };

        Self::new(Arc::new(kb), history, config)
    }

    /// Submit raw user text.
    ///
    /// Whitespace-only input is ignored and yields `None`. Otherwise the
    /// user message is shown right away, the reply is resolved now and
    /// queued behind any pending replies.
    pub fn submit(&self, raw_text: &str) -> ChatResult<Option<ReplyHandle>> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let queue = self.queue.lock();
        let tx = queue.as_ref().ok_or(ChatError::PipelineClosed)?;

        self.session.emit_user(text);
        let payload = self.session.resolver.lock().resolve(text);

        let (done, rx) = oneshot::channel();
        tx.send(ReplyJob { payload, done })
            .map_err(|_| ChatError::PipelineClosed)?;

        Ok(Some(ReplyHandle { rx }))
    }

    /// Attach (or replace) the surface and flush anything emitted meanwhile
    pub fn attach_surface(&self, surface: Arc<dyn ChatSurface>) {
        let mut slot = self.session.surface.lock();
        while let Some(outbound) = slot.undelivered.pop_front() {
            send_to(surface.as_ref(), &outbound);
        }
        slot.surface = Some(surface);
        debug!("Surface attached");
    }

    /// Detach the surface. Pending replies keep going and are buffered.
    pub fn detach_surface(&self) -> Option<Arc<dyn ChatSurface>> {
        debug!("Surface detached");
        self.session.surface.lock().surface.take()
    }

    pub fn state(&self) -> ConversationState {
        self.session.state.lock().snapshot()
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.session.kb
    }

    /// Recorded transcript
    pub fn transcript(&self) -> ChatResult<Vec<Message>> {
        self.session.history.load()
    }

    /// Reseed tip selection
    pub fn reseed(&self, seed: u64) {
        self.session.resolver.lock().reseed(seed);
    }

    /// Clear history and start over as a fresh session. Replies already
    /// queued are still emitted.
    pub fn clear_session(&self) -> ChatResult<()> {
        self.session.history.clear()?;
        self.session.state.lock().reset();
        info!("Chat session cleared");
        self.session.greet();
        Ok(())
    }

    /// Stop accepting messages, emit every queued reply, then stop the worker
    pub async fn shutdown(&self) -> ChatResult<()> {
        drop(self.queue.lock().take());

        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            worker
                .await
                .map_err(|e| ChatError::WorkerFailed(e.to_string()))?;
        }
        Ok(())
    }
}

fn sample_delay(rng: &mut StdRng, (min, max): (Duration, Duration)) -> Duration {
    if min >= max {
        return min;
    }
    let millis = rng.gen_range(min.as_millis() as u64..=max.as_millis() as u64);
    Duration::from_millis(millis)
}

async fn run_reply_worker(
    session: Arc<Session>,
    mut rx: mpsc::UnboundedReceiver<ReplyJob>,
    mut rng: StdRng,
    bounds: (Duration, Duration),
) {
    while let Some(job) = rx.recv().await {
        let delay = sample_delay(&mut rng, bounds);

        session.typing(true);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        session.typing(false);

        let emitted = session
            .state
            .lock()
            .on_response(job.payload, session.kb.templates());
        session.emit_bot(&emitted);
        debug!(intent = emitted.intent.label(), delay_ms = delay.as_millis() as u64, "Reply emitted");

        // the submitter may have dropped its handle
        let _ = job.done.send(emitted);
    }
    debug!("Reply worker stopped");
}
