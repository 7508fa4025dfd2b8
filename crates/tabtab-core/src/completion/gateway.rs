use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use tracing::warn;

use super::{build_prompt, parse_reply, CompletionBackend, CompletionRequest};

/// A validated completion round, tagged with the buffer generation of the
/// request it answers. The session discards outcomes whose generation no
/// longer matches.
pub struct CompletionOutcome {
    pub generation: u64,
    pub completions: Vec<String>,
}

/// Fire-and-forget bridge to the completion service.
///
/// One named worker thread owns the network round trip; the event loop
/// submits requests and polls `try_recv`. Queued work is drained to the
/// latest item and generation staleness is checked both before and after the
/// slow step, so a late reply can never overtake newer input. Failed rounds
/// (transport or protocol) are logged and dropped — the caller simply sees
/// no AI candidates.
pub struct CompletionGateway {
    tx: mpsc::Sender<CompletionRequest>,
    rx: Mutex<mpsc::Receiver<CompletionOutcome>>,
    current_gen: Arc<AtomicU64>,
}

impl CompletionGateway {
    pub fn new<B: CompletionBackend>(backend: B, max_chars: usize) -> Self {
        let current_gen = Arc::new(AtomicU64::new(0));

        let (work_tx, work_rx) = mpsc::channel::<CompletionRequest>();
        let (result_tx, result_rx) = mpsc::channel::<CompletionOutcome>();
        {
            let gen = Arc::clone(&current_gen);
            thread::Builder::new()
                .name("tabtab-completion".into())
                .spawn(move || completion_worker(work_rx, result_tx, gen, backend, max_chars))
                .expect("failed to spawn completion worker");
        }

        Self {
            tx: work_tx,
            rx: Mutex::new(result_rx),
            current_gen,
        }
    }

    /// Dispatch a request. Never blocks; the result (if the round survives)
    /// arrives via `try_recv`.
    pub fn submit(&self, request: CompletionRequest) {
        self.current_gen.store(request.generation, Ordering::SeqCst);
        let _ = self.tx.send(request);
    }

    /// Mark `generation` as the only one still worth answering. In-flight
    /// work for older generations is dropped on arrival.
    pub fn invalidate(&self, generation: u64) {
        self.current_gen.store(generation, Ordering::SeqCst);
    }

    pub fn try_recv(&self) -> Option<CompletionOutcome> {
        let rx = self.rx.lock().ok()?;
        rx.try_recv().ok()
    }
}

fn completion_worker<B: CompletionBackend>(
    rx: mpsc::Receiver<CompletionRequest>,
    tx: mpsc::Sender<CompletionOutcome>,
    gen: Arc<AtomicU64>,
    backend: B,
    max_chars: usize,
) {
    while let Ok(work) = rx.recv() {
        // Drain: if multiple requests queued, only the latest matters.
        let mut latest = work;
        while let Ok(newer) = rx.try_recv() {
            latest = newer;
        }

        // Check staleness before paying for the round trip.
        if latest.generation != gen.load(Ordering::SeqCst) {
            continue;
        }

        let prompt = build_prompt(&latest, max_chars);
        let completions = match backend
            .complete(&prompt)
            .and_then(|raw| parse_reply(&raw, max_chars))
        {
            Ok(completions) => completions,
            Err(err) => {
                warn!(generation = latest.generation, %err, "dropping completion round");
                continue;
            }
        };

        // The buffer may have moved on while we waited on the network.
        if latest.generation != gen.load(Ordering::SeqCst) {
            continue;
        }

        let _ = tx.send(CompletionOutcome {
            generation: latest.generation,
            completions,
        });
    }
}
