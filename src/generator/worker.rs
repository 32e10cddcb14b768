// src/generator/worker.rs
//! AtlasWorker - Dedicated thread for atlas generation.
//!
//! Threading model:
//! - One named thread per worker, at most one job in flight
//! - A single pending slot: a request made while a job runs replaces any
//!   earlier pending request, so a burst of edits costs one trailing run
//! - Results go back over an mpsc channel; the owner applies them
//!
//! A running job is never interrupted. Dropping the worker discards the
//! pending request and joins the thread after the current job finishes.

use super::{FontGenerator, GeneratorMethod, PaddingMode};
use crate::charset::CharSet;
use crate::color::Rgba;
use crate::effect::{create_renderers, Effect, EffectRenderer};
use crate::error::FontError;
use crate::font::FontMetadata;
use anyhow::{Context, Result};
use log::*;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

struct Slot<Req> {
    pending: Option<Req>,
    running: bool,
    shutdown: bool,
}

struct Shared<Req> {
    slot: Mutex<Slot<Req>>,
    wake: Condvar,
}

/// Runs a job on a background thread, collapsing requests that arrive while
/// a job is running into a single follow-up run with the latest request.
pub struct CoalescingWorker<Req: Send + 'static> {
    name: String,
    shared: Arc<Shared<Req>>,
    handle: Option<JoinHandle<()>>,
}

impl<Req: Send + 'static> CoalescingWorker<Req> {
    /// Spawns the worker thread. Each job's output is sent on the returned
    /// receiver, in completion order.
    pub fn spawn<Out, F>(name: &str, job: F) -> Result<(Self, Receiver<Out>)>
    where
        Out: Send + 'static,
        F: FnMut(Req) -> Out + Send + 'static,
    {
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot {
                pending: None,
                running: false,
                shutdown: false,
            }),
            wake: Condvar::new(),
        });
        let (tx, rx) = channel();

        let thread_shared = Arc::clone(&shared);
        let thread_name = name.to_string();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run(&thread_name, &thread_shared, job, tx))
            .with_context(|| format!("Failed to spawn {} thread", name))?;

        info!("{}: Spawned", name);
        Ok((
            Self {
                name: name.to_string(),
                shared,
                handle: Some(handle),
            },
            rx,
        ))
    }

    /// Schedules `req`, replacing any request still waiting to start.
    /// Returns `false` if the worker is shutting down or has failed.
    pub fn request(&self, req: Req) -> bool {
        let mut slot = match self.shared.slot.lock() {
            Ok(slot) => slot,
            Err(_) => {
                error!("{}: State lock poisoned, dropping request", self.name);
                return false;
            }
        };
        if slot.shutdown {
            return false;
        }
        if slot.pending.replace(req).is_some() {
            debug!("{}: Pending request superseded", self.name);
        }
        self.shared.wake.notify_one();
        true
    }

    /// Whether a job is running or waiting to start.
    pub fn is_busy(&self) -> bool {
        self.shared
            .slot
            .lock()
            .map(|slot| slot.running || slot.pending.is_some())
            .unwrap_or(false)
    }
}

impl<Req: Send + 'static> Drop for CoalescingWorker<Req> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.shared.slot.lock() {
            slot.shutdown = true;
            slot.pending = None;
        }
        self.shared.wake.notify_all();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("{}: Thread panicked", self.name);
            }
        }
        debug!("{}: Shut down", self.name);
    }
}

fn run<Req, Out, F>(name: &str, shared: &Shared<Req>, mut job: F, tx: Sender<Out>)
where
    F: FnMut(Req) -> Out,
{
    info!("{}: Thread started", name);
    loop {
        let req = {
            let Ok(mut slot) = shared.slot.lock() else {
                error!("{}: State lock poisoned, exiting", name);
                return;
            };
            loop {
                if slot.shutdown {
                    info!("{}: Thread exiting", name);
                    return;
                }
                if let Some(req) = slot.pending.take() {
                    slot.running = true;
                    break req;
                }
                slot = match shared.wake.wait(slot) {
                    Ok(slot) => slot,
                    Err(_) => {
                        error!("{}: State lock poisoned, exiting", name);
                        return;
                    }
                };
            }
        };

        trace!("{}: Running job", name);
        let out = job(req);

        if let Ok(mut slot) = shared.slot.lock() {
            slot.running = false;
        }
        if tx.send(out).is_err() {
            info!("{}: Result receiver closed, exiting", name);
            return;
        }
    }
}

/// Everything one atlas pass needs, snapshotted from the caller's state.
pub struct GenerationRequest {
    pub font: FontMetadata,
    pub method: GeneratorMethod,
    pub width: u32,
    pub height: u32,
    pub padding: PaddingMode,
    pub charset: CharSet,
    pub effects: Vec<Box<dyn EffectRenderer>>,
    pub antialias: bool,
    pub fill: Rgba,
}

impl GenerationRequest {
    pub fn new(font: FontMetadata, width: u32, height: u32, charset: CharSet) -> Self {
        Self {
            font,
            method: GeneratorMethod::default(),
            width,
            height,
            padding: PaddingMode::default(),
            charset,
            effects: Vec::new(),
            antialias: true,
            fill: Rgba::WHITE,
        }
    }

    /// Takes a renderer snapshot of each effect; later edits to `effects`
    /// do not reach this request.
    pub fn with_effects(mut self, effects: &[Box<dyn Effect>]) -> Self {
        self.effects = create_renderers(effects);
        self
    }

    pub fn with_method(mut self, method: GeneratorMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_padding(mut self, padding: PaddingMode) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_antialias(mut self, antialias: bool) -> Self {
        self.antialias = antialias;
        self
    }
}

pub type GenerationOutcome = std::result::Result<FontGenerator, FontError>;

/// One synchronous atlas pass.
pub fn run_generation(req: GenerationRequest) -> GenerationOutcome {
    let GenerationRequest {
        font,
        method,
        width,
        height,
        padding,
        charset,
        mut effects,
        antialias,
        fill,
    } = req;
    let padding = padding.resolve(&effects);
    let mut generator = FontGenerator::new(font, method);
    generator.set_fill(fill);
    generator.generate(width, height, &charset, padding, &mut effects, antialias)?;
    Ok(generator)
}

pub type AtlasWorker = CoalescingWorker<GenerationRequest>;

/// Worker bound to [`run_generation`].
pub fn spawn_atlas_worker() -> Result<(AtlasWorker, Receiver<GenerationOutcome>)> {
    CoalescingWorker::spawn("AtlasWorker", run_generation)
}

/// Owner-side holder of the last successfully generated atlas.
#[derive(Default)]
pub struct AtlasSlot {
    current: Option<FontGenerator>,
    last_error: Option<FontError>,
}

impl AtlasSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a finished outcome. A failure is logged and recorded; the atlas
    /// already held stays in place. Returns whether the atlas changed.
    pub fn apply(&mut self, outcome: GenerationOutcome) -> bool {
        match outcome {
            Ok(generator) => {
                self.current = Some(generator);
                self.last_error = None;
                true
            }
            Err(e) => {
                warn!("AtlasSlot: Generation failed, keeping previous atlas: {}", e);
                self.last_error = Some(e);
                false
            }
        }
    }

    /// Applies every outcome already waiting on `rx` without blocking.
    pub fn drain(&mut self, rx: &Receiver<GenerationOutcome>) -> bool {
        let mut changed = false;
        loop {
            match rx.try_recv() {
                Ok(outcome) => changed |= self.apply(outcome),
                Err(TryRecvError::Empty) => return changed,
                Err(TryRecvError::Disconnected) => {
                    debug!("AtlasSlot: Worker channel closed");
                    return changed;
                }
            }
        }
    }

    pub fn current(&self) -> Option<&FontGenerator> {
        self.current.as_ref()
    }

    pub fn last_error(&self) -> Option<&FontError> {
        self.last_error.as_ref()
    }
}
