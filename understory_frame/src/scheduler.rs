// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Phase queues: thread-safe enqueue, copy-then-execute drain.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One phase of a host tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TickPhase {
    /// Before simulation; runs once per rendered frame.
    PrePhysics,
    /// Fixed-step simulation; may run zero or more times per rendered frame.
    Physics,
    /// After the frame has been rendered; the last point of a tick.
    PostRender,
}

impl TickPhase {
    /// All phases in the order a tick visits them.
    pub const ALL: [Self; 3] = [Self::PrePhysics, Self::Physics, Self::PostRender];

    const fn index(self) -> usize {
        match self {
            Self::PrePhysics => 0,
            Self::Physics => 1,
            Self::PostRender => 2,
        }
    }
}

/// A one-shot deferred action.
pub type Action<C> = Box<dyn FnOnce(&mut C) + Send + 'static>;

/// Result of resuming a [`Task`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Suspend until the next run of the same phase.
    Yield,
    /// The task is finished and is dropped.
    Done,
}

/// A suspended continuation resumed by the owning loop.
///
/// Closures of the shape `FnMut(&mut C) -> Step` are tasks.
pub trait Task<C>: Send {
    /// Advance the task by one step.
    fn resume(&mut self, ctx: &mut C) -> Step;
}

impl<C, F> Task<C> for F
where
    F: FnMut(&mut C) -> Step + Send,
{
    fn resume(&mut self, ctx: &mut C) -> Step {
        self(ctx)
    }
}

enum Job<C> {
    Once(Action<C>),
    Resume(Box<dyn Task<C>>),
}

struct Queue<C> {
    jobs: Mutex<Vec<Job<C>>>,
    // Lets `run` skip the lock entirely when nothing is queued.
    idle: AtomicBool,
}

impl<C> Queue<C> {
    fn new() -> Self {
        Self {
            jobs: Mutex::new(Vec::new()),
            idle: AtomicBool::new(true),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Job<C>>> {
        // Jobs never execute under the lock, so poisoning cannot leave the
        // queue half-updated.
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, job: Job<C>) {
        let mut jobs = self.lock();
        jobs.push(job);
        self.idle.store(false, Ordering::Release);
    }
}

/// The unexecuted tail of one drained batch.
///
/// Dropping it puts yielded tasks and any jobs not yet reached back at the
/// front of the queue, in batch order. On a normal return only yielded tasks
/// remain; if a job panics, the jobs after it survive for the next run.
struct Batch<'a, C> {
    queue: &'a Queue<C>,
    rest: std::vec::IntoIter<Job<C>>,
    suspended: Vec<Job<C>>,
}

impl<C> Drop for Batch<'_, C> {
    fn drop(&mut self) {
        let mut carry = core::mem::take(&mut self.suspended);
        carry.extend(self.rest.by_ref());
        if carry.is_empty() {
            return;
        }
        let mut jobs = self.queue.lock();
        jobs.splice(0..0, carry);
        self.queue.idle.store(false, Ordering::Release);
    }
}

/// Per-phase queues of deferred work for a context `C`.
///
/// Cloning yields another handle to the same queues; handles are `Send + Sync`
/// for any `C`, so worker threads can enqueue work for the owning loop.
pub struct FrameScheduler<C> {
    queues: Arc<[Queue<C>; 3]>,
}

impl<C> Clone for FrameScheduler<C> {
    fn clone(&self) -> Self {
        Self {
            queues: Arc::clone(&self.queues),
        }
    }
}

impl<C> Default for FrameScheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> core::fmt::Debug for FrameScheduler<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("pre_physics", &self.pending(TickPhase::PrePhysics))
            .field("physics", &self.pending(TickPhase::Physics))
            .field("post_render", &self.pending(TickPhase::PostRender))
            .finish()
    }
}

impl<C> FrameScheduler<C> {
    /// Create a scheduler with empty queues.
    pub fn new() -> Self {
        Self {
            queues: Arc::new([Queue::new(), Queue::new(), Queue::new()]),
        }
    }

    fn queue(&self, phase: TickPhase) -> &Queue<C> {
        &self.queues[phase.index()]
    }

    /// Queue a one-shot action for the next run of `phase`.
    ///
    /// Safe to call from any thread, including from inside a running action.
    pub fn enqueue(&self, phase: TickPhase, action: impl FnOnce(&mut C) + Send + 'static) {
        self.queue(phase).push(Job::Once(Box::new(action)));
    }

    /// Queue a suspended task, first resumed on the next run of `phase`.
    pub fn spawn(&self, phase: TickPhase, task: impl Task<C> + 'static) {
        self.queue(phase).push(Job::Resume(Box::new(task)));
    }

    /// Number of jobs waiting for `phase`.
    pub fn pending(&self, phase: TickPhase) -> usize {
        self.queue(phase).lock().len()
    }

    /// Returns true if no phase has queued work.
    pub fn is_idle(&self) -> bool {
        self.queues
            .iter()
            .all(|q| q.idle.load(Ordering::Acquire))
    }

    /// Execute the work queued for `phase` and return how many jobs ran.
    ///
    /// Only the owning loop should call this. The queue is swapped out under the
    /// lock and executed after the lock is released, in FIFO order. Jobs queued
    /// during execution wait for the next run. Tasks that yield are re-queued
    /// ahead of anything enqueued while they ran.
    ///
    /// If a job panics, that job is lost and the panic propagates. Jobs of the
    /// same batch that had not run yet, and tasks that already yielded, go back
    /// to the front of the queue for the next run.
    pub fn run(&self, phase: TickPhase, ctx: &mut C) -> usize {
        let queue = self.queue(phase);
        if queue.idle.load(Ordering::Acquire) {
            return 0;
        }
        let jobs = {
            let mut jobs = queue.lock();
            queue.idle.store(true, Ordering::Release);
            core::mem::take(&mut *jobs)
        };

        let mut batch = Batch {
            queue,
            rest: jobs.into_iter(),
            suspended: Vec::new(),
        };
        let mut ran = 0;
        while let Some(job) = batch.rest.next() {
            ran += 1;
            match job {
                Job::Once(action) => action(ctx),
                Job::Resume(mut task) => {
                    if task.resume(ctx) == Step::Yield {
                        batch.suspended.push(Job::Resume(task));
                    }
                }
            }
        }
        drop(batch);
        tracing::trace!(?phase, ran, "frame phase drained");
        ran
    }
}
