//! Rendezvous between queued frames and pending read requests.
//!
//! The outbound queue and the pending-read registry form one logically
//! atomic structure under a single mutex. Every frame that enters and
//! every read request that registers yields exactly one outcome: a frame
//! is delivered, dropped on backpressure, or drained at teardown; a
//! request resolves with a frame, a capacity error, cancellation, or
//! not-ready. Resolution travels over a oneshot channel so a suspended
//! consumer never blocks producers or other consumers.

use crate::buffer::FrameBuf;
use crate::error::Error;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::oneshot;

/// Opaque handle identifying an outstanding read request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadId(u64);

/// Outcome of cancelling a pending read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The request was still outstanding and is now resolved as cancelled
    Cancelled,
    /// The request had already produced its one outcome; that outcome
    /// stands
    AlreadyResolved,
}

/// Outcome of a user-face read
#[derive(Debug)]
pub enum ReadOutcome {
    /// A queued frame was available and is delivered immediately
    Frame(Vec<u8>),
    /// No frame available; the request is registered and resolves
    /// asynchronously exactly once
    Pending(ReadTicket),
}

/// Handle to a registered read request.
///
/// Await [`ReadTicket::resolve`] for the outcome, or pass
/// [`ReadTicket::id`] to `cancel`.
#[derive(Debug)]
pub struct ReadTicket {
    id: ReadId,
    rx: oneshot::Receiver<Result<FrameBuf, Error>>,
}

impl ReadTicket {
    /// Handle for cancellation
    #[must_use]
    pub fn id(&self) -> ReadId {
        self.id
    }

    /// Await the single outcome of this request.
    ///
    /// A registry torn down without resolving (adapter dropped) counts as
    /// not ready.
    pub async fn resolve(self) -> Result<Vec<u8>, Error> {
        match self.rx.await {
            Ok(outcome) => outcome.map(FrameBuf::into_delivered),
            Err(_) => Err(Error::NotReady),
        }
    }
}

/// What happened to a frame pushed at the rendezvous
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Matched an outstanding read request
    Delivered,
    /// Appended to the outbound queue
    Queued,
    /// Discarded because the adapter was not ready
    DroppedNotReady,
}

/// Counts reported by a teardown drain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Queued frames discarded
    pub dropped_frames: u64,
    /// Pending reads resolved with not-ready
    pub aborted_reads: u64,
}

struct PendingRead {
    id: ReadId,
    capacity: usize,
    tx: oneshot::Sender<Result<FrameBuf, Error>>,
}

struct State {
    queue: VecDeque<FrameBuf>,
    pending: VecDeque<PendingRead>,
    next_id: u64,
    ready: bool,
}

/// The queue/registry pair under its single exclusion mechanism
pub struct Rendezvous {
    state: Mutex<State>,
}

impl Rendezvous {
    /// Create the rendezvous in the ready state (adapter bring-up)
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                pending: VecDeque::new(),
                next_id: 0,
                ready: true,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("rendezvous lock poisoned")
    }

    /// Offer an admitted frame: match it against the oldest fitting read
    /// request, or queue it.
    ///
    /// Requests too small for the frame resolve with `BufferTooSmall` and
    /// the next request is tried; truncation is never performed. A request
    /// whose consumer has gone away is skipped.
    pub fn push_frame(&self, frame: FrameBuf) -> PushOutcome {
        let mut state = self.lock();

        if !state.ready {
            return PushOutcome::DroppedNotReady;
        }

        let mut frame = frame;
        loop {
            let Some(request) = state.pending.pop_front() else {
                state.queue.push_back(frame);
                return PushOutcome::Queued;
            };

            if frame.delivered_len() > request.capacity {
                let _ = request.tx.send(Err(Error::BufferTooSmall {
                    required: frame.delivered_len(),
                    capacity: request.capacity,
                }));
                continue;
            }

            match request.tx.send(Ok(frame)) {
                Ok(()) => return PushOutcome::Delivered,
                // Receiver dropped; reclaim the frame and keep matching.
                Err(Ok(reclaimed)) => frame = reclaimed,
                Err(Err(_)) => unreachable!("sent value was Ok"),
            }
        }
    }

    /// Take the oldest queued frame fitting `capacity`, or register a
    /// pending read.
    ///
    /// An oldest frame larger than `capacity` stays at the head of the
    /// queue and the caller gets `BufferTooSmall`, preserving delivery
    /// order for better-provisioned readers.
    pub fn take_or_register(&self, capacity: usize) -> Result<ReadOutcome, Error> {
        let mut state = self.lock();

        if !state.ready {
            return Err(Error::NotReady);
        }

        if let Some(front_len) = state.queue.front().map(FrameBuf::delivered_len) {
            if front_len > capacity {
                return Err(Error::BufferTooSmall {
                    required: front_len,
                    capacity,
                });
            }
            if let Some(frame) = state.queue.pop_front() {
                return Ok(ReadOutcome::Frame(frame.into_delivered()));
            }
        }

        // Tickets dropped without cancelling leave dead entries behind;
        // reclaim them here so abandonment cannot grow the registry.
        state.pending.retain(|request| !request.tx.is_closed());

        let id = ReadId(state.next_id);
        state.next_id += 1;
        let (tx, rx) = oneshot::channel();
        state.pending.push_back(PendingRead { id, capacity, tx });

        Ok(ReadOutcome::Pending(ReadTicket { id, rx }))
    }

    /// Cancel an outstanding read request.
    ///
    /// Race-free against concurrent resolution: a request already matched
    /// to a frame (or otherwise resolved) reports `AlreadyResolved` and
    /// its delivered outcome stands.
    pub fn cancel(&self, id: ReadId) -> CancelOutcome {
        let mut state = self.lock();

        let position = state.pending.iter().position(|request| request.id == id);
        match position.and_then(|index| state.pending.remove(index)) {
            Some(request) => {
                let _ = request.tx.send(Err(Error::Cancelled));
                CancelOutcome::Cancelled
            }
            None => CancelOutcome::AlreadyResolved,
        }
    }

    /// Flip the readiness gate.
    ///
    /// Going not-ready drains the queue and resolves every pending read
    /// with not-ready before the lock is released; nothing is left
    /// in-flight.
    pub fn set_ready(&self, ready: bool) -> DrainReport {
        let mut state = self.lock();
        state.ready = ready;

        if ready {
            return DrainReport::default();
        }

        let dropped_frames = state.queue.len() as u64;
        state.queue.clear();

        let mut aborted_reads = 0;
        for request in state.pending.drain(..) {
            let _ = request.tx.send(Err(Error::NotReady));
            aborted_reads += 1;
        }

        DrainReport {
            dropped_frames,
            aborted_reads,
        }
    }

    /// Current readiness
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.lock().ready
    }

    /// Number of queued frames (diagnostics)
    #[must_use]
    pub fn queued_frames(&self) -> usize {
        self.lock().queue.len()
    }

    /// Number of outstanding read requests (diagnostics)
    #[must_use]
    pub fn pending_reads(&self) -> usize {
        self.lock().pending.len()
    }
}

impl Default for Rendezvous {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vport_wire::FrameClass;

    fn frame(len: usize) -> FrameBuf {
        FrameBuf::copy_from(&vec![0xA5u8; len], FrameClass::Directed, false).unwrap()
    }

    #[test]
    fn test_frame_queued_when_no_reader() {
        let rv = Rendezvous::new();
        assert_eq!(rv.push_frame(frame(60)), PushOutcome::Queued);
        assert_eq!(rv.queued_frames(), 1);
    }

    #[tokio::test]
    async fn test_frame_matches_oldest_request() {
        let rv = Rendezvous::new();

        let first = match rv.take_or_register(2048).unwrap() {
            ReadOutcome::Pending(ticket) => ticket,
            ReadOutcome::Frame(_) => panic!("queue should be empty"),
        };
        let second = match rv.take_or_register(2048).unwrap() {
            ReadOutcome::Pending(ticket) => ticket,
            ReadOutcome::Frame(_) => panic!("queue should be empty"),
        };

        assert_eq!(rv.push_frame(frame(60)), PushOutcome::Delivered);
        assert_eq!(rv.push_frame(frame(90)), PushOutcome::Delivered);

        assert_eq!(first.resolve().await.unwrap().len(), 60);
        assert_eq!(second.resolve().await.unwrap().len(), 90);
    }

    #[tokio::test]
    async fn test_undersized_request_gets_error_next_fits() {
        let rv = Rendezvous::new();

        let small = match rv.take_or_register(40).unwrap() {
            ReadOutcome::Pending(ticket) => ticket,
            ReadOutcome::Frame(_) => panic!("queue should be empty"),
        };
        let big = match rv.take_or_register(2048).unwrap() {
            ReadOutcome::Pending(ticket) => ticket,
            ReadOutcome::Frame(_) => panic!("queue should be empty"),
        };

        assert_eq!(rv.push_frame(frame(100)), PushOutcome::Delivered);

        assert_eq!(
            small.resolve().await.unwrap_err(),
            Error::BufferTooSmall {
                required: 100,
                capacity: 40
            }
        );
        assert_eq!(big.resolve().await.unwrap().len(), 100);
    }

    #[test]
    fn test_oversized_head_stays_queued() {
        let rv = Rendezvous::new();
        rv.push_frame(frame(100));

        let err = rv.take_or_register(40).unwrap_err();
        assert_eq!(
            err,
            Error::BufferTooSmall {
                required: 100,
                capacity: 40
            }
        );
        assert_eq!(rv.queued_frames(), 1);

        match rv.take_or_register(2048).unwrap() {
            ReadOutcome::Frame(bytes) => assert_eq!(bytes.len(), 100),
            ReadOutcome::Pending(_) => panic!("frame was queued"),
        }
    }

    #[tokio::test]
    async fn test_cancel_then_resolve_is_noop() {
        let rv = Rendezvous::new();

        let ticket = match rv.take_or_register(2048).unwrap() {
            ReadOutcome::Pending(ticket) => ticket,
            ReadOutcome::Frame(_) => panic!("queue should be empty"),
        };
        let id = ticket.id();

        assert_eq!(rv.cancel(id), CancelOutcome::Cancelled);
        assert_eq!(rv.cancel(id), CancelOutcome::AlreadyResolved);
        assert_eq!(ticket.resolve().await.unwrap_err(), Error::Cancelled);

        // A later frame goes to the queue, not the cancelled request.
        assert_eq!(rv.push_frame(frame(60)), PushOutcome::Queued);
    }

    #[tokio::test]
    async fn test_cancel_after_delivery_reports_resolved() {
        let rv = Rendezvous::new();

        let ticket = match rv.take_or_register(2048).unwrap() {
            ReadOutcome::Pending(ticket) => ticket,
            ReadOutcome::Frame(_) => panic!("queue should be empty"),
        };
        let id = ticket.id();

        assert_eq!(rv.push_frame(frame(60)), PushOutcome::Delivered);
        assert_eq!(rv.cancel(id), CancelOutcome::AlreadyResolved);
        assert_eq!(ticket.resolve().await.unwrap().len(), 60);
    }

    #[test]
    fn test_teardown_drains_queue() {
        let rv = Rendezvous::new();
        rv.push_frame(frame(60));
        rv.push_frame(frame(61));

        let report = rv.set_ready(false);
        assert_eq!(report.dropped_frames, 2);
        assert_eq!(report.aborted_reads, 0);
        assert_eq!(rv.queued_frames(), 0);

        assert_eq!(rv.push_frame(frame(60)), PushOutcome::DroppedNotReady);
        assert_eq!(rv.take_or_register(2048).unwrap_err(), Error::NotReady);
    }

    #[tokio::test]
    async fn test_teardown_aborts_pending_reads() {
        let rv = Rendezvous::new();

        let ticket = match rv.take_or_register(2048).unwrap() {
            ReadOutcome::Pending(ticket) => ticket,
            ReadOutcome::Frame(_) => panic!("queue should be empty"),
        };

        let report = rv.set_ready(false);
        assert_eq!(report.dropped_frames, 0);
        assert_eq!(report.aborted_reads, 1);
        assert_eq!(rv.pending_reads(), 0);
        assert_eq!(ticket.resolve().await.unwrap_err(), Error::NotReady);
    }

    #[test]
    fn test_abandoned_requests_pruned_on_register() {
        let rv = Rendezvous::new();

        for _ in 0..8 {
            match rv.take_or_register(2048).unwrap() {
                ReadOutcome::Pending(ticket) => drop(ticket),
                ReadOutcome::Frame(_) => panic!("queue should be empty"),
            }
        }
        assert_eq!(rv.pending_reads(), 1);

        // A live registration coexists with the reclaim.
        let ticket = match rv.take_or_register(2048).unwrap() {
            ReadOutcome::Pending(ticket) => ticket,
            ReadOutcome::Frame(_) => panic!("queue should be empty"),
        };
        assert_eq!(rv.pending_reads(), 1);
        assert_eq!(rv.push_frame(frame(60)), PushOutcome::Delivered);
        drop(ticket);
    }

    #[test]
    fn test_ready_reopens_admission() {
        let rv = Rendezvous::new();
        rv.set_ready(false);
        rv.set_ready(true);
        assert_eq!(rv.push_frame(frame(60)), PushOutcome::Queued);
    }
}
