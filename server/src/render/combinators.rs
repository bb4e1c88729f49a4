use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, mpsc};
use std::thread;

use super::{CancelToken, ComputeError, FractalGenerator, FractalParameters};

/// Runs renders one at a time, in arrival order, with a bounded number of
/// waiting callers.
///
/// A caller that arrives while `capacity` others are already waiting is
/// turned away with [`ComputeError::QueueFull`] instead of piling up.
pub struct Queued<G> {
    inner: G,
    capacity: usize,
    tickets: Mutex<Tickets>,
    turn: Condvar,
}

/// `next` is handed to the next arrival; `serving` is the ticket allowed to
/// run. Everything in between is running or waiting.
#[derive(Default)]
struct Tickets {
    next: u64,
    serving: u64,
}

impl Tickets {
    fn in_line(&self) -> u64 {
        self.next - self.serving
    }
}

impl<G: FractalGenerator> Queued<G> {
    pub fn new(inner: G, capacity: usize) -> Self {
        Self {
            inner,
            capacity,
            tickets: Mutex::new(Tickets::default()),
            turn: Condvar::new(),
        }
    }

    /// Callers holding a ticket that is not being served yet.
    pub fn waiting(&self) -> usize {
        let waiting = self.lock_tickets().in_line().saturating_sub(1);
        usize::try_from(waiting).unwrap_or(usize::MAX)
    }

    fn lock_tickets(&self) -> MutexGuard<'_, Tickets> {
        self.tickets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Advances the queue when the served caller leaves, even by unwinding.
struct Turn<'a, G> {
    queue: &'a Queued<G>,
}

impl<G> Drop for Turn<'_, G> {
    fn drop(&mut self) {
        let mut tickets = self.queue.tickets.lock().unwrap_or_else(PoisonError::into_inner);
        tickets.serving += 1;
        drop(tickets);
        self.queue.turn.notify_all();
    }
}

impl<G: FractalGenerator> FractalGenerator for Queued<G> {
    fn compute_cancellable(
        &self,
        params: &FractalParameters,
        cancel: &CancelToken,
    ) -> Result<Vec<bool>, ComputeError> {
        let mut tickets = self.lock_tickets();
        let waiting = tickets.in_line().saturating_sub(1);
        if waiting >= self.capacity as u64 {
            return Err(ComputeError::QueueFull);
        }
        let ticket = tickets.next;
        tickets.next += 1;

        let tickets = self
            .turn
            .wait_while(tickets, |tickets| tickets.serving != ticket)
            .unwrap_or_else(PoisonError::into_inner);
        drop(tickets);

        let _turn = Turn { queue: self };
        self.inner.compute_cancellable(params, cancel)
    }
}

/// Runs every renderer at once and returns the first successful image.
///
/// The losers are cancelled and joined before `compute` returns, so a race
/// never leaves work running behind its caller.
pub struct Race {
    renderers: Vec<Arc<dyn FractalGenerator>>,
}

impl Race {
    pub fn new(renderers: Vec<Arc<dyn FractalGenerator>>) -> Self {
        Self { renderers }
    }
}

impl FractalGenerator for Race {
    fn compute_cancellable(
        &self,
        params: &FractalParameters,
        cancel: &CancelToken,
    ) -> Result<Vec<bool>, ComputeError> {
        if self.renderers.is_empty() {
            return Err(ComputeError::NoRenderers);
        }

        let race = cancel.child();
        thread::scope(|scope| {
            let (tx, rx) = mpsc::channel();
            let racers: Vec<_> = self
                .renderers
                .iter()
                .map(|renderer| {
                    let tx = tx.clone();
                    let race = &race;
                    scope.spawn(move || {
                        let _ = tx.send(renderer.compute_cancellable(params, race));
                    })
                })
                .collect();
            drop(tx);

            let mut outcome = Err(ComputeError::WorkerPanicked);
            for result in rx {
                match result {
                    Ok(pixels) => {
                        outcome = Ok(pixels);
                        break;
                    }
                    Err(e) => outcome = Err(e),
                }
            }

            race.cancel();
            for racer in racers {
                let _ = racer.join();
            }
            outcome
        })
    }
}
