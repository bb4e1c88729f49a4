use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;

/// Something that can run a callback once after a delay and cancel it.
pub(crate) trait TimerHost {
    type Handle;

    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Self::Handle;
    fn cancel(&self, handle: Self::Handle);
}

/// Browser timers via `setTimeout`.
#[derive(Clone, Copy, Default)]
pub(crate) struct BrowserTimers;

impl TimerHost for BrowserTimers {
    type Handle = Timeout;

    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(delay_ms, callback)
    }

    fn cancel(&self, handle: Timeout) {
        handle.cancel();
    }
}

/// Trailing-edge debounce: every `call` restarts the timer, and only the
/// arguments of the last call before `delay_ms` of quiet reach `callback`.
pub(crate) struct Debouncer<T, H: TimerHost> {
    inner: Rc<DebouncerInner<T, H>>,
}

struct DebouncerInner<T, H: TimerHost> {
    host: H,
    delay_ms: u32,
    callback: Rc<dyn Fn(T)>,
    pending: RefCell<Option<H::Handle>>,
}

impl<T, H: TimerHost> Clone for Debouncer<T, H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static, H: TimerHost> Debouncer<T, H> {
    pub(crate) fn new(host: H, delay_ms: u32, callback: impl Fn(T) + 'static) -> Self {
        Self {
            inner: Rc::new(DebouncerInner {
                host,
                delay_ms,
                callback: Rc::new(callback),
                pending: RefCell::new(None),
            }),
        }
    }

    pub(crate) fn call(&self, arg: T) {
        let inner = &self.inner;
        if let Some(handle) = inner.pending.borrow_mut().take() {
            inner.host.cancel(handle);
        }

        let callback = Rc::clone(&inner.callback);
        let handle = inner
            .host
            .schedule(inner.delay_ms, Box::new(move || callback(arg)));
        *inner.pending.borrow_mut() = Some(handle);
    }
}
