//! Real-time context tracking
//!
//! The audio callback wraps its work in a [`ProcessScope`]; code that must not
//! perform unbounded work on the audio thread asks [`in_process_thread`] first.

use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    static PROCESS_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Marks the current thread as the audio process thread while alive
#[derive(Debug)]
pub struct ProcessScope {
    // !Send: the guard must be dropped on the thread that created it
    _not_send: PhantomData<*const ()>,
}

impl ProcessScope {
    pub fn enter() -> Self {
        PROCESS_DEPTH.with(|d| d.set(d.get() + 1));
        Self {
            _not_send: PhantomData,
        }
    }
}

impl Drop for ProcessScope {
    fn drop(&mut self) {
        PROCESS_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// True while a [`ProcessScope`] is alive on this thread
#[inline]
pub fn in_process_thread() -> bool {
    PROCESS_DEPTH.with(|d| d.get() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_nesting() {
        assert!(!in_process_thread());
        {
            let _outer = ProcessScope::enter();
            assert!(in_process_thread());
            {
                let _inner = ProcessScope::enter();
                assert!(in_process_thread());
            }
            assert!(in_process_thread());
        }
        assert!(!in_process_thread());
    }

    #[test]
    fn test_scope_is_per_thread() {
        let _scope = ProcessScope::enter();
        let other = std::thread::spawn(in_process_thread).join().unwrap_or(true);
        assert!(!other);
    }
}
