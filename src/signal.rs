use crate::dispatcher::Dispatcher;
use crate::logging::Logger;
use signal_hook::consts::{SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn signal_name(sig: i32) -> &'static str {
    match sig {
        SIGINT => "SIGINT",
        SIGTERM => "SIGTERM",
        SIGQUIT => "SIGQUIT",
        _ => "unknown signal",
    }
}

/// Installs handlers for `SIGINT`/`SIGTERM`/`SIGQUIT` on a dedicated thread.
///
/// On receipt: logs an `INFO` line naming the signal, forces the dispatcher to
/// completion (workers finish their current walk and exit, per spec.md §5), and
/// flips `interrupted` so `main` knows to exit `EXIT_FAILURE` instead of `0`
/// (spec.md §6, §8 scenario 6).
pub fn install(dispatcher: Arc<Dispatcher>, logger: Arc<Logger>, interrupted: Arc<AtomicBool>) {
    let mut signals = match Signals::new([SIGINT, SIGTERM, SIGQUIT]) {
        Ok(signals) => signals,
        Err(e) => {
            logger.warning(&format!("failed to install signal handlers: {e}"));
            return;
        }
    };

    std::thread::spawn(move || {
        for sig in signals.forever() {
            logger.info(&format!("received {}, shutting down", signal_name(sig)));
            interrupted.store(true, Ordering::SeqCst);
            dispatcher.force_complete();
            break;
        }
    });
}
