use std::time::{Duration, Instant};

use anyhow::anyhow;
use holorec_core::types::RequestKind;
use holorec_engine::client::SessionClient;
use holorec_engine::session::SessionEvent;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

const TICK: Duration = Duration::from_millis(100);

// Give up if the device never answers at all; the HTTP client times out well before.
const MAX_WAIT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    Stop,
    WaitForStop,
    Exit,
}

/// What a Ctrl-C means given how many came before it and where the recording is.
fn on_interrupt(presses: u32, active: bool, stop_pending: bool) -> Interrupt {
    if presses > 1 {
        Interrupt::Exit
    } else if stop_pending {
        Interrupt::WaitForStop
    } else if active {
        Interrupt::Stop
    } else {
        Interrupt::Exit
    }
}

/// Every Ctrl-C for the rest of the process, one message each.
fn interrupts() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

/// Fetches a token and reports whether the device accepted the credentials.
pub async fn run_auth(client: &mut SessionClient) -> anyhow::Result<()> {
    client.request_token()?;
    let started = Instant::now();
    let mut interval = tokio::time::interval(TICK);

    loop {
        interval.tick().await;
        for event in client.tick(Instant::now()) {
            match event {
                SessionEvent::Authenticated => {
                    println!("authenticated with {}", client.config().host);
                    return Ok(());
                }
                SessionEvent::RequestFailed { error, .. } => {
                    return Err(anyhow!("authentication failed: {error}"));
                }
                _ => {}
            }
        }
        if started.elapsed() > MAX_WAIT {
            return Err(anyhow!("no answer from {}", client.config().host));
        }
    }
}

/// Host loop for one timed recording: authenticate, start, count down, stop.
///
/// Ctrl-C stops early; a second Ctrl-C exits without waiting for the device. A failed
/// auth does not abort; the start is still attempted and the device decides.
pub async fn run_record(client: &mut SessionClient) -> anyhow::Result<()> {
    let mut interval = tokio::time::interval(TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut ctrl_c = interrupts();
    let mut presses = 0u32;
    let mut interrupted = false;
    let mut last_shown_secs = None;
    let mut idle_since = Instant::now();

    if client.ensure_token() {
        println!("authenticating with {} ...", client.config().host);
    } else {
        client.start_recording()?;
    }

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            Some(()) = ctrl_c.recv() => {
                presses += 1;
                interrupted = true;
                println!();
                let active = client.is_recording() || client.is_pending(RequestKind::Start);
                match on_interrupt(presses, active, client.is_pending(RequestKind::Stop)) {
                    Interrupt::Stop => {
                        println!("interrupted; stopping (Ctrl-C again to quit now)");
                        client.stop_recording()?;
                    }
                    Interrupt::WaitForStop => {
                        println!("waiting for the device to stop (Ctrl-C again to quit now)");
                    }
                    Interrupt::Exit if presses > 1 => {
                        return Err(anyhow!("interrupted before the device confirmed the stop"));
                    }
                    Interrupt::Exit => return Ok(()),
                }
            }
        }

        let now = Instant::now();
        for event in client.tick(now) {
            idle_since = now;
            match event {
                SessionEvent::Authenticated => {
                    println!("authenticated");
                    if !interrupted {
                        client.start_recording()?;
                    }
                }
                SessionEvent::RecordingStarted { .. } => {
                    if client.is_recording() {
                        println!(
                            "recording for {:.1}s (Ctrl-C to stop early)",
                            client.config().duration_secs
                        );
                    }
                }
                SessionEvent::DurationElapsed => {
                    println!();
                    println!("time is up; stopping");
                }
                SessionEvent::RecordingStopped => {
                    println!("recording stopped");
                    return Ok(());
                }
                SessionEvent::RequestFailed { kind, error } => match kind {
                    RequestKind::Auth => {
                        // Over USB the portal does not need a token; try anyway.
                        eprintln!("warning: {error}");
                        if !interrupted {
                            client.start_recording()?;
                        }
                    }
                    RequestKind::Start => {
                        return Err(anyhow!("could not start recording: {error}"));
                    }
                    RequestKind::Stop => {
                        return Err(anyhow!("stop request failed: {error}"));
                    }
                },
            }
        }

        if client.is_recording() {
            let remaining = client.remaining_time(now);
            let secs = remaining.as_secs_f32().ceil() as u64;
            if last_shown_secs != Some(secs) {
                last_shown_secs = Some(secs);
                print!(
                    "\rrecording {:>3.0}%  {}s left ",
                    client.progress(now) * 100.0,
                    secs
                );
                use std::io::Write;
                let _ = std::io::stdout().flush();
            }
            idle_since = now;
        } else if now.duration_since(idle_since) > MAX_WAIT {
            return Err(anyhow!("no answer from {}", client.config().host));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_interrupt_stops_an_active_recording() {
        assert_eq!(on_interrupt(1, true, false), Interrupt::Stop);
        assert_eq!(on_interrupt(1, false, false), Interrupt::Exit);
    }

    #[test]
    fn first_interrupt_waits_for_a_stop_already_in_flight() {
        assert_eq!(on_interrupt(1, false, true), Interrupt::WaitForStop);
    }

    #[test]
    fn second_interrupt_always_exits() {
        for (active, stop_pending) in [(true, false), (false, true), (true, true)] {
            assert_eq!(on_interrupt(2, active, stop_pending), Interrupt::Exit);
        }
        assert_eq!(on_interrupt(3, false, true), Interrupt::Exit);
    }
}
