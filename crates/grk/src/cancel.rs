// ai
//! ⏹️ Cooperative cancellation — the stop button
//!
//! 🎬 *[INT. TERMINAL — DAY. a forty-million-row count is running. the*
//! *operator realizes they pointed it at the WRONG MONTH. their finger*
//! *hovers over ctrl-c. somewhere, a watch channel clears its throat.]*
//!
//! Every long pipeline run carries a `StopToken`. Every receive point races
//! the token against the channel, so a stop request lands between two
//! records, not after the remaining thirty-nine million. A stopped run is an
//! error (the report was not produced), never a silently truncated result —
//! a top-10 computed from half the data is worse than no top-10, because the
//! half-data one looks done. 💀
//!
//! 🧠 Knowledge graph:
//! - `stop_pair()` → (`StopHandle`, `StopToken`). Handle stops; token
//!   observes. Token is cheap to clone — hand one to every stage.
//! - `StopToken::never()` = a token that cannot fire. For tests, benches,
//!   and callers who genuinely want to run to completion, no take-backs.
//! - `StopToken::after(dur)` = a token on a timer, for `--timeout-secs`.
//!   Spawns one tokio task; needs a runtime, like everything else here.
//! - Dropping the `StopHandle` WITHOUT calling `stop()` means "never mind,
//!   run forever" — not "stop". Stop is an explicit act.
//!
//! Ancient proverb: "He who cannot be cancelled, gets kill -9'd in
//! production." 🦆

use std::time::Duration;

use tokio::sync::watch;

// ============================================================
// ⏹️ StopToken — the observing side
// ============================================================

/// ⏹️ The observing half of a stop request. Clone freely; all clones fire
/// together.
#[derive(Debug, Clone)]
pub struct StopToken {
    inner: Inner,
}

#[derive(Debug, Clone)]
enum Inner {
    /// 🌊 No stop is possible. The token is decorative. It knows. It's fine.
    Never,
    /// 🔔 Wired to a live handle via a watch channel.
    Armed(watch::Receiver<bool>),
}

impl StopToken {
    /// 🌊 A token that never fires. `stopped()` pends forever.
    pub fn never() -> Self {
        Self {
            inner: Inner::Never,
        }
    }

    /// ⏲️ A token that fires itself after `delay`. Needs a tokio runtime.
    pub fn after(delay: Duration) -> Self {
        let (handle, token) = stop_pair();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            handle.stop();
        });
        token
    }

    /// 🔍 Has a stop already been requested? Cheap, non-blocking.
    pub fn is_stopped(&self) -> bool {
        match &self.inner {
            Inner::Never => false,
            Inner::Armed(rx) => *rx.borrow(),
        }
    }

    /// 🛑 Resolves once a stop is requested; pends forever if it never is.
    ///
    /// Built to sit inside a `tokio::select!` opposite a channel receive.
    /// A handle dropped without `stop()` counts as "never" — the select's
    /// other arm wins eventually (at stream end), which is the behavior you
    /// want when nobody is holding the stop button anymore.
    pub async fn stopped(&self) {
        match &self.inner {
            Inner::Never => std::future::pending::<()>().await,
            Inner::Armed(rx) => {
                let mut rx = rx.clone();
                if rx.wait_for(|stopped| *stopped).await.is_err() {
                    // 🌊 sender gone, stop never sent. park forever.
                    std::future::pending::<()>().await;
                }
            }
        }
    }
}

// ============================================================
// 🔴 StopHandle — the requesting side
// ============================================================

/// 🔴 The requesting half. One per run, held by whoever owns ctrl-c.
#[derive(Debug)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    /// 🛑 Request the stop. Idempotent; every token clone sees it.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }
}

/// 🔗 A fresh (handle, token) pair, wired together and not yet stopped.
pub fn stop_pair() -> (StopHandle, StopToken) {
    let (tx, rx) = watch::channel(false);
    (
        StopHandle { tx },
        StopToken {
            inner: Inner::Armed(rx),
        },
    )
}

// ============================================================
// 🧪 Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[tokio::test]
    async fn the_one_where_never_means_never() {
        let token = StopToken::never();
        assert!(!token.is_stopped());
        tokio::select! {
            _ = token.stopped() => panic!("a never token fired. physics is broken."),
            _ = tokio::time::sleep(Duration::from_millis(20)) => {}
        }
    }

    #[tokio::test]
    async fn the_one_where_stop_reaches_every_clone() -> Result<()> {
        let (handle, token) = stop_pair();
        let twin = token.clone();
        assert!(!token.is_stopped());

        handle.stop();

        assert!(token.is_stopped());
        assert!(twin.is_stopped());
        // 🛑 already stopped — both resolve immediately (under the timeout).
        tokio::time::timeout(Duration::from_secs(1), token.stopped()).await?;
        tokio::time::timeout(Duration::from_secs(1), twin.stopped()).await?;
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_a_dropped_handle_is_not_a_stop() {
        let (handle, token) = stop_pair();
        drop(handle); // -- walked away from the button. rude, but legal.
        assert!(!token.is_stopped());
        tokio::select! {
            _ = token.stopped() => panic!("dropping the handle must not stop the run"),
            _ = tokio::time::sleep(Duration::from_millis(20)) => {}
        }
    }

    #[tokio::test]
    async fn the_one_where_the_timer_token_fires() -> Result<()> {
        let token = StopToken::after(Duration::from_millis(5));
        tokio::time::timeout(Duration::from_secs(5), token.stopped()).await?;
        assert!(token.is_stopped());
        Ok(())
    }
}
