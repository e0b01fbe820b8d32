// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inter-phase Barrier
//!
//! SIG instances need the PLN, PGN and MS services to be reachable. Between
//! the third and fourth phase the orchestrator waits on a [`Barrier`]:
//!
//! - [`FixedDelay`] sleeps for a fixed duration
//! - [`TcpReadinessProbe`] polls the primary endpoints launched so far and
//!   releases as soon as all accept a TCP connection, or when its deadline
//!   passes
//!
//! Either way the fourth phase only starts after the wait returns.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use crate::domain::Endpoint;
use crate::errors::HarnessResult;

/// Wait step between the MS and SIG phases
#[async_trait]
pub trait Barrier: Send + Sync {
    /// Block until the next phase may start
    ///
    /// `launched` holds the endpoints of every instance started so far.
    async fn wait(&self, launched: &[Endpoint]) -> HarnessResult<()>;

    /// Get the name of this barrier
    fn name(&self) -> &str;
}

/// Barrier selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarrierConfig {
    /// Sleep duration, or probe deadline when probing
    pub delay: Duration,
    /// Probe endpoints instead of sleeping the full delay
    pub readiness_probe: bool,
}

impl BarrierConfig {
    /// Default pause
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(20);

    /// Build the configured barrier
    pub fn into_barrier(self) -> Box<dyn Barrier> {
        if self.readiness_probe {
            Box::new(TcpReadinessProbe::new(self.delay))
        } else {
            Box::new(FixedDelay::new(self.delay))
        }
    }
}

impl Default for BarrierConfig {
    fn default() -> Self {
        Self {
            delay: Self::DEFAULT_DELAY,
            readiness_probe: false,
        }
    }
}

/// Unconditional pause
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Barrier for FixedDelay {
    async fn wait(&self, _launched: &[Endpoint]) -> HarnessResult<()> {
        info!("Waiting {:?} before the final phase", self.delay);
        sleep(self.delay).await;
        Ok(())
    }

    fn name(&self) -> &str {
        "fixed-delay"
    }
}

/// Polls launched endpoints over TCP until they accept or a deadline passes
///
/// A deadline miss is logged and the barrier releases anyway. Only primary
/// ports are probed.
#[derive(Debug, Clone, Copy)]
pub struct TcpReadinessProbe {
    deadline: Duration,
    poll_interval: Duration,
    connect_timeout: Duration,
}

impl TcpReadinessProbe {
    /// Default interval between connection attempts
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

    pub fn new(deadline: Duration) -> Self {
        Self {
            deadline,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            connect_timeout: Duration::from_millis(500),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    async fn accepts(&self, endpoint: &Endpoint) -> bool {
        matches!(
            timeout(self.connect_timeout, TcpStream::connect(endpoint.primary_socket())).await,
            Ok(Ok(_))
        )
    }
}

#[async_trait]
impl Barrier for TcpReadinessProbe {
    async fn wait(&self, launched: &[Endpoint]) -> HarnessResult<()> {
        let deadline = Instant::now() + self.deadline;
        info!(
            "Probing {} endpoints for up to {:?}",
            launched.len(),
            self.deadline
        );

        for endpoint in launched {
            loop {
                if self.accepts(endpoint).await {
                    debug!("{} is accepting connections", endpoint.primary_socket());
                    break;
                }
                if Instant::now() >= deadline {
                    warn!(
                        "Readiness deadline passed with {} still unreachable; continuing",
                        endpoint.primary_socket()
                    );
                    return Ok(());
                }
                sleep(self.poll_interval).await;
            }
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "tcp-readiness-probe"
    }
}
