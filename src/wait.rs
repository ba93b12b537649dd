// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Poll a resource until a condition holds, retries run out, or time does.
//!
//! The loop is a small state machine driven by [`next_state`], so the
//! interplay of the retry budget and the timeout can be tested with a fake
//! [`Clock`]. The timeout is only checked after a poll, so it can be noticed
//! up to one interval late.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Cluster;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub interval: Duration,
    /// 0 means unlimited.
    pub retries: u32,
    /// Zero means unlimited.
    pub timeout: Duration,
}

impl WaitPolicy {
    pub fn from_secs(interval: u64, retries: u32, timeout: u64) -> Self {
        Self {
            interval: Duration::from_secs(interval),
            retries,
            timeout: Duration::from_secs(timeout),
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::from_secs(5, 0, 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    TimedOut,
    TooManyRetries,
}

impl From<Failure> for Error {
    fn from(f: Failure) -> Self {
        match f {
            Failure::TimedOut => Error::TimedOut,
            Failure::TooManyRetries => Error::TooManyRetries,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    Checking,
    Waiting,
    Succeeded,
    Failed(Failure),
}

/// Decide what follows a check. `retry_count` already includes the check
/// being judged.
pub fn next_state(
    policy: &WaitPolicy,
    elapsed: Duration,
    retry_count: u32,
    satisfied: bool,
) -> WaitState {
    if satisfied {
        WaitState::Succeeded
    } else if !policy.timeout.is_zero() && elapsed.as_secs_f64() > policy.timeout.as_secs_f64() {
        WaitState::Failed(Failure::TimedOut)
    } else if policy.retries > 0 && retry_count > policy.retries {
        WaitState::Failed(Failure::TooManyRetries)
    } else {
        WaitState::Waiting
    }
}

pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration)
    }
}

/// Block until `done(&current)` holds. `current` is checked immediately;
/// after each unsuccessful check the loop sleeps and replaces it with
/// `refetch(&current)`. A refetch error aborts the wait as is.
pub fn wait_until<T, C, F, P>(
    policy: &WaitPolicy,
    clock: &C,
    mut current: T,
    mut refetch: F,
    done: P,
) -> Result<T>
where
    C: Clock,
    F: FnMut(&T) -> Result<T>,
    P: Fn(&T) -> bool,
{
    let start = clock.now();
    let mut retry_count = 0u32;
    let mut state = WaitState::Checking;

    loop {
        match state {
            WaitState::Checking => {
                let satisfied = done(&current);
                if !satisfied {
                    retry_count += 1;
                }
                state = next_state(
                    policy,
                    clock.now().duration_since(start),
                    retry_count,
                    satisfied,
                );
            }
            WaitState::Waiting => {
                clock.sleep(policy.interval);
                current = refetch(&current)?;
                state = WaitState::Checking;
            }
            WaitState::Succeeded => return Ok(current),
            WaitState::Failed(reason) => return Err(reason.into()),
        }
    }
}

pub fn wait_for_cluster_status<C, F>(
    policy: &WaitPolicy,
    clock: &C,
    cluster: Cluster,
    status: &str,
    refetch: F,
) -> Result<Cluster>
where
    C: Clock,
    F: FnMut(&Cluster) -> Result<Cluster>,
{
    wait_until(policy, clock, cluster, refetch, |c| {
        debug!("checking status, have {} want {}", c.status, status);
        c.status == status
    })
}

/// Number of hosts in `cluster` currently in `status`.
pub fn hosts_with_status(cluster: &Cluster, status: &str) -> usize {
    cluster
        .hosts
        .iter()
        .inspect(|h| {
            debug!(
                "checking status for {}, have {} want {}",
                h.id, h.status, status
            )
        })
        .filter(|h| h.status == status)
        .count()
}

/// Number of hosts a host wait targets. `requested == 0` means every host
/// the cluster has right now.
pub fn host_target(cluster: &Cluster, requested: usize) -> usize {
    if requested == 0 {
        cluster.hosts.len()
    } else {
        requested
    }
}

/// Wait until at least `count` hosts are in `status`. Having more than
/// `count` hosts in `status` also ends the wait, so a target below the
/// host total is satisfied as soon as enough hosts get there. The caller
/// fixes `count` once (see [`host_target`]); hosts added or removed later
/// do not move the target.
pub fn wait_for_host_status<C, F>(
    policy: &WaitPolicy,
    clock: &C,
    cluster: Cluster,
    status: &str,
    count: usize,
    refetch: F,
) -> Result<Cluster>
where
    C: Clock,
    F: FnMut(&Cluster) -> Result<Cluster>,
{
    wait_until(policy, clock, cluster, refetch, |c| {
        hosts_with_status(c, status) >= count
    })
}
