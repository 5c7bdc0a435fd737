//! Blocking request/acknowledge channel between the two domains.
//!
//! The host endpoint sends one request and blocks until the hardware
//! endpoint acknowledges it with a result. A mutex on the host side keeps
//! at most one request outstanding per transactor instance. There is no
//! timeout; the call fails only when the hardware side goes away.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, PoisonError};

use tracing::trace;

use crate::error::{Result, RuntimeError};
use crate::registry::BridgeObject;

/// One method call in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method_id: u32,
    pub args: Vec<u64>,
}

/// Constructor for a connected endpoint pair.
pub struct XtorChannel;

impl XtorChannel {
    /// Open a channel for the transactor at `path`.
    pub fn open(path: impl Into<String>) -> (HostEndpoint, HardwareEndpoint) {
        let (req_tx, req_rx) = mpsc::channel();
        let (ack_tx, ack_rx) = mpsc::channel();
        (
            HostEndpoint {
                path: path.into(),
                link: Mutex::new((req_tx, ack_rx)),
            },
            HardwareEndpoint {
                requests: req_rx,
                acks: ack_tx,
            },
        )
    }
}

/// Host side: issues requests and waits for acknowledgement.
pub struct HostEndpoint {
    path: String,
    link: Mutex<(Sender<Request>, Receiver<u64>)>,
}

impl HostEndpoint {
    pub fn path(&self) -> &str {
        &self.path
    }

    fn detached(&self) -> RuntimeError {
        RuntimeError::Detached {
            path: self.path.clone(),
        }
    }
}

impl BridgeObject for HostEndpoint {
    fn invoke(&self, method_id: u32, args: &[u64]) -> Result<u64> {
        let link = self.link.lock().unwrap_or_else(PoisonError::into_inner);
        let (requests, acks) = &*link;
        requests
            .send(Request {
                method_id,
                args: args.to_vec(),
            })
            .map_err(|_| self.detached())?;
        trace!(path = %self.path, method_id, "request sent");
        acks.recv().map_err(|_| self.detached())
    }
}

/// Hardware side: receives requests and acknowledges them.
pub struct HardwareEndpoint {
    requests: Receiver<Request>,
    acks: Sender<u64>,
}

impl HardwareEndpoint {
    /// Wait for the next request; `None` once the host side is gone.
    pub fn next_request(&self) -> Option<Request> {
        self.requests.recv().ok()
    }

    /// Acknowledge the current request with its result slot.
    pub fn acknowledge(&self, result: u64) -> bool {
        self.acks.send(result).is_ok()
    }

    /// Serve requests until the host side is dropped.
    pub fn serve<F>(self, mut handler: F)
    where
        F: FnMut(&Request) -> u64,
    {
        while let Some(request) = self.next_request() {
            let result = handler(&request);
            if !self.acknowledge(result) {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn round_trip_across_threads() {
        let (host, hw) = XtorChannel::open("top.xtor");
        let server = thread::spawn(move || hw.serve(|req| req.args.iter().sum::<u64>() + u64::from(req.method_id)));

        assert_eq!(host.invoke(0, &[1, 2, 3]).unwrap(), 6);
        assert_eq!(host.invoke(10, &[]).unwrap(), 10);
        drop(host);
        server.join().unwrap();
    }

    #[test]
    fn concurrent_callers_are_serialized() {
        let (host, hw) = XtorChannel::open("top.xtor");
        let host = Arc::new(host);
        let server = thread::spawn(move || hw.serve(|req| req.args[0] * 2));

        let callers: Vec<_> = (0..4u64)
            .map(|i| {
                let host = Arc::clone(&host);
                thread::spawn(move || host.invoke(0, &[i]).unwrap())
            })
            .collect();
        let mut results: Vec<u64> = callers.into_iter().map(|c| c.join().unwrap()).collect();
        results.sort_unstable();
        assert_eq!(results, vec![0, 2, 4, 6]);

        drop(host);
        server.join().unwrap();
    }

    #[test]
    fn detached_hardware_fails_the_call() {
        let (host, hw) = XtorChannel::open("top.xtor");
        drop(hw);
        match host.invoke(0, &[]) {
            Err(RuntimeError::Detached { path }) => assert_eq!(path, "top.xtor"),
            other => panic!("expected Detached, got {other:?}"),
        }
    }
}
