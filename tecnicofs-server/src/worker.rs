//! The worker pool (spec §4.E transport note): a fixed number of threads
//! blocked on the same datagram socket. The kernel serializes concurrent
//! `recvfrom` calls on one socket, so no queue or dispatcher thread is
//! needed between "packet arrives" and "a worker picks it up" — every
//! worker races directly against the socket, and the `Engine`'s own
//! per-inode locking is what makes that safe.

use std::os::unix::net::UnixDatagram;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, warn};
use tecnicofs_core::{Engine, MAX_INPUT_SIZE};
use tecnicofs_proto::{encode_response, Request};

use crate::dispatch;

pub struct Pool {
    handles: Vec<JoinHandle<()>>,
}

impl Pool {
    /// Spawns `num_threads` workers sharing `socket` and `engine`. Each
    /// worker owns an independent clone of the socket fd (required since
    /// `recv_from`/`send_to` take `&self` but we still want distinct
    /// `JoinHandle`s to join on shutdown).
    pub fn spawn(socket: &UnixDatagram, engine: Arc<Engine>, num_threads: usize) -> std::io::Result<Self> {
        let mut handles = Vec::with_capacity(num_threads);
        for id in 0..num_threads {
            let worker_socket = socket.try_clone()?;
            let engine = Arc::clone(&engine);
            handles.push(thread::spawn(move || worker_loop(id, worker_socket, engine)));
        }
        Ok(Self { handles })
    }

    /// Blocks until every worker thread exits. Workers only exit on a fatal
    /// socket error, so under normal operation this never returns.
    pub fn join(self) {
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}

fn worker_loop(id: usize, socket: UnixDatagram, engine: Arc<Engine>) {
    let mut buf = [0u8; MAX_INPUT_SIZE];
    loop {
        let (len, client_addr) = match socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(err) => {
                warn!("worker {id}: recv_from failed, exiting: {err}");
                return;
            }
        };
        // The original grammar is NUL-terminated ASCII; trim it before the
        // UTF-8 line parser sees it.
        let line = String::from_utf8_lossy(&buf[..len]);
        let line = line.trim_end_matches('\0');

        let response = match Request::parse(line) {
            Ok(request) => {
                debug!("worker {id}: {request:?}");
                dispatch::apply(&engine, &request)
            }
            Err(err) => {
                warn!("worker {id}: malformed command {line:?}: {err}");
                -1
            }
        };

        let Some(path) = client_addr.as_pathname() else {
            warn!("worker {id}: client datagram had no return address, dropping response");
            continue;
        };
        if let Err(err) = socket.send_to(&encode_response(response), path) {
            warn!("worker {id}: failed to reply to {path:?}: {err}");
        }
    }
}
