//! The client API (spec §10/§13): a thin, safe wrapper over the datagram
//! protocol mirroring the original `tecnicofs-client-api.c` one call per
//! request, one blocking reply per call.

use std::io;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};

use log::debug;
use tecnicofs_core::{Kind, MAX_INPUT_SIZE};
use tecnicofs_proto::{decode_response, Request};

/// A mounted connection to a TecnicoFS server. Unmounts (removes its
/// client-side socket file) when dropped, so callers never need to remember
/// to call `unmount` on every exit path — including panics.
pub struct Client {
    socket: UnixDatagram,
    client_path: PathBuf,
}

impl Client {
    /// `tfsMount`: binds an ephemeral client socket and connects it to the
    /// server's well-known path.
    pub fn mount(server_socket_path: impl AsRef<Path>) -> io::Result<Self> {
        let client_path = PathBuf::from(format!("/tmp/tfs-client-{}.sock", std::process::id()));
        let _ = std::fs::remove_file(&client_path);

        let socket = UnixDatagram::bind(&client_path)?;
        socket.connect(server_socket_path)?;
        debug!("mounted client socket at {client_path:?}");
        Ok(Self { socket, client_path })
    }

    fn round_trip(&self, request: &Request) -> io::Result<i32> {
        let wire = request.to_wire();
        debug_assert!(wire.len() < MAX_INPUT_SIZE, "command exceeds MAX_INPUT_SIZE");
        self.socket.send(wire.as_bytes())?;

        let mut buf = [0u8; 4];
        self.socket.recv(&mut buf)?;
        Ok(decode_response(buf))
    }

    /// `tfsCreate`.
    pub fn create(&self, path: &str, kind: Kind) -> io::Result<i32> {
        self.round_trip(&Request::Create {
            path: path.to_owned(),
            kind,
        })
    }

    /// `tfsDelete`.
    pub fn delete(&self, path: &str) -> io::Result<i32> {
        self.round_trip(&Request::Delete { path: path.to_owned() })
    }

    /// `tfsLookup`. Returns the server's raw response: a positive inumber on
    /// success, a negative error code otherwise.
    pub fn lookup(&self, path: &str) -> io::Result<i32> {
        self.round_trip(&Request::Lookup { path: path.to_owned() })
    }

    /// `tfsMove`.
    pub fn mv(&self, from: &str, to: &str) -> io::Result<i32> {
        self.round_trip(&Request::Move {
            from: from.to_owned(),
            to: to.to_owned(),
        })
    }

    /// `tfsPrint`. `output_path` is resolved on the *server*, matching the
    /// original API (the tree is written to a path the server can open).
    pub fn print(&self, output_path: &str) -> io::Result<i32> {
        self.round_trip(&Request::Print {
            output_path: output_path.to_owned(),
        })
    }
}

impl Drop for Client {
    /// `tfsUnmount`: the socket fd closes itself via `UnixDatagram`'s own
    /// `Drop`; this only needs to clean up the bound path left on disk.
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.client_path);
    }
}
