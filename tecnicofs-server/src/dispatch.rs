//! Translates a parsed `Request` into an `Engine` call and a wire response
//! code. Shared between the socket worker pool and `--script` replay, so the
//! two modes can never drift in what a command means.

use std::fs::File;

use log::{error, info};
use tecnicofs_core::{Engine, FsError};
use tecnicofs_proto::Request;

/// Runs `request` against `engine`, returning the wire response code: the
/// resolved inumber for a successful `lookup`, `0` for any other success,
/// `err.code()` on failure.
pub fn apply(engine: &Engine, request: &Request) -> i32 {
    let result = dispatch(engine, request);
    match result {
        Ok(value) => value,
        Err(err) => {
            error!("{request:?} failed: {err}");
            err.code()
        }
    }
}

fn dispatch(engine: &Engine, request: &Request) -> Result<i32, FsError> {
    match request {
        Request::Create { path, kind } => {
            engine.create(path, *kind)?;
            Ok(0)
        }
        Request::Delete { path } => {
            engine.delete(path)?;
            Ok(0)
        }
        Request::Lookup { path } => {
            let inumber = engine.lookup(path)?;
            Ok(inumber as i32)
        }
        Request::Move { from, to } => {
            engine.mv(from, to)?;
            Ok(0)
        }
        Request::Print { output_path } => {
            let mut file = File::create(output_path).map_err(|_| FsError::NotFound)?;
            engine.print_tree(&mut file).map_err(|_| FsError::Locking)?;
            info!("printed tree to {output_path}");
            Ok(0)
        }
    }
}
