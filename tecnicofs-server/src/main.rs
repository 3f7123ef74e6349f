//! TecnicoFS server binary: binds the datagram socket, spins up the worker
//! pool, and runs until killed — or, with `--script`, replays a command file
//! through the same dispatcher and exits.

mod cli;
mod dispatch;
mod worker;

use std::fs;
use std::io::{BufRead, BufReader};
use std::os::unix::net::UnixDatagram;
use std::sync::Arc;

use clap::Parser;
use log::{info, warn};
use tecnicofs_core::{Config, Engine};

use cli::Cli;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let engine = Arc::new(Engine::with_config(Config::new(cli.inode_table_size)));

    if let Some(script_path) = &cli.script {
        run_script(&engine, script_path);
        return;
    }

    run_server(&engine, &cli);
}

fn run_script(engine: &Engine, script_path: &std::path::Path) {
    let file = fs::File::open(script_path).unwrap_or_else(|err| {
        eprintln!("tfs-server: cannot open script {script_path:?}: {err}");
        std::process::exit(1);
    });
    for line in BufReader::new(file).lines() {
        let line = line.expect("reading script line");
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match tecnicofs_proto::Request::parse(trimmed) {
            Ok(request) => {
                let code = dispatch::apply(engine, &request);
                println!("{trimmed} -> {code}");
            }
            Err(err) => warn!("skipping malformed line {trimmed:?}: {err}"),
        }
    }
}

fn run_server(engine: &Arc<Engine>, cli: &Cli) {
    let _ = fs::remove_file(&cli.socket_path);
    let socket = UnixDatagram::bind(&cli.socket_path).unwrap_or_else(|err| {
        eprintln!("tfs-server: cannot bind {:?}: {err}", cli.socket_path);
        std::process::exit(1);
    });
    info!(
        "listening on {:?} with {} worker(s)",
        cli.socket_path, cli.num_threads
    );

    let pool = worker::Pool::spawn(&socket, Arc::clone(engine), cli.num_threads)
        .expect("failed to spawn worker pool");
    pool.join();
}
