//! Command-line configuration (spec §12.3), mirroring the original
//! `./tecnicofs numberthreads socketname` invocation as `clap` flags.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "tfs-server", about = "TecnicoFS datagram server")]
pub struct Cli {
    /// Path of the AF_UNIX datagram socket to bind and listen on.
    pub socket_path: PathBuf,

    /// Number of worker threads draining the socket.
    #[arg(short = 'n', long = "threads", default_value_t = 4)]
    pub num_threads: usize,

    /// Number of inode slots in the table, including the root.
    #[arg(long = "inode-table-size", default_value_t = tecnicofs_core::MAX_INODES)]
    pub inode_table_size: usize,

    /// Replay commands from a script file instead of listening on a socket.
    /// Each line uses the same grammar as a client datagram.
    #[arg(long = "script")]
    pub script: Option<PathBuf>,
}
