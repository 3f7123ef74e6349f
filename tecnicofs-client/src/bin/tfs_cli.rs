//! `tfs-cli`: a thin command-line front end over `tecnicofs_client::Client`,
//! issuing a single operation per invocation.

use clap::{Parser, Subcommand};
use tecnicofs_core::Kind;
use tecnicofs_client::Client;

#[derive(Debug, Parser)]
#[command(name = "tfs-cli", about = "TecnicoFS client")]
struct Cli {
    /// Path of the server's datagram socket.
    #[arg(long = "socket")]
    socket_path: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a file.
    Touch { path: String },
    /// Create a directory.
    Mkdir { path: String },
    /// Delete a file or (empty) directory.
    Rm { path: String },
    /// Look up a path's inumber.
    Lookup { path: String },
    /// Move a file or directory.
    Mv { from: String, to: String },
    /// Write the whole tree to a server-local file.
    Print { output_path: String },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let client = Client::mount(&cli.socket_path).unwrap_or_else(|err| {
        eprintln!("tfs-cli: mount failed: {err}");
        std::process::exit(1);
    });

    let result = match &cli.command {
        Command::Touch { path } => client.create(path, Kind::File),
        Command::Mkdir { path } => client.create(path, Kind::Dir),
        Command::Rm { path } => client.delete(path),
        Command::Lookup { path } => client.lookup(path),
        Command::Mv { from, to } => client.mv(from, to),
        Command::Print { output_path } => client.print(output_path),
    };

    match result {
        Ok(code) if code >= 0 => {
            println!("{code}");
        }
        Ok(code) => {
            eprintln!("tfs-cli: operation failed with code {code}");
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("tfs-cli: transport error: {err}");
            std::process::exit(1);
        }
    }
}
