//! Viewer packager - assembles platform installers from a staged build tree.
//!
//! Produces an NSIS installer (.exe), a compressed disk image (.dmg) or a
//! .tar.xz archive, depending on `--platform`.

use std::process;
use viewer_packager::cli::{self, Args};

#[tokio::main]
async fn main() {
    let args = Args::parse_args();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .init();

    let exit_code = match cli::run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
