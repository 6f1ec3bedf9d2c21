//! Entry point for the `gbfs` binary.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = gbfs_server::run() {
        eprintln!("gbfs: {err}");
        std::process::exit(1);
    }
}
