//! voxbrief HTTP server binary.
//! Run with: cargo run --bin voxbrief-server

use std::process::ExitCode;

use voxbrief::start_voxbrief;

fn main() -> ExitCode {
    start_voxbrief::run()
}
