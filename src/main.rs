//! Input stealer host.
//!
//! Opens the input session, then streams translated events to stdout as
//! JSON lines while taking commands on stdin. Logs go to stderr.

#[cfg(target_os = "linux")]
mod host;

#[cfg(target_os = "linux")]
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    host::run().await
}

#[cfg(not(target_os = "linux"))]
fn main() {
    eprintln!("input-stealer needs Linux (libinput and evdev)");
    std::process::exit(1);
}
