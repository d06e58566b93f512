//! `soundctl` binary entry point.

fn main() -> anyhow::Result<()> {
    soundctl::run()
}
