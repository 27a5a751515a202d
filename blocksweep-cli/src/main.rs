//! The `blocksweep` binary.

fn main() -> anyhow::Result<()> {
    blocksweep_cli::run()
}
