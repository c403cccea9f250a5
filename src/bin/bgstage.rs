//! Product staging CLI tool
//!
//! Command-line interface for compositing product photos onto background
//! image sets with the bgstage library.

#[cfg(feature = "cli")]
use bgstage::cli;

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
