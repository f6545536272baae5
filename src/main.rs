//! # muncher CLI
//!
//! Command-line interface for Steam Muncher.
//!
//! ## Usage
//! ```bash
//! muncher scan
//! muncher clean --drive D:\ --threshold-kib 4
//! ```

mod cli;

use steam_muncher::Result;

fn main() -> Result<()> {
    cli::run()
}
