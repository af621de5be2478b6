//! # rustcomplete-process
//!
//! **Purpose**: Deadline-bounded subprocess execution for rustcomplete
//!
//! External tools (`racer`, `cargo`) are one-shot processes: they get the
//! buffer on stdin, print their answer, and exit. This crate spawns them with
//! piped stdio, services every pipe concurrently, and force-kills a process
//! that outlives its deadline.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rustcomplete_process::{ProcessManager, ProcessConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProcessConfig::new("racer")
//!     .args(["complete-with-snippet", "1", "4", "/dev/stdin"])
//!     .timeout_ms(5_000);
//!
//! let output = ProcessManager::new().run(config, b"fn main() { std:: }").await?;
//! if output.success() {
//!     println!("{}", output.stdout_lossy());
//! }
//! # Ok(())
//! # }
//! ```

pub mod child;
pub mod config;
pub mod error;
pub mod manager;

pub use child::{ManagedChild, ProcessOutput};
pub use config::ProcessConfig;
pub use error::{ProcessError, Result};
pub use manager::ProcessManager;
