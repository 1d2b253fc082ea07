//! Manifest loading from a file or stdin

use std::io::{self, Read};
use std::path::Path;

use tracing::{debug, instrument};

use crate::application::Manifest;
use crate::infrastructure::{InfraError, InfraResult};

/// Path that selects stdin instead of a file.
pub const STDIN_PATH: &str = "-";

/// Read and parse a manifest. `-` reads from stdin.
#[instrument(level = "debug")]
pub fn load_manifest(path: &Path) -> InfraResult<Manifest> {
    let content = if path == Path::new(STDIN_PATH) {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| InfraError::io("read manifest from stdin", e))?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| InfraError::io(format!("read manifest {}", path.display()), e))?
    };
    debug!(bytes = content.len(), "manifest read");
    Ok(Manifest::parse(&content)?)
}
