use std::sync::Arc;

use crate::disc::{DiscError, DiscReader};

#[cfg(feature = "libbluray")]
mod libbluray;
mod simulated;

#[cfg(feature = "libbluray")]
pub use libbluray::LibblurayReader;
pub use simulated::{SimulatedReader, sample_disc};

pub fn get_reader(simulation: bool) -> Result<Arc<dyn DiscReader>, DiscError> {
    if simulation {
        return Ok(Arc::new(SimulatedReader::default()));
    }

    native_reader()
}

#[cfg(feature = "libbluray")]
fn native_reader() -> Result<Arc<dyn DiscReader>, DiscError> {
    Ok(Arc::new(LibblurayReader))
}

#[cfg(not(feature = "libbluray"))]
fn native_reader() -> Result<Arc<dyn DiscReader>, DiscError> {
    Err(DiscError::BackendUnavailable(
        "built without the `libbluray` feature; rebuild with it or pass --simulation".to_string(),
    ))
}
