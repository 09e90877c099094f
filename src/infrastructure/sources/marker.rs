use std::path::PathBuf;

use crate::domain::ports::source::DisableMarker;

/// Disables a check while the file exists.
pub struct MarkerFile {
    path: PathBuf,
}

impl MarkerFile {
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            path: PathBuf::from(shellexpand::tilde(path).as_ref()),
        }
    }
}

impl DisableMarker for MarkerFile {
    fn describe(&self) -> String {
        format!("marker {}", self.path.display())
    }

    fn is_disabled(&self) -> bool {
        self.path.exists()
    }
}
