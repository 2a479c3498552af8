//! Transaction reference generation

use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Length of references produced by the default generator
pub const DEFAULT_REFERENCE_LEN: usize = 10;

/// Pluggable source of transaction references
#[derive(Clone)]
pub struct ReferenceGenerator(Arc<dyn Fn() -> String + Send + Sync>);

impl ReferenceGenerator {
    pub fn new(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn generate(&self) -> String {
        (self.0)()
    }
}

impl Default for ReferenceGenerator {
    fn default() -> Self {
        Self::new(random_reference)
    }
}

impl fmt::Debug for ReferenceGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ReferenceGenerator")
    }
}

/// Ten random lowercase alphanumeric characters.
///
/// Fresh per call; not a global uniqueness guarantee.
pub fn random_reference() -> String {
    let mut reference = Uuid::new_v4().simple().to_string();
    reference.truncate(DEFAULT_REFERENCE_LEN);
    reference
}
