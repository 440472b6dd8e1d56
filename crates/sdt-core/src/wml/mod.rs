//! Content control injection for WordprocessingML.

pub mod config;
pub mod document;
pub mod identity;
pub mod locator;
pub mod registry;
pub mod router;
pub mod scheduler;
pub mod settings;
pub mod wrapper;

pub use config::{LockType, SdtConfig, SdtType};
pub use document::{SdtDocument, SdtInfo};
pub use identity::{fingerprint, Fingerprint, FingerprintCache};
pub use locator::{ControlFilter, Locator, RootContext};
pub use registry::ProcessedRegistry;
pub use router::{InjectionPair, InjectionReport, PartFailure, PartReport};
pub use settings::{FallbackPolicy, InjectionSettings};
pub use wrapper::{wrap, WrapFlavor};
