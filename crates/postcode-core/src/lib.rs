pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod locality;
pub mod options;
pub mod panel;
pub mod pool;
pub mod registry;

pub use config::AustPostcodeConfig;
pub use controller::{ControllerState, FieldGroupController, Keystroke, LookupRequest, Notice};
pub use error::{PostcodeError, Result};
pub use locality::{FieldGroup, FieldValues, Locality};
pub use options::{FieldGroupOptions, OptionKey};
pub use panel::{Bounds, ResultPanel};
pub use pool::PostcodePool;
pub use registry::FieldGroupRegistry;
