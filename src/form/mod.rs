mod actions;
pub mod builder;
mod control;
mod error;
mod path;
mod reducers;
mod state;
pub mod validators;

pub use actions::FormCommand;
pub use control::{Control, ControlFlags, ControlStatus, FieldControl, GroupControl, ListControl};
pub use error::{FormError, ValidationErrors};
pub use path::ControlPath;
pub use reducers::apply_command;
pub use state::FormState;
pub use validators::Validator;
