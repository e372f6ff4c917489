#![deny(rust_2018_idioms)]

pub mod form;
pub mod io;
pub mod reactive;
pub mod signup;

pub use form::{
    Control, ControlPath, ControlStatus, FormCommand, FormError, FormState, ValidationErrors,
};
pub use io::{DocumentFormat, parse_document_str, render_value};
pub use signup::{Customer, SignupCommand, SignupComponent, SignupOptions, SubmitOutcome};

pub mod prelude {
    pub use super::{
        ControlPath, FormCommand, FormError, SignupCommand, SignupComponent, SignupOptions,
        SubmitOutcome,
    };
}
