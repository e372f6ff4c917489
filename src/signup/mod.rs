mod component;
mod customer;
mod messages;
mod options;

pub use component::{
    ADDRESSES_PATH, EMAIL_PATH, NOTIFICATION_PATH, PHONE_PATH, SignupCommand, SignupComponent,
    SubmitOutcome, build_address, build_form, partial_test_data, test_data,
};
pub use customer::Customer;
pub use messages::ValidationMessages;
pub use options::SignupOptions;
