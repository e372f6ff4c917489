use std::time::Instant;

use super::{actions::FormCommand, error::FormError, state::FormState};

pub fn apply_command(
    state: &mut FormState,
    command: FormCommand,
    at: Instant,
) -> Result<(), FormError> {
    match command {
        FormCommand::Input { path, value } => state.input(path, value, at),
        FormCommand::Touch { path } => state.touch(path),
        FormCommand::TouchAll => {
            state.mark_all_as_touched();
            Ok(())
        }
        FormCommand::SetValue(value) => state.set_value(&value, at),
        FormCommand::PatchValue(value) => {
            state.patch_value(&value, at);
            Ok(())
        }
        FormCommand::Reset => {
            state.reset(at);
            Ok(())
        }
    }
}
