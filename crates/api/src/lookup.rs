use spacelift_outputs_types::OutputSet;

use crate::error::OutputNotFound;

/// Value of the first output named `name`.
pub fn find_output<'a>(outputs: &'a OutputSet, name: &str) -> Result<&'a str, OutputNotFound> {
    outputs
        .iter()
        .find(|output| output.id == name)
        .map(|output| output.value.as_str())
        .ok_or_else(|| OutputNotFound {
            name: name.to_string(),
            stack_id: outputs.stack_id().to_string(),
        })
}
