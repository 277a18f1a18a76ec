//! CI step protocol: reading inputs and publishing outputs.

mod inputs;
mod outputs;

pub use inputs::{
    RawInputs, ReleaseRequest, TAG_REF_PREFIX, optional, parse_flag, required, strip_ref_prefix,
};
pub use outputs::{
    OUTPUT_FILE_ENV, StepOutputs, error_annotation, escape_data, escape_property, file_command,
};
