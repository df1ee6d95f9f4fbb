//! Null output.
use crate::build::{BuildOutput, OutputCommon};
use crate::misc::SharedWriter;
use crate::Result;
use serde::{Deserialize, Serialize};

/// An output builder which discards every record.
#[derive(Debug, Default)]
pub struct NullOutputBuilder {
    common: OutputCommon,
}
impl NullOutputBuilder {
    /// Makes a new `NullOutputBuilder` instance.
    pub fn new() -> Self {
        NullOutputBuilder::default()
    }
}
impl BuildOutput for NullOutputBuilder {
    fn common(&self) -> &OutputCommon {
        &self.common
    }

    fn name(&self) -> String {
        "null".to_owned()
    }

    fn open(&self) -> Result<Option<SharedWriter>> {
        Ok(None)
    }
}

/// The configuration of `NullOutputBuilder`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullOutputConfig {}
impl NullOutputConfig {
    pub(crate) fn to_builder(&self) -> NullOutputBuilder {
        NullOutputBuilder::new()
    }
}
