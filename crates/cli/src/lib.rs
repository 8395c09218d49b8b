// Library side of the `distress` binary, shared with integration tests.

pub mod batch;
