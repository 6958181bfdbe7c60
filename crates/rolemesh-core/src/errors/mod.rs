// SPDX-License-Identifier: Apache-2.0

mod model;

pub use model::{ConfigPathScope, ErrorCode, ExitCode, MachineError, ERROR_CODES};
