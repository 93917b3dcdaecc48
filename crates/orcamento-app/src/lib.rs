// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod catalog;
pub mod codec;
pub mod format;
pub mod model;
pub mod quote;
pub mod state;
pub mod workflow;

pub use catalog::*;
pub use codec::*;
pub use format::*;
pub use model::*;
pub use quote::*;
pub use state::*;
pub use workflow::*;
