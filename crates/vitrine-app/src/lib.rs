// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod adapter;
pub mod codec;
pub mod error;
pub mod features;
pub mod filters;
pub mod ids;
pub mod listing;
pub mod model;
pub mod paging;
pub mod policy;
pub mod session;
pub mod state;

pub use adapter::*;
pub use codec::*;
pub use error::*;
pub use features::*;
pub use filters::*;
pub use ids::*;
pub use listing::*;
pub use model::*;
pub use paging::*;
pub use policy::*;
pub use session::*;
pub use state::*;
