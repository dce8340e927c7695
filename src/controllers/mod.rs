pub(crate) mod counter;
pub(crate) mod stats;
