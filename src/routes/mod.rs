pub(crate) mod counter;
pub(crate) mod router;
pub(crate) mod stats;
