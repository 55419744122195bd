mod envelope;
pub use self::envelope::{ActionResponse, BatchRequest, ListResponse, Stats};
