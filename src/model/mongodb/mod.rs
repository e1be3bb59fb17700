mod collection;
mod counter;
mod errors;
mod event_log;

pub use collection::{ensure_indexes_exist, u32_id_filter, Coll, MongoCollection};
pub use counter::{ensure_election_id_counter_exists, Counter, ELECTION_ID_COUNTER_ID};
pub use errors::{is_duplicate_key_error, is_transient_transaction_error};
pub use event_log::EventRecord;
