mod core;
mod endpoints;

pub use core::{
    CallRecord, CallRecordForm, create_call_record_table, get_call_records, upsert_call_record,
};
pub use endpoints::{get_call_records_endpoint, upsert_call_record_endpoint};
