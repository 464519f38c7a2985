mod event;
mod flow_key;
mod record;
mod view;

pub use event::{EventPosition, FlowUpdateEvent};
pub use flow_key::FlowKey;
pub use record::FlowRecord;
pub use view::{FlowDirection, FlowEntry, FlowView};
