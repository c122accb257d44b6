pub mod picker;
pub mod reconciler;
pub mod record;

pub use picker::{FrequencyOption, FrequencyPicker, NO_DECODERS_LABEL};
pub use reconciler::{
    Marker, MarkerSet, Reconciled, RenderView, TaskLine, TaskListReconciler, SUMMARY_THRESHOLD,
};
pub use record::{
    frequency_label, parse_snapshot, ParsedSnapshot, SkippedEntry, Snapshot, SourceKind,
    TaskEntry, TaskKind, TaskRecord,
};
