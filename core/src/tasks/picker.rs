use crate::tasks::record::{frequency_label, Snapshot};
use std::fmt;

pub const NO_DECODERS_LABEL: &str = "No Decoders";

/// One entry of the stop-decoder frequency list.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyOption {
    pub value_hz: f64,
    pub label: String,
    pub enabled: bool,
}

impl fmt::Display for FrequencyOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Frequencies of running decoders, rebuilt from scratch on every poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyPicker {
    options: Vec<FrequencyOption>,
}

impl FrequencyPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebuild(&mut self, snapshot: &Snapshot) {
        self.options.clear();
        self.options.extend(
            snapshot
                .values()
                .filter(|record| record.is_tuned())
                .map(|record| FrequencyOption {
                    value_hz: record.frequency_hz,
                    label: frequency_label(record.frequency_hz),
                    enabled: true,
                }),
        );

        if self.options.is_empty() {
            self.options.push(FrequencyOption {
                value_hz: 0.0,
                label: NO_DECODERS_LABEL.to_string(),
                enabled: false,
            });
        }
    }

    pub fn options(&self) -> &[FrequencyOption] {
        &self.options
    }

    pub fn selectable(&self) -> Vec<FrequencyOption> {
        self.options
            .iter()
            .filter(|option| option.enabled)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::record::TaskRecord;

    fn snapshot_of(records: Vec<TaskRecord>) -> Snapshot {
        records
            .into_iter()
            .map(|record| (record.identifier.clone(), record))
            .collect()
    }

    #[test]
    fn tuned_tasks_become_options() {
        let mut picker = FrequencyPicker::new();
        picker.rebuild(&snapshot_of(vec![
            TaskRecord::decoding("0", 403_500_000.0, Some("RS41".into())),
            TaskRecord::decoding("1", 1_680_000_000.0, None),
            TaskRecord::scanning("2"),
        ]));
        let labels: Vec<&str> = picker.options().iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["403.500", "1680.000"]);
        assert_eq!(picker.options()[0].value_hz, 403_500_000.0);
        assert!(picker.options().iter().all(|o| o.enabled));
    }

    #[test]
    fn no_tuned_tasks_yields_disabled_placeholder() {
        let mut picker = FrequencyPicker::new();
        picker.rebuild(&snapshot_of(vec![
            TaskRecord::scanning("0"),
            TaskRecord::idle("1"),
        ]));
        assert_eq!(picker.options().len(), 1);
        assert_eq!(picker.options()[0].label, NO_DECODERS_LABEL);
        assert!(!picker.options()[0].enabled);
        assert!(picker.selectable().is_empty());
    }

    #[test]
    fn rebuild_discards_previous_options() {
        let mut picker = FrequencyPicker::new();
        picker.rebuild(&snapshot_of(vec![TaskRecord::decoding(
            "0",
            402_000_000.0,
            None,
        )]));
        picker.rebuild(&snapshot_of(vec![TaskRecord::decoding(
            "1",
            405_100_000.0,
            None,
        )]));
        assert_eq!(picker.options().len(), 1);
        assert_eq!(picker.options()[0].label, "405.100");

        picker.rebuild(&Snapshot::new());
        assert_eq!(picker.options().len(), 1);
        assert!(!picker.options()[0].enabled);
    }
}
