//! Suppression of redundant hints.

use std::collections::{HashMap, HashSet};

use hintkit_protocols::{Align, Document, ElementId, ElementType, HintMeasurement};

type PositionKey = (i64, i64, Align);

/// Collects measured elements of one query and decides which hints are
/// redundant.
///
/// Two rules apply:
/// - a label is dropped in favor of the control it labels;
/// - at a shared anchor position, elements only known to have a click
///   listener are dropped when a real interactive element sits there too.
#[derive(Debug, Default)]
pub struct Deduper {
    groups: HashMap<PositionKey, Vec<(ElementId, ElementType)>>,
    rejected: HashSet<ElementId>,
}

impl Deduper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one measured element.
    pub fn add(
        &mut self,
        document: &dyn Document,
        element: ElementId,
        element_type: ElementType,
        measurement: &HintMeasurement,
    ) {
        self.rejected.extend(document.labels(element));

        let key = (
            measurement.x.round() as i64,
            measurement.y.round() as i64,
            measurement.align,
        );
        self.groups
            .entry(key)
            .or_default()
            .push((element, element_type));
    }

    /// Elements whose hints should be dropped.
    pub fn finish(mut self) -> HashSet<ElementId> {
        for members in self.groups.values() {
            let low_quality = members.iter().filter(|(_, ty)| ty.is_low_quality()).count();
            if low_quality > 0 && low_quality < members.len() {
                self.rejected.extend(
                    members
                        .iter()
                        .filter(|(_, ty)| ty.is_low_quality())
                        .map(|(id, _)| *id),
                );
            }
        }
        self.rejected
    }
}
