use tracing::debug;

use crate::config::SelectionThresholds;
use crate::models::{DetectionCandidate, SelectionResult};

/// Picks one building box out of the primary detector's candidates
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxSelector {
    pub thresholds: SelectionThresholds,
}

impl BoxSelector {
    pub fn new(thresholds: SelectionThresholds) -> Self {
        Self { thresholds }
    }

    /// Ground-plane plausibility: tall enough and with its base in the lower part of the frame
    pub fn is_grounded(&self, candidate: &DetectionCandidate, image_height: u32) -> bool {
        let img_h = image_height as f64;
        let bbox = &candidate.bbox;
        bbox.height as f64 > self.thresholds.min_height_fraction * img_h
            && bbox.bottom() as f64 >= self.thresholds.min_bottom_fraction * img_h
    }

    /// Select a box from candidates in detector emission order
    ///
    /// The first grounded candidate wins, even when a later grounded candidate has a
    /// higher confidence. With no grounded candidate the most confident one is used
    /// regardless of geometry. An empty list yields `NoCandidate`.
    pub fn select(&self, candidates: &[DetectionCandidate], image_height: u32) -> SelectionResult {
        for c in candidates {
            debug!(
                "Confidence: {:.2}, Box: ({}, {}, {}, {}), Class: {}",
                c.confidence,
                c.bbox.x,
                c.bbox.y,
                c.bbox.right(),
                c.bbox.bottom(),
                c.class_id
            );
        }

        if let Some(grounded) = candidates.iter().find(|c| self.is_grounded(c, image_height)) {
            return SelectionResult::Selected(grounded.bbox);
        }

        // First maximum wins ties
        let best = candidates.iter().fold(None, |best: Option<&DetectionCandidate>, c| match best {
            Some(b) if b.confidence >= c.confidence => Some(b),
            _ => Some(c),
        });

        match best {
            Some(c) => {
                debug!(
                    "no grounded candidate among {}, using highest confidence {:.2}",
                    candidates.len(),
                    c.confidence
                );
                SelectionResult::Selected(c.bbox)
            }
            None => SelectionResult::NoCandidate,
        }
    }
}
