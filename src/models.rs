use serde::Serialize;

/// Bounding box in the source image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Y coordinate of the bottom edge (where the building meets the ground)
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A box proposed by the primary object detector
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionCandidate {
    pub bbox: BoundingBox,
    pub confidence: f32,
    pub class_id: u32,
}

impl DetectionCandidate {
    pub fn new(bbox: BoundingBox, confidence: f32, class_id: u32) -> Self {
        Self { bbox, confidence, class_id }
    }
}

/// Outcome of a box selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionResult {
    Selected(BoundingBox),
    NoCandidate,
}

impl SelectionResult {
    pub fn bbox(&self) -> Option<BoundingBox> {
        match self {
            SelectionResult::Selected(bbox) => Some(*bbox),
            SelectionResult::NoCandidate => None,
        }
    }
}

/// Bounding rectangle of one external contour found by the fallback detector
#[derive(Debug, Clone)]
pub struct Contour {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub point_count: usize,
}

impl Contour {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Area of the bounding rectangle (not of the enclosed region)
    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn bottom(&self) -> u32 {
        self.max_y + 1
    }

    pub fn to_bbox(&self) -> BoundingBox {
        BoundingBox::new(self.min_x, self.min_y, self.width(), self.height())
    }
}
