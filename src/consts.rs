// Runtime parameters
pub const CANVAS_WIDTH: usize = 125;
pub const CANVAS_HEIGHT: usize = 100;
pub const OUT_FILE: &str = "./out.png";
pub const DEFAULT_SAMPLES: usize = 1;
pub const DEFAULT_BATCH: usize = 1;

// Floating point comparisons, also the shadow "acne" offset
pub const FEQ_EPSILON: f64 = 0.00001;

// Below this a determinant or a vector length counts as zero
pub const ZERO_EPSILON: f64 = 1e-10;
