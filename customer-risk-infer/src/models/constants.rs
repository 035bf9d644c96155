pub const LABEL_OUTPUT: &str = "label";
pub const PROBABILITIES_OUTPUT: &str = "probabilities";
pub const SCORES_OUTPUT: &str = "scores";

pub const COEFFICIENTS_TENSOR: &str = "coefficients";
pub const INTERCEPT_TENSOR: &str = "intercept";
pub const NEIGHBORS_TENSOR: &str = "neighbors";
pub const NEIGHBOR_LABELS_TENSOR: &str = "neighbor_labels";
pub const K_TENSOR: &str = "k";
pub const CENTROIDS_TENSOR: &str = "centroids";
