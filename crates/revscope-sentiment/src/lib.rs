//! Review sentiment: compound polarity scoring, threshold classification
//! with aggregate counts, and the presentation-time Summary Reconciler.

pub mod classifier;
pub mod reconciler;
pub mod scorer;

pub use classifier::{
    aggregate, classify, classify_score, record_label, NEGATIVE_THRESHOLD, POSITIVE_THRESHOLD,
};
pub use reconciler::{assign_labels, ranking_score, reconcile};
pub use scorer::polarity_score;
