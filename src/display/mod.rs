pub mod output;

pub use output::{
    display_error, display_info, display_mastery, display_recommendations, display_report,
    display_success,
};
