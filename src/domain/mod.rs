pub mod access;
pub mod duration;
pub mod policy;
pub mod quota;

pub use access::{Action, ActionParseError, Principal, RecipeAccess, can_access};
pub use duration::{humanize_duration, recipe_duration_display, step_duration_display};
pub use policy::{Denial, PolicyChain, PolicyContext};
pub use quota::{QuotaDecision, can_add_recipe, demo_limit_warning, is_demo_account};
