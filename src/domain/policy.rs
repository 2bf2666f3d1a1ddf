//! Per-request permission checks.
//!
//! A handler builds a [`PolicyChain`] of named checks and evaluates it against
//! a [`PolicyContext`]. Checks run in insertion order and the first denial
//! wins, so authentication is always registered first.

use super::{
    access::{Action, Principal, RecipeAccess, can_access},
    quota::{QuotaDecision, can_add_recipe, is_demo_account},
};

#[derive(Debug, Clone, Copy)]
pub struct PolicyContext<'a> {
    pub user: Option<&'a Principal>,
    pub recipe: Option<RecipeAccess>,
    pub action: Option<Action>,
}

impl<'a> PolicyContext<'a> {
    pub fn new(user: Option<&'a Principal>) -> Self {
        Self {
            user,
            recipe: None,
            action: None,
        }
    }

    pub fn on_recipe(mut self, recipe: RecipeAccess, action: Action) -> Self {
        self.recipe = Some(recipe);
        self.action = Some(action);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Denial {
    #[error("Authentication required")]
    Unauthenticated,
    #[error("You do not have permission to {action} this recipe")]
    Forbidden { action: Action },
    #[error("Recipe not found")]
    NotVisible,
    #[error("{message}")]
    QuotaExceeded { message: String },
    /// A check was registered for a context that cannot satisfy it.
    #[error("policy check '{check}' misconfigured: {reason}")]
    Misconfigured {
        check: &'static str,
        reason: &'static str,
    },
}

type Check<'a> = Box<dyn Fn(&PolicyContext<'_>) -> Result<(), Denial> + Send + Sync + 'a>;

#[derive(Default)]
pub struct PolicyChain<'a> {
    checks: Vec<(&'static str, Check<'a>)>,
}

impl<'a> PolicyChain<'a> {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    pub fn check<F>(mut self, name: &'static str, check: F) -> Self
    where
        F: Fn(&PolicyContext<'_>) -> Result<(), Denial> + Send + Sync + 'a,
    {
        self.checks.push((name, Box::new(check)));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|(name, _)| *name).collect()
    }

    pub fn evaluate(&self, ctx: &PolicyContext<'_>) -> Result<(), Denial> {
        for (name, check) in &self.checks {
            if let Err(denial) = check(ctx) {
                match &denial {
                    Denial::Misconfigured { .. } => {
                        tracing::error!(check = *name, %denial, "policy chain misconfigured")
                    }
                    _ => tracing::debug!(check = *name, %denial, "policy check denied request"),
                }
                return Err(denial);
            }
        }
        Ok(())
    }

    /// Chain guarding an existing recipe: authentication, then ownership or
    /// visibility depending on the action.
    pub fn recipe_access() -> Self {
        Self::new()
            .check("authenticated", require_authenticated)
            .check("recipe_access", require_recipe_access)
    }

    /// Chain guarding recipe creation: authentication, then the demo quota.
    pub fn recipe_creation(demo_username: &'a str, owned_recipes: u64, recipe_limit: u64) -> Self {
        Self::new()
            .check("authenticated", require_authenticated)
            .check("demo_quota", move |ctx| {
                let Some(user) = ctx.user else {
                    return Err(Denial::Unauthenticated);
                };
                let is_demo = is_demo_account(user, demo_username);
                match can_add_recipe(user, owned_recipes, is_demo, recipe_limit) {
                    QuotaDecision::Allowed => Ok(()),
                    QuotaDecision::Denied { warning } => {
                        Err(Denial::QuotaExceeded { message: warning })
                    }
                }
            })
    }
}

pub fn require_authenticated(ctx: &PolicyContext<'_>) -> Result<(), Denial> {
    match ctx.user {
        Some(_) => Ok(()),
        None => Err(Denial::Unauthenticated),
    }
}

/// A non-owner trying to modify a recipe they can see gets `Forbidden`; a
/// recipe they cannot see at all stays hidden behind `NotVisible`.
pub fn require_recipe_access(ctx: &PolicyContext<'_>) -> Result<(), Denial> {
    let (Some(recipe), Some(action)) = (ctx.recipe, ctx.action) else {
        return Err(Denial::Misconfigured {
            check: "recipe_access",
            reason: "no recipe or action in context",
        });
    };

    if can_access(ctx.user, recipe, action) {
        return Ok(());
    }
    if ctx.user.is_none() {
        return Err(Denial::Unauthenticated);
    }

    match action {
        Action::Read => Err(Denial::NotVisible),
        Action::Modify if can_access(ctx.user, recipe, Action::Read) => {
            Err(Denial::Forbidden { action })
        }
        Action::Modify => Err(Denial::NotVisible),
    }
}
