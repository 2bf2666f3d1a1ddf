use super::access::Principal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaDecision {
    Allowed,
    Denied { warning: String },
}

impl QuotaDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, QuotaDecision::Allowed)
    }
}

pub fn is_demo_account(user: &Principal, demo_username: &str) -> bool {
    user.username == demo_username
}

pub fn demo_limit_warning(recipe_limit: u64) -> String {
    format!(
        "Demo user can have no more than {recipe_limit} recipes. \
         Also, keep in mind that the demo user data is deleted on daily basis."
    )
}

/// Decides whether `user` may create one more recipe.
///
/// Regular accounts are never capped. The demo account may hold at most
/// `recipe_limit` recipes; a denial carries the warning shown to the client.
pub fn can_add_recipe(
    user: &Principal,
    current_recipe_count: u64,
    is_demo_account: bool,
    recipe_limit: u64,
) -> QuotaDecision {
    if !is_demo_account || current_recipe_count < recipe_limit {
        return QuotaDecision::Allowed;
    }

    let warning = demo_limit_warning(recipe_limit);
    tracing::warn!(
        username = %user.username,
        current_recipe_count,
        recipe_limit,
        "{warning}"
    );
    QuotaDecision::Denied { warning }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn user(username: &str) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            username: username.to_string(),
        }
    }

    #[test]
    fn regular_accounts_are_never_capped() {
        let cook = user("cook");
        assert!(can_add_recipe(&cook, 0, false, 10).is_allowed());
        assert!(can_add_recipe(&cook, 10_000, false, 10).is_allowed());
    }

    #[test]
    fn demo_account_below_limit_is_allowed() {
        let demo = user("demo");
        assert!(can_add_recipe(&demo, 9, true, 10).is_allowed());
    }

    #[test]
    fn demo_account_at_limit_is_denied_with_warning() {
        let demo = user("demo");
        let decision = can_add_recipe(&demo, 10, true, 10);
        let QuotaDecision::Denied { warning } = decision else {
            panic!("expected a denial");
        };
        assert!(warning.contains("no more than 10 recipes"));
        assert!(warning.contains("deleted on daily basis"));
    }

    #[test]
    fn limit_comes_from_the_caller() {
        let demo = user("demo");
        assert!(!can_add_recipe(&demo, 3, true, 3).is_allowed());
        assert!(can_add_recipe(&demo, 3, true, 4).is_allowed());
    }

    #[test]
    fn demo_account_is_matched_by_username() {
        assert!(is_demo_account(&user("demo"), "demo"));
        assert!(!is_demo_account(&user("demo2"), "demo"));
    }
}
