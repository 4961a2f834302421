//! Account command handler.

use plexly_core::Account;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::Context;

fn joined(items: &[String]) -> Option<String> {
    (!items.is_empty()).then(|| items.join(", "))
}

fn detail(account: &Account, color: bool) -> String {
    let entitlements = if account.all_entitlements {
        Some("all".to_owned())
    } else {
        joined(&account.entitlements)
    };

    output::render_detail(
        &[
            ("Username", account.username.clone()),
            ("Title", account.title.clone()),
            ("Email", account.email.clone()),
            ("ID", account.id.clone()),
            ("UUID", account.uuid.clone()),
            ("Locale", account.locale.clone()),
            ("Home", Some(output::yes_no(account.home))),
            ("Restricted", Some(output::yes_no(account.restricted))),
            ("Max home size", account.max_home_size.map(|n| n.to_string())),
            ("Subscription", Some(subscription(account))),
            ("Features", joined(&account.subscription.features)),
            ("Roles", joined(&account.roles)),
            ("Entitlements", entitlements),
            ("Token", Some(if account.has_token() { "stored" } else { "none" }.into())),
        ],
        color,
    )
}

fn subscription(account: &Account) -> String {
    let sub = &account.subscription;
    match (sub.active, sub.plan.as_deref()) {
        (true, Some(plan)) => format!("active ({plan})"),
        (true, None) => "active".into(),
        (false, _) => sub.status.clone().unwrap_or_else(|| "inactive".into()),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let account = ctx.plex.account().ok_or_else(|| CliError::AuthFailed {
        message: "not signed in".into(),
        profile: "default".into(),
    })?;

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        account,
        |a| detail(a, color),
        |a| a.display_name().to_owned(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_summary() {
        let mut account = Account::default();
        assert_eq!(subscription(&account), "inactive");

        account.subscription.active = true;
        account.subscription.plan = Some("lifetime".into());
        assert_eq!(subscription(&account), "active (lifetime)");
    }

    #[test]
    fn token_only_account_has_sparse_detail() {
        let account = Account::default();
        let text = detail(&account, false);
        assert!(!text.contains("Username"));
        assert!(text.contains("Token"));
        assert!(text.contains("none"));
    }
}
