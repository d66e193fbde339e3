//! Plain-text rendering of views and listings.

use skillswap_core::api::DashboardSummary;
use skillswap_core::models::{ExchangeRequest, Notification, Skill, UserProfile};
use skillswap_core::utils::{format_optional, format_timestamp, truncate_string};
use skillswap_core::{Notice, NoticeLevel, Route, ViewState};

/// Shown whenever the next step is to sign in
pub const LOGIN_HINT: &str = "Not logged in. Run `skillswap login` to sign in.";

/// Column width for titles in listings
const TITLE_WIDTH: usize = 28;

/// Column width for free-text columns in listings
const TEXT_WIDTH: usize = 48;

pub fn notice(notice: &Notice) -> String {
    let prefix = match notice.level {
        NoticeLevel::Info => "",
        NoticeLevel::Success => "✓ ",
        NoticeLevel::Error => "✗ ",
    };
    format!("{}{}", prefix, notice.text)
}

/// The current notice, plus the login hint when the failure means the
/// user has to sign in again.
pub fn failure(view: &ViewState, needs_login: bool) -> String {
    let mut lines = Vec::new();
    if let Some(n) = &view.notice {
        lines.push(notice(n));
    }
    if needs_login {
        lines.push(LOGIN_HINT.to_string());
    }
    lines.join("\n")
}

pub fn view(view: &ViewState) -> String {
    let mut lines = Vec::new();
    if let Some(n) = &view.notice {
        lines.push(notice(n));
    }
    match (view.route, &view.user) {
        (Route::Dashboard, Some(user)) => lines.push(signed_in_as(user)),
        _ => lines.push(LOGIN_HINT.to_string()),
    }
    lines.join("\n")
}

fn signed_in_as(user: &UserProfile) -> String {
    if user.display_name() == user.username {
        format!("Logged in as {}", user.username)
    } else {
        format!("Logged in as {} ({})", user.display_name(), user.username)
    }
}

pub fn profile(user: &UserProfile) -> String {
    let mut lines = vec![signed_in_as(user)];
    if !user.email.is_empty() {
        lines.push(format!("  Email: {}", user.email));
    }
    lines.push(format!("  Bio:   {}", format_optional(user.bio.as_deref(), "-")));
    lines.join("\n")
}

pub fn skills(skills: &[Skill], me: Option<&UserProfile>) -> String {
    if skills.is_empty() {
        return "No skills found.".to_string();
    }
    skills
        .iter()
        .map(|s| {
            let value = s.value.map(|v| format!("{} XP", v)).unwrap_or_else(|| "-".to_string());
            let hidden = if s.is_active { "" } else { " [hidden]" };
            let owner = if me.is_some_and(|user| s.is_owned_by(user)) {
                "you"
            } else {
                s.owner_display()
            };
            format!(
                "#{:<5} {:<title$} {:<14} {:<12} {:>8}  by {}{}",
                s.id,
                truncate_string(&s.title, TITLE_WIDTH),
                truncate_string(&s.category, 14),
                s.proficiency_level,
                value,
                owner,
                hidden,
                title = TITLE_WIDTH,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn skill_detail(skill: &Skill) -> String {
    let mut lines = vec![
        format!("#{} {}", skill.id, skill.title),
        format!("  Category:    {}", skill.category),
        format!("  Proficiency: {}", skill.proficiency_level),
        format!("  Offered by:  {}", skill.owner_display()),
    ];
    if let Some(value) = skill.value {
        lines.push(format!("  Value:       {} XP", value));
    }
    if let Some(created) = &skill.created_at {
        lines.push(format!("  Added:       {}", format_timestamp(created)));
    }
    lines.push(String::new());
    lines.push(skill.description.clone());
    lines.join("\n")
}

/// Requests split into the ones for my skills and the ones I sent.
pub fn exchanges(requests: &[ExchangeRequest], me: Option<&UserProfile>) -> String {
    if requests.is_empty() {
        return "No exchange requests.".to_string();
    }
    let (incoming, outgoing): (Vec<_>, Vec<_>) = requests
        .iter()
        .partition(|r| me.is_some_and(|user| r.is_incoming_for(user)));

    let mut sections = Vec::new();
    if !incoming.is_empty() {
        sections.push(exchange_section("Requests for your skills", &incoming, |r| {
            r.requester.as_ref().map(|u| u.display_name().to_string())
        }));
    }
    if !outgoing.is_empty() {
        sections.push(exchange_section("Requests you sent", &outgoing, |r| {
            r.skill_owner.as_ref().map(|u| u.display_name().to_string())
        }));
    }
    sections.join("\n\n")
}

fn exchange_section(
    heading: &str,
    requests: &[&ExchangeRequest],
    other_party: impl Fn(&ExchangeRequest) -> Option<String>,
) -> String {
    let mut lines = vec![format!("{}:", heading)];
    for r in requests {
        lines.push(format!(
            "  #{:<5} {:<title$} {:<10} {:<16} {}",
            r.id,
            truncate_string(r.skill_title(), TITLE_WIDTH),
            r.status_display(),
            other_party(r).unwrap_or_else(|| "-".to_string()),
            r.created_at.as_deref().map(format_timestamp).unwrap_or_default(),
            title = TITLE_WIDTH,
        ));
        if !r.message.is_empty() {
            lines.push(format!("         \"{}\"", truncate_string(&r.message, TEXT_WIDTH)));
        }
    }
    lines.join("\n")
}

pub fn notifications(notifications: &[Notification]) -> String {
    if notifications.is_empty() {
        return "No notifications.".to_string();
    }
    notifications
        .iter()
        .map(|n| {
            let marker = if n.is_read { " " } else { "*" };
            format!(
                "{} #{:<5} {:<12} {} - {}",
                marker,
                n.id,
                n.created_at.as_deref().map(format_timestamp).unwrap_or_default(),
                n.title,
                truncate_string(&n.message, TEXT_WIDTH),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn dashboard(user: Option<&UserProfile>, summary: &DashboardSummary) -> String {
    let mut lines = Vec::new();
    if let Some(user) = user {
        lines.push(format!("Welcome back, {}!", user.display_name()));
        lines.push(String::new());
    }
    lines.push(format!("  Skills offered:        {}", summary.skills_offered));
    lines.push(format!("  Exchange requests:     {}", summary.exchange_requests));
    lines.push(format!("  Awaiting your answer:  {}", summary.pending_incoming));
    lines.push(format!("  Unread notifications:  {}", summary.unread_notifications));
    lines.join("\n")
}
