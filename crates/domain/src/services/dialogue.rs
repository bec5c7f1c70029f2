//! Registration dialogue: menu parsing, admin commands, and message texts.
//!
//! Everything here is pure so the conversation handler can be driven in
//! tests without a transport or a store.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::profile::Relationship;
use shared::phone;

/// Literal command words the coordinator sends over WhatsApp.
pub const APPROVE_WORD: &str = "אשר";
pub const REJECT_WORD: &str = "דחה";

lazy_static! {
    static ref APPROVE_RE: Regex =
        Regex::new(&format!(r"^{APPROVE_WORD}\s+(\+?\d+)")).unwrap();
    static ref REJECT_RE: Regex =
        Regex::new(&format!(r"^{REJECT_WORD}\s+(\+?\d+)")).unwrap();
}

/// A parsed coordinator command with its target phone in canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    Approve(String),
    Reject(String),
}

impl AdminCommand {
    /// Parses a trimmed message body into a command, if it is one.
    pub fn parse(body: &str) -> Option<AdminCommand> {
        if let Some(caps) = APPROVE_RE.captures(body) {
            return Some(AdminCommand::Approve(phone::with_plus(&caps[1])));
        }
        if let Some(caps) = REJECT_RE.captures(body) {
            return Some(AdminCommand::Reject(phone::with_plus(&caps[1])));
        }
        None
    }

    pub fn target_phone(&self) -> &str {
        match self {
            AdminCommand::Approve(p) | AdminCommand::Reject(p) => p,
        }
    }
}

/// Whether an inbound body should be routed to the admin-response handler.
pub fn is_admin_command(body: &str) -> bool {
    let trimmed = body.trim();
    trimmed.starts_with(APPROVE_WORD) || trimmed.starts_with(REJECT_WORD)
}

/// Parses a relationship-menu reply (`1`..`7`).
pub fn parse_menu_choice(body: &str) -> Option<Relationship> {
    let index: usize = body.trim().parse().ok()?;
    (1..=Relationship::ALL.len())
        .contains(&index)
        .then(|| Relationship::ALL[index - 1])
}

/// The numbered relationship menu.
pub fn relationship_menu() -> String {
    Relationship::ALL
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {}", i + 1, r.label()))
        .collect::<Vec<_>>()
        .join("\n")
}

// Message texts for the registration dialogue. Kept together so the whole
// conversation can be read in one place.

pub fn ask_name() -> String {
    "שלום! נראה שאתה לא רשום עדיין במערכת הביקורים.\n\nכדי להירשם, אנא שלח את השם המלא שלך."
        .to_string()
}

pub fn ask_relationship(name: &str) -> String {
    format!(
        "תודה {name}!\n\nמה הקשר שלך לאבא?\nשלח את המספר המתאים:\n\n{}",
        relationship_menu()
    )
}

pub fn invalid_menu_choice() -> String {
    format!("אנא שלח מספר בין 1-7:\n\n{}", relationship_menu())
}

pub fn approval_request(name: &str, relationship: Relationship, phone: &str) -> String {
    format!(
        "בקשת הרשמה חדשה למערכת הביקורים:\n\nשם: {name}\nקשר: {}\nטלפון: {phone}\n\nלאישור, שלח: {APPROVE_WORD} {phone}\nלדחייה, שלח: {REJECT_WORD} {phone}",
        relationship.label()
    )
}

pub fn request_received() -> String {
    "תודה! הבקשה שלך נשלחה לאישור.\nתקבל הודעה ברגע שהבקשה תאושר.".to_string()
}

pub fn still_pending() -> String {
    "הבקשה שלך ממתינה לאישור. תקבל הודעה בקרוב!".to_string()
}

pub fn approved_user() -> String {
    "מזל טוב! הבקשה שלך אושרה!\nלחץ על הקישור שנשלח אליך כדי להתחבר למערכת.".to_string()
}

pub fn approved_admin(name: &str, phone: &str) -> String {
    format!("הבקשה של {name} ({phone}) אושרה בהצלחה!")
}

pub fn rejected_user() -> String {
    "מצטערים, הבקשה שלך לא אושרה. פנה למנהל המערכת לפרטים.".to_string()
}

pub fn rejected_admin(phone: &str) -> String {
    format!("הבקשה של {phone} נדחתה.")
}

pub fn request_not_found(phone: &str) -> String {
    format!("לא נמצאה בקשה ממתינה עבור {phone}")
}

pub fn magic_link_body(url: &str) -> String {
    format!("שלום! לחץ כאן להתחברות:\n{url}\n\nתוקף הקישור: 10 דקות")
}

pub fn login_fallback(base_url: &str) -> String {
    format!("שלום! נסה שוב בעוד כמה דקות או התחבר דרך האתר: {base_url}")
}

pub fn invite_body(name: &str, base_url: &str, invite_code: &str) -> String {
    format!(
        "שלום {name}! הוזמנת להצטרף למערכת הביקורים המשפחתית אצל אבא. לחץ כאן להצטרפות: {base_url}/invite/{invite_code}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_approve_command() {
        assert_eq!(
            AdminCommand::parse("אשר +15551234567"),
            Some(AdminCommand::Approve("+15551234567".to_string()))
        );
    }

    #[test]
    fn test_parse_approve_without_plus() {
        assert_eq!(
            AdminCommand::parse("אשר 15551234567"),
            Some(AdminCommand::Approve("+15551234567".to_string()))
        );
    }

    #[test]
    fn test_parse_reject_command() {
        assert_eq!(
            AdminCommand::parse("דחה +972501234567"),
            Some(AdminCommand::Reject("+972501234567".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_other_text() {
        assert_eq!(AdminCommand::parse("שלום"), None);
        assert_eq!(AdminCommand::parse("אשר"), None);
        assert_eq!(AdminCommand::parse("אשר בבקשה"), None);
    }

    #[test]
    fn test_is_admin_command_routing() {
        assert!(is_admin_command("אשר +15551234567"));
        assert!(is_admin_command("  דחה 12345  "));
        assert!(!is_admin_command("יוסי כהן"));
        assert!(!is_admin_command("1"));
    }

    #[test]
    fn test_parse_menu_choice_bounds() {
        assert_eq!(parse_menu_choice("1"), Some(Relationship::Son));
        assert_eq!(parse_menu_choice(" 7 "), Some(Relationship::RelativeF));
        assert_eq!(parse_menu_choice("0"), None);
        assert_eq!(parse_menu_choice("8"), None);
        assert_eq!(parse_menu_choice("בן"), None);
    }

    #[test]
    fn test_relationship_menu_lists_all_options() {
        let menu = relationship_menu();
        assert!(menu.starts_with("1. בן"));
        assert!(menu.contains("6. קרוב משפחה"));
        assert!(menu.ends_with("7. קרובת משפחה"));
        assert_eq!(menu.lines().count(), 7);
    }

    #[test]
    fn test_approval_request_contains_command_syntax() {
        let msg = approval_request("יוסי כהן", Relationship::Son, "+15551234567");
        assert!(msg.contains("יוסי כהן"));
        assert!(msg.contains("בן"));
        assert!(msg.contains("+15551234567"));
        assert!(msg.contains("אשר +15551234567"));
        assert!(msg.contains("דחה +15551234567"));
    }

    #[test]
    fn test_magic_link_body_contains_url() {
        let msg = magic_link_body("https://example.org/auth/magic-link?token=abc");
        assert!(msg.contains("https://example.org/auth/magic-link?token=abc"));
    }

    #[test]
    fn test_invite_body_contains_link() {
        let msg = invite_body("רבקה", "https://example.org", "a1b2c3d4");
        assert!(msg.contains("רבקה"));
        assert!(msg.contains("https://example.org/invite/a1b2c3d4"));
    }
}
