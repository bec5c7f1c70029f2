//! WhatsApp registration conversation handler.
//!
//! Drives the onboarding dialogue for unrecognized phone numbers and the
//! coordinator's approve/reject commands. The conversation state lives in
//! the registration-request row, never in process memory.

use chrono::Utc;
use domain::models::registration::RegistrationStatus;
use domain::services::dialogue::{self, AdminCommand};
use domain::services::WhatsAppSender;
use persistence::repositories::{
    InviteRepository, ProfileRepository, RegistrationRequestRepository,
};
use shared::{crypto, phone};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};

use super::MagicLinkService;

/// Outcome of handling one inbound registration/login message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationAction {
    MagicLinkSent,
    RegistrationStarted,
    NameReceived,
    InvalidRelationship,
    PendingApproval,
    StillPending,
    Ignored,
}

/// Outcome of handling one inbound coordinator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Approved,
    Rejected,
    RequestNotFound,
    NotAdmin,
    NotACommand,
}

/// Conversation handler for inbound WhatsApp messages.
pub struct RegistrationService {
    pool: PgPool,
    sender: Arc<dyn WhatsAppSender>,
    magic_link: MagicLinkService,
}

impl RegistrationService {
    pub fn new(pool: PgPool, sender: Arc<dyn WhatsAppSender>, base_url: String) -> Self {
        let magic_link = MagicLinkService::new(pool.clone(), sender.clone(), base_url);
        Self {
            pool,
            sender,
            magic_link,
        }
    }

    /// Handle an inbound message from a non-command sender: either a login
    /// request from a known member or the next turn of the registration
    /// dialogue.
    pub async fn handle_incoming(
        &self,
        from: &str,
        body: &str,
    ) -> Result<RegistrationAction, sqlx::Error> {
        let raw_phone = phone::strip_channel_prefix(from);
        let message = body.trim();
        let now = Utc::now();

        let profiles = ProfileRepository::new(self.pool.clone());
        let requests = RegistrationRequestRepository::new(self.pool.clone());

        // Known member: send a login link instead of the dialogue.
        let variants = phone::lookup_variants(raw_phone);
        if let Some(profile) = profiles.find_by_phone_variants(&variants).await? {
            info!(phone = %profile.phone, "Registered member messaged in, sending magic link");
            self.magic_link.issue_and_send(&profile.phone, now).await?;
            return Ok(RegistrationAction::MagicLinkSent);
        }

        let canonical = phone::with_plus(raw_phone);
        let Some(request) = requests.find_by_phone(&canonical).await? else {
            requests.create_or_reset(&canonical, now).await?;
            self.sender.send_text(&canonical, &dialogue::ask_name()).await;
            info!(phone = %canonical, "Registration dialogue started");
            return Ok(RegistrationAction::RegistrationStarted);
        };

        match request.status {
            RegistrationStatus::PendingDetails => match &request.name {
                None => {
                    requests.set_name(request.id, message, now).await?;
                    self.sender
                        .send_text(&canonical, &dialogue::ask_relationship(message))
                        .await;
                    Ok(RegistrationAction::NameReceived)
                }
                Some(name) => {
                    let Some(relationship) = dialogue::parse_menu_choice(message) else {
                        self.sender
                            .send_text(&canonical, &dialogue::invalid_menu_choice())
                            .await;
                        return Ok(RegistrationAction::InvalidRelationship);
                    };

                    requests
                        .set_relationship(request.id, relationship, now)
                        .await?;

                    // Approval requests fan out to every current
                    // administrator rather than a fixed phone.
                    let admins = profiles.list_admins().await?;
                    if admins.is_empty() {
                        warn!(phone = %canonical, "No administrators to approve registration");
                    }
                    for admin in &admins {
                        self.sender
                            .send_text(
                                &admin.phone,
                                &dialogue::approval_request(name, relationship, &canonical),
                            )
                            .await;
                    }

                    self.sender
                        .send_text(&canonical, &dialogue::request_received())
                        .await;
                    info!(phone = %canonical, admins = admins.len(), "Registration awaiting approval");
                    Ok(RegistrationAction::PendingApproval)
                }
            },
            RegistrationStatus::PendingApproval => {
                self.sender
                    .send_text(&canonical, &dialogue::still_pending())
                    .await;
                Ok(RegistrationAction::StillPending)
            }
            RegistrationStatus::Approved => {
                // Approved but no profile yet: refresh the login link.
                self.magic_link.issue_and_send(&canonical, now).await?;
                Ok(RegistrationAction::MagicLinkSent)
            }
            RegistrationStatus::Rejected => Ok(RegistrationAction::Ignored),
        }
    }

    /// Handle an inbound coordinator command (`אשר <phone>` / `דחה <phone>`).
    pub async fn handle_admin_response(
        &self,
        from: &str,
        body: &str,
    ) -> Result<AdminAction, sqlx::Error> {
        let admin_phone = phone::strip_channel_prefix(from);
        let now = Utc::now();

        let profiles = ProfileRepository::new(self.pool.clone());
        let requests = RegistrationRequestRepository::new(self.pool.clone());
        let invites = InviteRepository::new(self.pool.clone());

        let variants = phone::lookup_variants(admin_phone);
        let admin = match profiles.find_by_phone_variants(&variants).await? {
            Some(profile) if profile.is_admin => profile,
            _ => {
                warn!(phone = %admin_phone, "Command from non-administrator ignored");
                return Ok(AdminAction::NotAdmin);
            }
        };

        let Some(command) = AdminCommand::parse(body.trim()) else {
            return Ok(AdminAction::NotACommand);
        };

        match command {
            AdminCommand::Approve(target) => {
                let Some(request) = requests.find_pending_approval_by_phone(&target).await?
                else {
                    self.sender
                        .send_text(&admin.phone, &dialogue::request_not_found(&target))
                        .await;
                    return Ok(AdminAction::RequestNotFound);
                };

                let (Some(name), Some(relationship)) =
                    (request.name.clone(), request.relationship)
                else {
                    warn!(phone = %target, "Approval target has incomplete details");
                    self.sender
                        .send_text(&admin.phone, &dialogue::request_not_found(&target))
                        .await;
                    return Ok(AdminAction::RequestNotFound);
                };

                requests.approve(request.id, admin.id, now).await?;

                // Reuse an existing invite row for this phone if present.
                match invites.find_by_phone(&target).await? {
                    Some(invite) => {
                        invites
                            .refresh_for_approval(invite.id, &name, relationship, admin.id)
                            .await?;
                    }
                    None => {
                        let invite = invites
                            .create(
                                &target,
                                &name,
                                relationship,
                                &crypto::generate_invite_code(),
                                false,
                                Some(admin.id),
                                now,
                            )
                            .await?;
                        invites.mark_sent(invite.id).await?;
                    }
                }

                self.magic_link.issue_and_send(&target, now).await?;
                self.sender
                    .send_text(&target, &dialogue::approved_user())
                    .await;
                self.sender
                    .send_text(&admin.phone, &dialogue::approved_admin(&name, &target))
                    .await;

                info!(phone = %target, approver = %admin.id, "Registration approved");
                Ok(AdminAction::Approved)
            }
            AdminCommand::Reject(target) => {
                requests.reject_by_phone(&target, now).await?;
                self.sender
                    .send_text(&target, &dialogue::rejected_user())
                    .await;
                self.sender
                    .send_text(&admin.phone, &dialogue::rejected_admin(&target))
                    .await;

                info!(phone = %target, approver = %admin.id, "Registration rejected");
                Ok(AdminAction::Rejected)
            }
        }
    }
}
