//! Business logic services

pub mod accounts;
pub mod borrowing;
pub mod catalog;
pub mod email;
pub mod mailer;
pub mod social;

use crate::{
    config::{AuthConfig, EmailConfig, LendingConfig, ServerConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub accounts: accounts::AccountsService,
    pub catalog: catalog::CatalogService,
    pub borrowing: borrowing::BorrowingService,
    pub social: social::SocialService,
    pub mailer: mailer::MailerService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        server_config: ServerConfig,
        auth_config: AuthConfig,
        lending_config: LendingConfig,
        email_config: EmailConfig,
    ) -> Self {
        let email = email::EmailService::new(email_config.clone());
        Self {
            accounts: accounts::AccountsService::new(
                repository.clone(),
                auth_config,
                server_config,
            ),
            catalog: catalog::CatalogService::new(repository.clone()),
            borrowing: borrowing::BorrowingService::new(
                repository.clone(),
                lending_config,
                email_config.admin_address.clone(),
            ),
            social: social::SocialService::new(repository.clone()),
            mailer: mailer::MailerService::new(repository, email),
        }
    }
}
