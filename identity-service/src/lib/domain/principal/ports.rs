use async_trait::async_trait;

use crate::principal::errors::AuthenticationError;
use crate::principal::errors::RegistrationError;
use crate::principal::errors::StoreError;
use crate::principal::models::AccessGrant;
use crate::principal::models::AuthenticateCommand;
use crate::principal::models::ContactAddress;
use crate::principal::models::DisplayName;
use crate::principal::models::NewPrincipal;
use crate::principal::models::Principal;
use crate::principal::models::RegisterCommand;

/// Port for the identity workflows.
#[async_trait]
pub trait IdentityServicePort: Send + Sync + 'static {
    /// Register a new principal and issue its first token.
    ///
    /// # Arguments
    /// * `command` - Validated display name, contact address, and plaintext secret
    ///
    /// # Returns
    /// Access grant holding the token and the created principal
    ///
    /// # Errors
    /// * `AlreadyExists` - Display name or contact address is taken
    /// * `Store` / `Password` / `Token` / `Task` - Infrastructure failure
    async fn register(&self, command: RegisterCommand) -> Result<AccessGrant, RegistrationError>;

    /// Authenticate a returning principal and issue a token.
    ///
    /// # Arguments
    /// * `command` - Contact address and plaintext secret
    ///
    /// # Returns
    /// Access grant holding the token and the authenticated principal
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown address or wrong secret
    /// * `Store` / `Token` / `Task` - Infrastructure failure
    async fn authenticate(
        &self,
        command: AuthenticateCommand,
    ) -> Result<AccessGrant, AuthenticationError>;
}

/// Durable identity store.
///
/// Implementations must enforce uniqueness of display name and contact address
/// independently, atomically with the insert.
#[async_trait]
pub trait PrincipalRepository: Send + Sync + 'static {
    /// Retrieve the principal holding either the display name or the contact address.
    ///
    /// # Errors
    /// * `Database` - Store operation failed
    async fn find_by_identity(
        &self,
        display_name: &DisplayName,
        contact_address: &ContactAddress,
    ) -> Result<Option<Principal>, StoreError>;

    /// Retrieve principal by display name.
    ///
    /// # Errors
    /// * `Database` - Store operation failed
    async fn find_by_display_name(
        &self,
        display_name: &DisplayName,
    ) -> Result<Option<Principal>, StoreError>;

    /// Retrieve principal by contact address.
    ///
    /// # Errors
    /// * `Database` - Store operation failed
    async fn find_by_contact(
        &self,
        contact_address: &ContactAddress,
    ) -> Result<Option<Principal>, StoreError>;

    /// Persist a new principal.
    ///
    /// # Returns
    /// Stored principal with its assigned identifier
    ///
    /// # Errors
    /// * `UniquenessViolation` - A principal already claimed one of the unique fields
    /// * `Database` - Store operation failed
    async fn insert(&self, principal: NewPrincipal) -> Result<Principal, StoreError>;
}
